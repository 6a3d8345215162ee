//! 捐赠记录领域模型
//!
//! 生命周期有两条互相独立的轴：
//! - `status`: Uncomplete → Completed（单向）
//! - `deleted`: false ⇄ true（软删除与恢复可随时进行）

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::types::DonationId;

/// 捐赠人称谓
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    Mr,
    Mrs,
    Miss,
    Ms,
    Other,
}

impl Title {
    pub const ALL: [Title; 5] = [Title::Mr, Title::Mrs, Title::Miss, Title::Ms, Title::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Title::Mr => "Mr",
            Title::Mrs => "Mrs",
            Title::Miss => "Miss",
            Title::Ms => "Ms",
            Title::Other => "Other",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Title {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Title::ALL
            .iter()
            .copied()
            .find(|title| title.as_str() == s)
            .ok_or_else(|| format!("`{}` is not a valid title", s))
    }
}

/// 取件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DonationStatus {
    #[default]
    Uncomplete,
    Completed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Uncomplete => "Uncomplete",
            DonationStatus::Completed => "Completed",
        }
    }
}

impl FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Uncomplete" => Ok(DonationStatus::Uncomplete),
            "Completed" => Ok(DonationStatus::Completed),
            other => Err(format!("未知的捐赠状态: {}", other)),
        }
    }
}

/// 捐赠记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(rename = "_id", alias = "id")]
    pub id: DonationId,
    pub title: Title,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_request: DateTime<Utc>,
    pub description: Option<String>,
    pub weight: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    /// 预约取件日期
    pub date: Option<String>,
    /// 取件时间段，例如 `9-11`
    pub time_slot: Option<String>,
    pub status: DonationStatus,
    pub is_active: bool,
    pub attended_by: String,
    pub pickup_remarks: String,
    pub deleted: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// 按默认值构造新记录，对应提交时的初始状态
    pub fn from_submission(id: DonationId, submission: NewDonation, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: submission.title,
            first_name: submission.first_name,
            last_name: submission.last_name,
            email: submission.email,
            phone: submission.phone,
            date_of_request: submission.date_of_request.unwrap_or(now),
            description: submission.description,
            weight: submission.weight,
            address: submission.address,
            pincode: submission.pincode,
            date: submission.date,
            time_slot: submission.time_slot,
            status: DonationStatus::Uncomplete,
            is_active: submission.is_active.unwrap_or(true),
            attended_by: submission.attended_by.unwrap_or_default(),
            pickup_remarks: submission.pickup_remarks.unwrap_or_default(),
            deleted: false,
            completed_at: None,
        }
    }

    /// 标记为已完成，重复调用会刷新完成时间
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = DonationStatus::Completed;
        self.completed_at = Some(at);
    }

    /// 捐赠人全名，缺失的部分会被跳过
    pub fn donor_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 是否占用给定的取件时间段
    pub fn occupies(&self, date: &str, time_slot: &str) -> bool {
        !self.deleted
            && self.date.as_deref() == Some(date)
            && self.time_slot.as_deref() == Some(time_slot)
    }
}

/// 时间段可用性规则：空闲，或由同一邮编的请求者占用
pub fn is_slot_available(occupant: Option<&Donation>, pincode: Option<&str>) -> bool {
    match occupant {
        None => true,
        Some(existing) => existing.pincode.as_deref() == pincode,
    }
}

/// 经过校验的新提交
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub title: Title,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_request: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub weight: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub is_active: Option<bool>,
    pub attended_by: Option<String>,
    pub pickup_remarks: Option<String>,
}

impl NewDonation {
    pub fn new(title: Title) -> Self {
        Self {
            title,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            date_of_request: None,
            description: None,
            weight: None,
            address: None,
            pincode: None,
            date: None,
            time_slot: None,
            is_active: None,
            attended_by: None,
            pickup_remarks: None,
        }
    }
}

/// 部分更新：`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationPatch {
    pub title: Option<Title>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub weight: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub is_active: Option<bool>,
    pub attended_by: Option<String>,
    pub pickup_remarks: Option<String>,
}

impl DonationPatch {
    /// 将补丁合并到记录上
    pub fn apply_to(&self, donation: &mut Donation) {
        fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn merge_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        merge(&mut donation.title, &self.title);
        merge_opt(&mut donation.first_name, &self.first_name);
        merge_opt(&mut donation.last_name, &self.last_name);
        merge_opt(&mut donation.email, &self.email);
        merge_opt(&mut donation.phone, &self.phone);
        merge_opt(&mut donation.description, &self.description);
        merge_opt(&mut donation.weight, &self.weight);
        merge_opt(&mut donation.address, &self.address);
        merge_opt(&mut donation.pincode, &self.pincode);
        merge_opt(&mut donation.date, &self.date);
        merge_opt(&mut donation.time_slot, &self.time_slot);
        merge(&mut donation.is_active, &self.is_active);
        merge(&mut donation.attended_by, &self.attended_by);
        merge(&mut donation.pickup_remarks, &self.pickup_remarks);
    }
}
