//! 捐赠API数据传输对象
//!
//! 请求体中的 `status`、`deleted`、`completedAt` 由专门的操作维护，这里直接忽略

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::business::domain::{DonationPatch, NewDonation, Title};
use crate::business::services::AvailabilityQuery;
use crate::shared::{AppError, AppResult};
use crate::validation_error;

/// 接受字符串或数字；表单常把电话和邮编作为数字提交
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

fn parse_title(raw: &str) -> AppResult<Title> {
    raw.trim().parse().map_err(AppError::Validation)
}

/// 创建捐赠请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    pub date_of_request: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pincode: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub is_active: Option<bool>,
    pub attended_by: Option<String>,
    pub pickup_remarks: Option<String>,
}

impl CreateDonationRequest {
    /// 校验称谓并转换为领域对象
    pub fn validate(self) -> AppResult<NewDonation> {
        let title = match self.title.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_title(raw)?,
            _ => return Err(validation_error!("title is required")),
        };

        Ok(NewDonation {
            title,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_request: self.date_of_request,
            description: self.description,
            weight: self.weight,
            address: self.address,
            pincode: self.pincode,
            date: self.date,
            time_slot: self.time_slot,
            is_active: self.is_active,
            attended_by: self.attended_by,
            pickup_remarks: self.pickup_remarks,
        })
    }
}

/// 更新捐赠请求，`null` 或缺省字段保持原值
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonationRequest {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pincode: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub is_active: Option<bool>,
    pub attended_by: Option<String>,
    pub pickup_remarks: Option<String>,
}

impl UpdateDonationRequest {
    pub fn into_patch(self) -> AppResult<DonationPatch> {
        let title = self.title.as_deref().map(parse_title).transpose()?;

        Ok(DonationPatch {
            title,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            description: self.description,
            weight: self.weight,
            address: self.address,
            pincode: self.pincode,
            date: self.date,
            time_slot: self.time_slot,
            is_active: self.is_active,
            attended_by: self.attended_by,
            pickup_remarks: self.pickup_remarks,
        })
    }
}

/// 时间段可用性查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityParams {
    pub date: String,
    pub time_slot: String,
    pub pincode: Option<String>,
}

impl From<AvailabilityParams> for AvailabilityQuery {
    fn from(params: AvailabilityParams) -> Self {
        AvailabilityQuery {
            date: params.date,
            time_slot: params.time_slot,
            pincode: params.pincode,
        }
    }
}

/// 时间段可用性响应
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// 导出请求
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub columns: Vec<String>,
}

/// 群发邮件请求
#[derive(Debug, Deserialize)]
pub struct SendEmailsRequest {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_requires_known_title() {
        let missing: CreateDonationRequest = serde_json::from_value(json!({"firstName": "A"})).unwrap();
        assert!(matches!(missing.validate(), Err(AppError::Validation(m)) if m == "title is required"));

        let unknown: CreateDonationRequest = serde_json::from_value(json!({"title": "Dr"})).unwrap();
        assert!(matches!(unknown.validate(), Err(AppError::Validation(m)) if m.contains("Dr")));
    }

    #[test]
    fn test_create_ignores_lifecycle_fields_and_accepts_numeric_pincode() {
        let request: CreateDonationRequest = serde_json::from_value(json!({
            "title": "Mr",
            "pincode": 560001,
            "status": "Completed",
            "deleted": true,
            "completedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let submission = request.validate().unwrap();
        assert_eq!(submission.title, Title::Mr);
        assert_eq!(submission.pincode.as_deref(), Some("560001"));
    }

    #[test]
    fn test_update_null_means_unchanged() {
        let request: UpdateDonationRequest = serde_json::from_value(json!({
            "firstName": null,
            "attendedBy": "Ravi",
            "status": "Completed"
        }))
        .unwrap();

        let patch = request.into_patch().unwrap();
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.attended_by.as_deref(), Some("Ravi"));
    }

    #[test]
    fn test_update_rejects_unknown_title() {
        let request: UpdateDonationRequest = serde_json::from_value(json!({"title": "Sir"})).unwrap();
        assert!(matches!(request.into_patch(), Err(AppError::Validation(_))));
    }
}
