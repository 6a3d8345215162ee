//! 业务服务模块
//!
//! 实现核心业务逻辑和服务编排

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::business::domain::{Donation, DonationEvent, DonationPatch};
use crate::shared::{error::AppResult, types::DonationId};

pub mod donation_service;
pub mod mail_templates;
pub mod notification_service;

pub use donation_service::{AvailabilityQuery, DonationService, SharedDonationService};
pub use notification_service::{BroadcastSummary, NotificationService, SharedNotificationService};

/// 捐赠记录存储接口
///
/// 所有按ID修改的操作都必须是单条原子更新，返回更新后的记录；
/// 记录不存在时返回 `Ok(None)`。
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// 持久化新记录
    async fn insert(&self, donation: &Donation) -> AppResult<Donation>;

    /// 按 (date, timeSlot) 升序列出全部记录，不过滤软删除
    async fn list_scheduled(&self) -> AppResult<Vec<Donation>>;

    /// 查找占用时间段的未删除记录，多条时取最早提交的一条
    async fn find_slot_occupant(&self, date: &str, time_slot: &str) -> AppResult<Option<Donation>>;

    async fn set_deleted(&self, id: DonationId, deleted: bool) -> AppResult<Option<Donation>>;

    async fn mark_completed(&self, id: DonationId, at: DateTime<Utc>) -> AppResult<Option<Donation>>;

    async fn apply_patch(&self, id: DonationId, patch: &DonationPatch) -> AppResult<Option<Donation>>;

    /// 所有记录的非空邮箱地址，按提交顺序
    async fn list_emails(&self) -> AppResult<Vec<String>>;

    /// 存储健康检查
    async fn health_check(&self) -> AppResult<()>;
}

/// 实时事件发布接口
///
/// 发布不会失败：记录已经提交，投递问题只记录日志。
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DonationEvent);
}
