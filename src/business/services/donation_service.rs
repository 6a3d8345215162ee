//! 捐赠生命周期服务
//!
//! 无状态：每次调用只依赖注入的存储和事件总线

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use super::{DonationStore, EventPublisher};
use crate::business::domain::{is_slot_available, Donation, DonationEvent, DonationPatch, NewDonation};
use crate::shared::{AppError, AppResult, DonationId};

/// 时间段可用性查询
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub date: String,
    pub time_slot: String,
    pub pincode: Option<String>,
}

/// 捐赠生命周期服务
pub struct DonationService {
    store: Arc<dyn DonationStore>,
    events: Arc<dyn EventPublisher>,
}

impl DonationService {
    pub fn new(store: Arc<dyn DonationStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    /// 创建新的捐赠记录并广播 `donationAdded`
    #[instrument(skip(self, submission), fields(title = %submission.title))]
    pub async fn create(&self, submission: NewDonation) -> AppResult<Donation> {
        let donation = Donation::from_submission(uuid::Uuid::new_v4(), submission, Utc::now());
        let saved = self.store.insert(&donation).await?;

        info!("➕ 捐赠记录已创建: {}", saved.id);
        self.events.publish(DonationEvent::Added(saved.clone()));
        Ok(saved)
    }

    /// 按 (date, timeSlot) 排序列出全部记录
    pub async fn list(&self) -> AppResult<Vec<Donation>> {
        self.store.list_scheduled().await
    }

    /// 软删除（移入回收站）
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: DonationId) -> AppResult<Donation> {
        let updated = Self::require(id, self.store.set_deleted(id, true).await?)?;
        info!("🗑️ 捐赠记录已移入回收站: {}", id);
        self.events.publish(DonationEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 标记取件完成，重复调用刷新完成时间
    #[instrument(skip(self))]
    pub async fn complete(&self, id: DonationId) -> AppResult<Donation> {
        let updated = Self::require(id, self.store.mark_completed(id, Utc::now()).await?)?;
        info!("✅ 捐赠记录已完成: {}", id);
        self.events.publish(DonationEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 从回收站恢复
    #[instrument(skip(self))]
    pub async fn restore(&self, id: DonationId) -> AppResult<Donation> {
        let updated = Self::require(id, self.store.set_deleted(id, false).await?)?;
        info!("♻️ 捐赠记录已恢复: {}", id);
        self.events.publish(DonationEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 部分字段更新
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: DonationId, patch: DonationPatch) -> AppResult<Donation> {
        let updated = Self::require(id, self.store.apply_patch(id, &patch).await?)?;
        info!("🔄 捐赠记录已更新: {}", id);
        self.events.publish(DonationEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 检查时间段是否可预约
    #[instrument(skip(self))]
    pub async fn check_availability(&self, query: &AvailabilityQuery) -> AppResult<bool> {
        let occupant = self
            .store
            .find_slot_occupant(&query.date, &query.time_slot)
            .await?;
        Ok(is_slot_available(occupant.as_ref(), query.pincode.as_deref()))
    }

    /// 存储健康检查
    pub async fn health_check(&self) -> AppResult<()> {
        self.store.health_check().await
    }

    fn require(id: DonationId, found: Option<Donation>) -> AppResult<Donation> {
        found.ok_or_else(|| AppError::NotFound(format!("Donation {} not found", id)))
    }
}

pub type SharedDonationService = Arc<DonationService>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{DonationStatus, Title};
    use crate::infrastructure::database::MemoryDonationStore;
    use crate::infrastructure::realtime::EventBus;

    fn submission(date: &str, slot: &str, pincode: &str) -> NewDonation {
        let mut s = NewDonation::new(Title::Mr);
        s.first_name = Some("A".to_string());
        s.last_name = Some("B".to_string());
        s.email = Some("a@b.com".to_string());
        s.date = Some(date.to_string());
        s.time_slot = Some(slot.to_string());
        s.pincode = Some(pincode.to_string());
        s
    }

    fn service() -> (DonationService, EventBus) {
        let bus = EventBus::new(16);
        let service = DonationService::new(
            Arc::new(MemoryDonationStore::new()),
            Arc::new(bus.clone()),
        );
        (service, bus)
    }

    #[tokio::test]
    async fn test_create_publishes_added_event_with_identical_record() {
        let (service, bus) = service();
        let mut events = bus.subscribe();

        let created = service.create(submission("2024-05-01", "9-11", "12345")).await.unwrap();

        assert_eq!(created.status, DonationStatus::Uncomplete);
        assert!(!created.deleted);
        assert!(created.completed_at.is_none());
        assert_eq!(events.recv().await.unwrap(), DonationEvent::Added(created));
    }

    #[tokio::test]
    async fn test_list_orders_by_date_then_slot() {
        let (service, _bus) = service();
        service.create(submission("2024-05-02", "9-11", "1")).await.unwrap();
        service.create(submission("2024-05-01", "13-15", "2")).await.unwrap();
        service.create(submission("2024-05-01", "11-13", "3")).await.unwrap();

        let slots: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| (d.date.unwrap(), d.time_slot.unwrap()))
            .collect();

        assert_eq!(
            slots,
            vec![
                ("2024-05-01".to_string(), "11-13".to_string()),
                ("2024-05-01".to_string(), "13-15".to_string()),
                ("2024-05-02".to_string(), "9-11".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_availability_rule() {
        let (service, _bus) = service();
        let query = |pincode: &str| AvailabilityQuery {
            date: "2024-05-01".to_string(),
            time_slot: "9-11".to_string(),
            pincode: Some(pincode.to_string()),
        };

        assert!(service.check_availability(&query("12345")).await.unwrap());

        let created = service.create(submission("2024-05-01", "9-11", "12345")).await.unwrap();
        assert!(service.check_availability(&query("12345")).await.unwrap());
        assert!(!service.check_availability(&query("54321")).await.unwrap());

        service.soft_delete(created.id).await.unwrap();
        assert!(service.check_availability(&query("54321")).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_delete_then_restore_keeps_other_fields() {
        let (service, bus) = service();
        let created = service.create(submission("2024-05-01", "9-11", "12345")).await.unwrap();
        let mut events = bus.subscribe();

        let deleted = service.soft_delete(created.id).await.unwrap();
        assert!(deleted.deleted);
        let restored = service.restore(created.id).await.unwrap();

        assert_eq!(restored, created);
        assert_eq!(events.recv().await.unwrap(), DonationEvent::Updated(deleted));
        assert_eq!(events.recv().await.unwrap(), DonationEvent::Updated(restored));
    }

    #[tokio::test]
    async fn test_complete_is_idempotent_on_status_and_refreshes_timestamp() {
        let (service, _bus) = service();
        let created = service.create(submission("2024-05-01", "9-11", "12345")).await.unwrap();

        let first = service.complete(created.id).await.unwrap();
        assert_eq!(first.status, DonationStatus::Completed);
        let first_at = first.completed_at.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.complete(created.id).await.unwrap();
        assert_eq!(second.status, DonationStatus::Completed);
        assert!(second.completed_at.unwrap() > first_at);
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_publishes() {
        let (service, bus) = service();
        let created = service.create(submission("2024-05-01", "9-11", "12345")).await.unwrap();
        let mut events = bus.subscribe();

        let patch = DonationPatch {
            pickup_remarks: Some("Collected two boxes".to_string()),
            ..Default::default()
        };
        let updated = service.update(created.id, patch).await.unwrap();

        assert_eq!(updated.pickup_remarks, "Collected two boxes");
        assert_eq!(updated.email, created.email);
        assert_eq!(events.recv().await.unwrap(), DonationEvent::Updated(updated));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_for_every_operation() {
        let (service, bus) = service();
        let mut events = bus.subscribe();
        let id = uuid::Uuid::new_v4();

        assert!(matches!(service.soft_delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.complete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.restore(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(id, DonationPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(events.try_recv().is_err());
    }
}
