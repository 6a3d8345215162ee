//! 内存存储
//!
//! 用于本地开发和测试，排序和过滤规则与 PostgreSQL 仓储一致

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::business::domain::{Donation, DonationPatch};
use crate::business::services::DonationStore;
use crate::shared::types::DonationId;
use crate::shared::utils::non_blank;
use crate::shared::AppResult;

#[derive(Debug, Default)]
pub struct MemoryDonationStore {
    records: RwLock<Vec<Donation>>,
}

impl MemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在写锁内修改单条记录，返回修改后的副本
    async fn modify<F>(&self, id: DonationId, change: F) -> Option<Donation>
    where
        F: FnOnce(&mut Donation),
    {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|d| d.id == id)?;
        change(record);
        Some(record.clone())
    }
}

#[async_trait]
impl DonationStore for MemoryDonationStore {
    async fn insert(&self, donation: &Donation) -> AppResult<Donation> {
        self.records.write().await.push(donation.clone());
        Ok(donation.clone())
    }

    async fn list_scheduled(&self) -> AppResult<Vec<Donation>> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.time_slot.cmp(&b.time_slot))
                .then_with(|| a.date_of_request.cmp(&b.date_of_request))
        });
        Ok(records)
    }

    async fn find_slot_occupant(&self, date: &str, time_slot: &str) -> AppResult<Option<Donation>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|d| d.occupies(date, time_slot))
            .min_by_key(|d| d.date_of_request)
            .cloned())
    }

    async fn set_deleted(&self, id: DonationId, deleted: bool) -> AppResult<Option<Donation>> {
        Ok(self.modify(id, |d| d.deleted = deleted).await)
    }

    async fn mark_completed(&self, id: DonationId, at: DateTime<Utc>) -> AppResult<Option<Donation>> {
        Ok(self.modify(id, |d| d.mark_completed(at)).await)
    }

    async fn apply_patch(&self, id: DonationId, patch: &DonationPatch) -> AppResult<Option<Donation>> {
        Ok(self.modify(id, |d| patch.apply_to(d)).await)
    }

    async fn list_emails(&self) -> AppResult<Vec<String>> {
        let mut records = self.records.read().await.clone();
        records.sort_by_key(|d| d.date_of_request);
        Ok(records
            .iter()
            .filter_map(|d| non_blank(d.email.as_deref()))
            .map(str::to_string)
            .collect())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{NewDonation, Title};
    use chrono::Duration;

    fn donation(date: Option<&str>, slot: Option<&str>, submitted: DateTime<Utc>) -> Donation {
        let mut submission = NewDonation::new(Title::Mr);
        submission.date = date.map(str::to_string);
        submission.time_slot = slot.map(str::to_string);
        submission.date_of_request = Some(submitted);
        Donation::from_submission(uuid::Uuid::new_v4(), submission, submitted)
    }

    #[tokio::test]
    async fn test_missing_schedule_sorts_first() {
        let store = MemoryDonationStore::new();
        let now = Utc::now();
        let scheduled = donation(Some("2024-05-01"), Some("9-11"), now);
        let unscheduled = donation(None, None, now);
        store.insert(&scheduled).await.unwrap();
        store.insert(&unscheduled).await.unwrap();

        let ids: Vec<_> = store.list_scheduled().await.unwrap().into_iter().map(|d| d.id).collect();

        assert_eq!(ids, vec![unscheduled.id, scheduled.id]);
    }

    #[tokio::test]
    async fn test_earliest_request_occupies_shared_slot() {
        let store = MemoryDonationStore::new();
        let now = Utc::now();
        let later = donation(Some("2024-05-01"), Some("9-11"), now);
        let earlier = donation(Some("2024-05-01"), Some("9-11"), now - Duration::hours(1));
        store.insert(&later).await.unwrap();
        store.insert(&earlier).await.unwrap();

        let occupant = store.find_slot_occupant("2024-05-01", "9-11").await.unwrap();

        assert_eq!(occupant.map(|d| d.id), Some(earlier.id));
    }

    #[tokio::test]
    async fn test_list_emails_skips_blank_addresses() {
        let store = MemoryDonationStore::new();
        let now = Utc::now();
        for (offset, email) in [(0, Some("a@b.com")), (1, Some("   ")), (2, None), (3, Some("c@d.com"))] {
            let mut d = donation(None, None, now + Duration::seconds(offset));
            d.email = email.map(str::to_string);
            store.insert(&d).await.unwrap();
        }

        assert_eq!(store.list_emails().await.unwrap(), vec!["a@b.com", "c@d.com"]);
    }

    #[tokio::test]
    async fn test_modify_unknown_id_returns_none() {
        let store = MemoryDonationStore::new();
        assert!(store.set_deleted(uuid::Uuid::new_v4(), true).await.unwrap().is_none());
    }
}
