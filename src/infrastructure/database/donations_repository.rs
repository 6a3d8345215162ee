//! 捐赠记录数据库操作
//!
//! 所有按ID修改的操作都是单条 `UPDATE … RETURNING`，不做先读后写

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info, instrument};

use crate::business::domain::{Donation, DonationPatch, DonationStatus, Title};
use crate::business::services::DonationStore;
use crate::shared::types::DonationId;
use crate::shared::{AppError, AppResult};

const COLUMNS: &str = "id, title, first_name, last_name, email, phone, date_of_request, \
     description, weight, address, pincode, date, time_slot, status, is_active, \
     attended_by, pickup_remarks, deleted, completed_at";

/// `donations` 表的一行
#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: DonationId,
    title: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    date_of_request: DateTime<Utc>,
    description: Option<String>,
    weight: Option<String>,
    address: Option<String>,
    pincode: Option<String>,
    date: Option<String>,
    time_slot: Option<String>,
    status: String,
    is_active: bool,
    attended_by: String,
    pickup_remarks: String,
    deleted: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = AppError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        let title: Title = row.title.parse().map_err(AppError::Internal)?;
        let status: DonationStatus = row.status.parse().map_err(AppError::Internal)?;

        Ok(Donation {
            id: row.id,
            title,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_request: row.date_of_request,
            description: row.description,
            weight: row.weight,
            address: row.address,
            pincode: row.pincode,
            date: row.date,
            time_slot: row.time_slot,
            status,
            is_active: row.is_active,
            attended_by: row.attended_by,
            pickup_remarks: row.pickup_remarks,
            deleted: row.deleted,
            completed_at: row.completed_at,
        })
    }
}

/// PostgreSQL 捐赠记录仓储
#[derive(Debug, Clone)]
pub struct PgDonationRepository {
    pool: PgPool,
}

impl PgDonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn convert(row: Option<DonationRow>) -> AppResult<Option<Donation>> {
        row.map(Donation::try_from).transpose()
    }
}

#[async_trait]
impl DonationStore for PgDonationRepository {
    #[instrument(skip(self, donation), fields(id = %donation.id))]
    async fn insert(&self, donation: &Donation) -> AppResult<Donation> {
        let sql = format!(
            "INSERT INTO donations ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(donation.id)
            .bind(donation.title.as_str())
            .bind(&donation.first_name)
            .bind(&donation.last_name)
            .bind(&donation.email)
            .bind(&donation.phone)
            .bind(donation.date_of_request)
            .bind(&donation.description)
            .bind(&donation.weight)
            .bind(&donation.address)
            .bind(&donation.pincode)
            .bind(&donation.date)
            .bind(&donation.time_slot)
            .bind(donation.status.as_str())
            .bind(donation.is_active)
            .bind(&donation.attended_by)
            .bind(&donation.pickup_remarks)
            .bind(donation.deleted)
            .bind(donation.completed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("插入捐赠记录失败: {}", e);
                AppError::Database(e)
            })?;

        info!("💾 捐赠记录已写入数据库: {}", row.id);
        Donation::try_from(row)
    }

    #[instrument(skip(self))]
    async fn list_scheduled(&self) -> AppResult<Vec<Donation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM donations \
             ORDER BY date COLLATE \"C\" ASC NULLS FIRST, \
                      time_slot COLLATE \"C\" ASC NULLS FIRST, \
                      date_of_request ASC"
        );

        let rows = sqlx::query_as::<_, DonationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        info!("🔍 数据库查询返回 {} 条记录", rows.len());
        rows.into_iter().map(Donation::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_slot_occupant(&self, date: &str, time_slot: &str) -> AppResult<Option<Donation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM donations \
             WHERE date = $1 AND time_slot = $2 AND NOT deleted \
             ORDER BY date_of_request ASC \
             LIMIT 1"
        );

        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(date)
            .bind(time_slot)
            .fetch_optional(&self.pool)
            .await?;

        Self::convert(row)
    }

    #[instrument(skip(self))]
    async fn set_deleted(&self, id: DonationId, deleted: bool) -> AppResult<Option<Donation>> {
        let sql = format!("UPDATE donations SET deleted = $2 WHERE id = $1 RETURNING {COLUMNS}");

        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(id)
            .bind(deleted)
            .fetch_optional(&self.pool)
            .await?;

        Self::convert(row)
    }

    #[instrument(skip(self))]
    async fn mark_completed(&self, id: DonationId, at: DateTime<Utc>) -> AppResult<Option<Donation>> {
        let sql = format!(
            "UPDATE donations SET status = $2, completed_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(id)
            .bind(DonationStatus::Completed.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Self::convert(row)
    }

    #[instrument(skip(self, patch))]
    async fn apply_patch(&self, id: DonationId, patch: &DonationPatch) -> AppResult<Option<Donation>> {
        let sql = format!(
            "UPDATE donations SET \
                title = COALESCE($2, title), \
                first_name = COALESCE($3, first_name), \
                last_name = COALESCE($4, last_name), \
                email = COALESCE($5, email), \
                phone = COALESCE($6, phone), \
                description = COALESCE($7, description), \
                weight = COALESCE($8, weight), \
                address = COALESCE($9, address), \
                pincode = COALESCE($10, pincode), \
                date = COALESCE($11, date), \
                time_slot = COALESCE($12, time_slot), \
                is_active = COALESCE($13, is_active), \
                attended_by = COALESCE($14, attended_by), \
                pickup_remarks = COALESCE($15, pickup_remarks) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(id)
            .bind(patch.title.map(|t| t.as_str()))
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(&patch.email)
            .bind(&patch.phone)
            .bind(&patch.description)
            .bind(&patch.weight)
            .bind(&patch.address)
            .bind(&patch.pincode)
            .bind(&patch.date)
            .bind(&patch.time_slot)
            .bind(patch.is_active)
            .bind(&patch.attended_by)
            .bind(&patch.pickup_remarks)
            .fetch_optional(&self.pool)
            .await?;

        Self::convert(row)
    }

    #[instrument(skip(self))]
    async fn list_emails(&self) -> AppResult<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT btrim(email) FROM donations \
             WHERE email IS NOT NULL AND btrim(email) <> '' \
             ORDER BY date_of_request ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
