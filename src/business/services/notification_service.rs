//! 邮件通知服务
//!
//! - 确认邮件：记录提交后在独立任务中发送，失败只记录日志
//! - 群发邮件：按批次顺序投递，任一批失败即中止

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::mail_templates::{render_broadcast, render_confirmation};
use super::DonationStore;
use crate::business::domain::Donation;
use crate::infrastructure::mail::{DispatchError, MailTransport, OutgoingMail};
use crate::shared::constants::{mail, messages};
use crate::shared::utils::non_blank;
use crate::shared::{AppError, AppResult};

/// 群发结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastSummary {
    pub recipients: usize,
    pub batches: usize,
}

/// 邮件通知服务
pub struct NotificationService {
    store: Arc<dyn DonationStore>,
    mailer: Arc<dyn MailTransport>,
    batch_size: usize,
}

impl NotificationService {
    pub fn new(store: Arc<dyn DonationStore>, mailer: Arc<dyn MailTransport>, batch_size: usize) -> Self {
        Self {
            store,
            mailer,
            batch_size: batch_size.max(1),
        }
    }

    /// 在后台任务中发送确认邮件，调用方无需等待
    pub fn spawn_confirmation(&self, donation: Donation) -> JoinHandle<()> {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            match send_confirmation(mailer.as_ref(), &donation).await {
                Ok(true) => info!("📧 确认邮件已发送: {}", donation.id),
                Ok(false) => warn!("⚠️ 记录 {} 没有邮箱地址，跳过确认邮件", donation.id),
                Err(e) => error!("确认邮件发送失败: donation={}, error={}", donation.id, e),
            }
        })
    }

    /// 向所有记录的邮箱群发消息
    #[instrument(skip(self, message))]
    pub async fn broadcast(&self, message: &str) -> AppResult<BroadcastSummary> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("Message must not be empty".to_string()));
        }

        let recipients = self.store.list_emails().await?;
        if recipients.is_empty() {
            return Err(AppError::Validation(messages::NO_RECIPIENTS.to_string()));
        }

        let html = render_broadcast(message);
        let total_batches = recipients.len().div_ceil(self.batch_size);
        info!("📨 开始群发邮件: {} 个收件人, {} 批", recipients.len(), total_batches);

        for (index, batch) in recipients.chunks(self.batch_size).enumerate() {
            let mail = OutgoingMail::blind(batch.to_vec(), mail::BROADCAST_SUBJECT, html.clone());
            self.mailer.send(mail).await.map_err(|e| {
                error!("第 {}/{} 批邮件发送失败，中止剩余批次: {}", index + 1, total_batches, e);
                AppError::Dispatch(e)
            })?;
            info!("✅ 第 {}/{} 批邮件已发送 ({} 个收件人)", index + 1, total_batches, batch.len());
        }

        Ok(BroadcastSummary {
            recipients: recipients.len(),
            batches: total_batches,
        })
    }
}

/// 发送确认邮件；记录没有邮箱时返回 `Ok(false)`
pub async fn send_confirmation(mailer: &dyn MailTransport, donation: &Donation) -> Result<bool, DispatchError> {
    let Some(address) = non_blank(donation.email.as_deref()) else {
        return Ok(false);
    };

    let mail = OutgoingMail::direct(address, mail::CONFIRMATION_SUBJECT, render_confirmation(donation));
    mailer.send(mail).await?;
    Ok(true)
}

pub type SharedNotificationService = Arc<NotificationService>;
