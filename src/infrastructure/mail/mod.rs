//! 邮件投递
//!
//! 基于 lettre 的 SMTP 实现；未配置凭据时使用 `UnconfiguredMailer`，
//! 服务照常启动，但每次投递都会失败。

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use crate::infrastructure::config::MailConfig;

/// 邮件投递错误
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Mail transport is not configured")]
    NotConfigured,

    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// 待投递的邮件
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl OutgoingMail {
    /// 单个收件人
    pub fn direct(to: &str, subject: &str, html: String) -> Self {
        Self {
            to: vec![to.to_string()],
            bcc: Vec::new(),
            subject: subject.to_string(),
            html,
        }
    }

    /// 全部收件人放入密送
    pub fn blind(bcc: Vec<String>, subject: &str, html: String) -> Self {
        Self {
            to: Vec::new(),
            bcc,
            subject: subject.to_string(),
            html,
        }
    }

    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }
}

/// 邮件投递接口
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), DispatchError>;
}

/// SMTP 投递
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, DispatchError> {
        let (Some(username), Some(password)) = (config.username.clone(), config.password.clone()) else {
            return Err(DispatchError::NotConfigured);
        };

        let from_address = config.from_address.clone().unwrap_or_else(|| username.clone());
        let from = format!("{} <{}>", config.from_name, from_address)
            .parse::<Mailbox>()
            .map_err(|e| DispatchError::Address(format!("{}: {}", from_address, e)))?;

        Ok(Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials: Credentials::new(username, password),
            from,
        })
    }

    /// 465 端口使用隐式 TLS，其余端口使用 STARTTLS
    fn build_transport(&self) -> Result<SmtpTransport, DispatchError> {
        let relay = if self.port == 465 {
            SmtpTransport::relay(&self.host)
        } else {
            SmtpTransport::starttls_relay(&self.host)
        };
        let builder =
            relay.map_err(|e| DispatchError::Transport(format!("SMTP relay error: {}", e)))?;

        Ok(builder
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn build_message(&self, mail: OutgoingMail) -> Result<Message, DispatchError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML);

        let mut accepted = 0usize;
        for address in &mail.to {
            match address.parse::<Mailbox>() {
                Ok(mailbox) => {
                    builder = builder.to(mailbox);
                    accepted += 1;
                }
                Err(e) => warn!("⚠️ 跳过无效的收件人地址 {}: {}", address, e),
            }
        }
        for address in &mail.bcc {
            match address.parse::<Mailbox>() {
                Ok(mailbox) => {
                    builder = builder.bcc(mailbox);
                    accepted += 1;
                }
                Err(e) => warn!("⚠️ 跳过无效的密送地址 {}: {}", address, e),
            }
        }

        if accepted == 0 {
            return Err(DispatchError::Address("no valid recipients".to_string()));
        }

        builder
            .body(mail.html)
            .map_err(|e| DispatchError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), DispatchError> {
        let recipients = mail.recipient_count();
        let message = self.build_message(mail)?;
        let transport = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| DispatchError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| DispatchError::Transport(format!("Email task failed: {}", e)))??;

        info!("📤 SMTP 投递成功: {} 个收件人", recipients);
        Ok(())
    }
}

/// 未配置凭据时的占位实现
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredMailer;

#[async_trait]
impl MailTransport for UnconfiguredMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), DispatchError> {
        Err(DispatchError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::mail;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: mail::DEFAULT_SMTP_HOST.to_string(),
            smtp_port: mail::DEFAULT_SMTP_PORT,
            username: Some("foundation@example.com".to_string()),
            password: Some("secret".to_string()),
            from_address: None,
            from_name: mail::DEFAULT_FROM_NAME.to_string(),
            batch_size: mail::DEFAULT_BATCH_SIZE,
        }
    }

    #[test]
    fn test_missing_credentials_is_not_configured() {
        let mut cfg = config();
        cfg.password = None;
        assert!(matches!(SmtpMailer::new(&cfg), Err(DispatchError::NotConfigured)));
    }

    #[test]
    fn test_message_skips_invalid_bcc_addresses() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let mail = OutgoingMail::blind(
            vec!["good@example.com".to_string(), "not an address".to_string()],
            "Subject",
            "<p>hi</p>".to_string(),
        );
        assert!(mailer.build_message(mail).is_ok());
    }

    #[test]
    fn test_message_without_valid_recipients_fails() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let mail = OutgoingMail::blind(vec!["nope".to_string()], "Subject", String::new());
        assert!(matches!(mailer.build_message(mail), Err(DispatchError::Address(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_always_fails() {
        let mail = OutgoingMail::direct("a@b.com", "s", String::new());
        assert!(matches!(
            UnconfiguredMailer.send(mail).await,
            Err(DispatchError::NotConfigured)
        ));
    }
}
