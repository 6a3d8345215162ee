//! 常量定义模块

/// 实时事件相关常量
pub mod events {
    pub const DONATION_ADDED: &str = "donationAdded";
    pub const DONATION_UPDATED: &str = "donationUpdated";
    pub const DEFAULT_CHANNEL: &str = "donation-hub:events";
    pub const DEFAULT_BUS_CAPACITY: usize = 256;
}

/// 邮件相关常量
pub mod mail {
    /// 单次投递的最大收件人数量（避免触发服务商限流）
    pub const DEFAULT_BATCH_SIZE: usize = 50;
    pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
    pub const DEFAULT_SMTP_PORT: u16 = 465;
    pub const DEFAULT_FROM_NAME: &str = "Swara Foundation";
    pub const CONFIRMATION_SUBJECT: &str = "Thank you for your donation";
    pub const BROADCAST_SUBJECT: &str = "Upcoming Event Notification";
}

/// 导出相关常量
pub mod export {
    pub const SHEET_NAME: &str = "Donations";
    pub const COLUMN_WIDTH: f64 = 20.0;
    pub const FILE_NAME: &str = "donations.xlsx";
    pub const CONTENT_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
}

/// 响应提示信息
pub mod messages {
    pub const MOVED_TO_TRASH: &str = "Donation moved to trash";
    pub const EMAILS_SENT: &str = "Emails sent successfully";
    pub const EMAILS_FAILED: &str = "Failed to send emails";
    pub const NO_RECIPIENTS: &str = "No email addresses found.";
}
