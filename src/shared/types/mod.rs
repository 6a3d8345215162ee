//! 共享类型定义模块

use serde::{Deserialize, Serialize};

/// 捐赠记录ID类型
pub type DonationId = uuid::Uuid;

/// 仅包含提示信息的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
