//! 群发邮件处理器
//!
//! 成功与失败都以纯文本响应

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, instrument};

use crate::presentation::dto::SendEmailsRequest;
use crate::presentation::routes::AppState;
use crate::shared::constants::messages;
use crate::shared::AppError;

/// 向所有记录中的邮箱群发消息
#[instrument(skip(state, payload))]
pub async fn send_emails(
    State(state): State<AppState>,
    payload: Result<Json<SendEmailsRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match state.notifications.broadcast(&request.message).await {
        Ok(summary) => {
            info!("✅ 群发完成: {} 个收件人, {} 批", summary.recipients, summary.batches);
            (StatusCode::OK, messages::EMAILS_SENT).into_response()
        }
        Err(AppError::Validation(message)) => (StatusCode::BAD_REQUEST, message).into_response(),
        Err(e) => {
            error!("群发邮件失败: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, messages::EMAILS_FAILED).into_response()
        }
    }
}
