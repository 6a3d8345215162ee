//! 健康检查处理器

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::presentation::routes::AppState;

/// 基础健康检查：存储不可达时返回 503
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status_code, status, error) = match state.donations.health_check().await {
        Ok(()) => (StatusCode::OK, "ok", None),
        Err(e) => {
            warn!("⚠️ 存储健康检查失败: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", Some(e.to_string()))
        }
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "donation-hub-rust",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "subscribers": state.bus.subscriber_count(),
            "error": error,
        })),
    )
}
