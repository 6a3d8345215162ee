//! 表格导出处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Json},
};
use tracing::{info, instrument};

use crate::infrastructure::export::{build_table, render_xlsx, ExportError};
use crate::presentation::dto::ExportRequest;
use crate::presentation::routes::AppState;
use crate::shared::constants::export;
use crate::shared::AppResult;
use crate::{internal_error, validation_error};

/// 按所选列导出全部记录为 xlsx 附件
#[instrument(skip(state, payload))]
pub async fn download_excel(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload?;
    if request.columns.is_empty() {
        return Err(validation_error!("columns must not be empty"));
    }

    let records = state
        .donations
        .list()
        .await
        .map_err(|e| ExportError::Source(e.to_string()))?;
    let row_count = records.len();

    let bytes = tokio::task::spawn_blocking(move || {
        let table = build_table(&records, &request.columns)?;
        render_xlsx(&table)
    })
    .await
    .map_err(|e| internal_error!("导出任务失败: {}", e))??;

    info!("📊 已导出 {} 条记录, {} 字节", row_count, bytes.len());

    let disposition = format!("attachment; filename={}", export::FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
