//! 统一错误处理模块
//!
//! 定义系统中所有错误类型，提供统一的错误处理机制

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::infrastructure::export::ExportError;
use crate::infrastructure::mail::DispatchError;

/// 应用程序统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 存储层错误
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// 验证错误
    #[error("{0}")]
    Validation(String),

    /// 资源未找到错误
    #[error("{0}")]
    NotFound(String),

    /// 邮件投递错误
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// 表格导出错误
    #[error("{0}")]
    Export(#[from] ExportError),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取HTTP状态码
    ///
    /// 校验、未找到和存储错误统一按 400 返回，前端只依赖 `message` 字段。
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "STORAGE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Dispatch(_) => "DISPATCH_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_code = self.error_code();

        tracing::error!(
            status = ?status_code,
            error_code = error_code,
            error = %self,
            "处理请求时发生错误"
        );

        let body = Json(json!({
            "message": self.to_string(),
            "code": error_code,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status_code, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 验证错误构造宏
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::shared::error::AppError::Validation($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::shared::error::AppError::Validation(format!($fmt, $($arg)*))
    };
}

/// 内部错误构造宏
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::shared::error::AppError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::shared::error::AppError::Internal(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_delivery_and_export_errors_map_to_server_error() {
        let dispatch = AppError::from(DispatchError::NotConfigured);
        assert_eq!(dispatch.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dispatch.error_code(), "DISPATCH_ERROR");

        let export = AppError::from(ExportError::Workbook("boom".into()));
        assert_eq!(export.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_macro_formats_message() {
        let err = validation_error!("`{}` is not a valid title", "Dr");
        assert_eq!(err.to_string(), "`Dr` is not a valid title");
    }
}
