//! Donation Hub Rust 服务
//!
//! 捐赠预约管理后端，基于三层架构设计

// 核心模块
pub mod shared;          // 共享模块（错误处理、类型定义、工具函数）
pub mod infrastructure;  // 基础设施层（数据库、配置、邮件、导出、实时事件）
pub mod business;        // 业务逻辑层（领域模型、存储接口、业务服务）
pub mod presentation;    // 表示层（HTTP处理、路由、WebSocket）

// 重新导出核心类型
pub use infrastructure::{Config, Database};
pub use presentation::{create_routes, AppState};
pub use shared::{AppError, AppResult};
