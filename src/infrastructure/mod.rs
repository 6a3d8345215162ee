//! 基础设施层模块
//!
//! 负责数据持久化、实时事件分发、邮件投递、表格导出和配置管理

pub mod config;
pub mod database;
pub mod export;
pub mod mail;
pub mod realtime;

// 重新导出常用类型和错误
pub use config::Config;
pub use database::{Database, DatabaseError, MemoryDonationStore, PgDonationRepository};
pub use realtime::{EventBus, RedisRelay};
