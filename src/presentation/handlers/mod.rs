//! HTTP请求处理器模块
//!
//! 实现所有API端点的处理逻辑

pub mod donations;
pub mod emails;
pub mod exports;
pub mod health;
pub mod socket;
