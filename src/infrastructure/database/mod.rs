pub mod connection;
pub mod donations_repository;
pub mod memory_store;

use sqlx::PgPool;

use crate::infrastructure::config::Config;
use connection::{DatabaseConnection, DatabaseConnectionError};
pub use donations_repository::PgDonationRepository;
pub use memory_store::MemoryDonationStore;

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("连接管理器错误: {0}")]
    ConnectionManager(#[from] DatabaseConnectionError),

    #[error("SQL执行错误: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 数据库管理器 - 包装连接管理器并提供仓储
#[derive(Debug, Clone)]
pub struct Database {
    connection_manager: DatabaseConnection,
    pub donations: PgDonationRepository,
}

impl Database {
    /// 使用配置创建数据库实例
    pub async fn new(config: &Config) -> Result<Self, DatabaseError> {
        let connection_manager = DatabaseConnection::new(&config.database_url, &config.database).await?;
        let donations = PgDonationRepository::new(connection_manager.pool().clone());

        Ok(Database {
            connection_manager,
            donations,
        })
    }

    /// 执行内嵌的数据库迁移
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(self.pool()).await?;
        tracing::info!("✅ 数据库迁移完成");
        Ok(())
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &PgPool {
        self.connection_manager.pool()
    }

    /// 关闭数据库连接
    pub async fn close(&self) {
        self.connection_manager.close().await;
    }
}
