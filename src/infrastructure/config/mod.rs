use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::shared::constants::{events, mail};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub store_backend: StoreBackend,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub realtime: RealtimeConfig,
}

/// 记录存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("未知的存储后端: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
    pub test_before_acquire: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub batch_size: usize,
}

impl MailConfig {
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    pub redis_url: Option<String>,
    pub channel: String,
    pub bus_capacity: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // 从环境变量加载配置
        dotenv::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse().map_err(anyhow::Error::msg)?,
            Err(_) => StoreBackend::Postgres,
        };

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/donation_hub".to_string()),

            store_backend,

            server: ServerConfig {
                port: parse_or("PORT", 5000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },

            database: DatabaseConfig {
                max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
                min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
                acquire_timeout_seconds: parse_or("DB_ACQUIRE_TIMEOUT", 30),
                idle_timeout_seconds: parse_or("DB_IDLE_TIMEOUT", 600),
                max_lifetime_seconds: parse_or("DB_MAX_LIFETIME", 1800),
                test_before_acquire: parse_or("DB_TEST_BEFORE_ACQUIRE", true),
            },

            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST")
                    .unwrap_or_else(|_| mail::DEFAULT_SMTP_HOST.to_string()),
                smtp_port: parse_or("SMTP_PORT", mail::DEFAULT_SMTP_PORT),
                username: first_present(&["MAIL_USERNAME", "NODE_EMAIL"]),
                password: first_present(&["MAIL_PASSWORD", "NODE_PASS"]),
                from_address: first_present(&["MAIL_FROM"]),
                from_name: env::var("MAIL_FROM_NAME")
                    .unwrap_or_else(|_| mail::DEFAULT_FROM_NAME.to_string()),
                batch_size: parse_or("MAIL_BATCH_SIZE", mail::DEFAULT_BATCH_SIZE),
            },

            realtime: RealtimeConfig {
                redis_url: first_present(&["REDIS_URL"]),
                channel: env::var("EVENT_CHANNEL")
                    .unwrap_or_else(|_| events::DEFAULT_CHANNEL.to_string()),
                bus_capacity: parse_or("EVENT_BUS_CAPACITY", events::DEFAULT_BUS_CAPACITY),
            },
        };

        Ok(config)
    }
}

/// 读取并解析环境变量，缺失或无法解析时使用默认值
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// 按顺序取第一个非空的环境变量
fn first_present(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("PostgreSQL".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        env::set_var("DONATION_HUB_TEST_PORT", "not-a-port");
        assert_eq!(parse_or("DONATION_HUB_TEST_PORT", 5000u16), 5000);
        env::set_var("DONATION_HUB_TEST_PORT", " 8080 ");
        assert_eq!(parse_or("DONATION_HUB_TEST_PORT", 5000u16), 8080);
        env::remove_var("DONATION_HUB_TEST_PORT");
    }

    #[test]
    fn test_first_present_uses_fallback_key() {
        env::remove_var("DONATION_HUB_TEST_PRIMARY");
        env::set_var("DONATION_HUB_TEST_LEGACY", "legacy@example.com");
        assert_eq!(
            first_present(&["DONATION_HUB_TEST_PRIMARY", "DONATION_HUB_TEST_LEGACY"]),
            Some("legacy@example.com".to_string())
        );
        env::remove_var("DONATION_HUB_TEST_LEGACY");
    }
}
