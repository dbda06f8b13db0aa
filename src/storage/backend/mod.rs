//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod analytics;
mod connection;
mod restaurants;
pub mod retry;
mod tracking;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::errors::{HalalmapError, Result};

pub use analytics::{DeviceCountRow, EventSlice, NameCountRow, SessionSlice};
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use restaurants::RestaurantOrder;
pub use tracking::{NewEvent, NewSession};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(HalalmapError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// dashboard 全量 COUNT 缓存（TTL 由配置决定，默认 30 秒）
    count_cache: Cache<String, u64>,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(HalalmapError::database_config(
                "DATABASE_URL 未设置".to_string(),
            ));
        }

        // 读取重试配置
        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(
                    config.analytics.dashboard_cache_ttl_secs,
                ))
                .max_capacity(100)
                .build(),
            retry_config,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（测试和需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
