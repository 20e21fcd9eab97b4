use anyhow::{Context, Result};
use log::info;
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite,
};
use std::{str::FromStr, time::Duration};

/// Pool settings for the observations store
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: climate_api_core::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(climate_api_core::DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

/// Read-only handle on the observations database.
///
/// Holds a pool rather than a connection; callers check out one connection
/// per unit of work and it goes back to the pool when dropped.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_path: &str, options: DatabaseOptions) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .read_only(true)
            .create_if_missing(false)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("Failed to open observations database: {}", db_path))?;

        info!(
            "SQLite observations database opened read-only at: {} (max connections: {})",
            db_path, options.max_connections
        );

        Ok(Self { pool })
    }

    /// Check out a pooled connection for the duration of one operation.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }

    /// Check database connectivity, integrity and that the expected tables exist.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "Database integrity check failed: {}",
                result
            ));
        }

        for table in ["measurement", "station"] {
            let found: Option<String> = sqlx::query_scalar(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .context("Database schema check failed")?;
            if found.is_none() {
                return Err(anyhow::anyhow!("Database is missing table: {}", table));
            }
        }

        Ok(())
    }
}
