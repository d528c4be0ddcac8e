use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors raised by the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value: {0}")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Postgres error code for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

impl DatabaseError {
    /// Maps a raw sqlx error, turning unique violations into `Duplicate`.
    pub fn from_sqlx(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return DatabaseError::Duplicate(what.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Liveness probe for whatever backs the stores.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
impl HealthCheck for PgPool {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}

/// Connection pool construction and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database
    pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if cfg.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
            .connect(&cfg.url)
            .await?;

        info!("Created database pool (max_connections={})", cfg.max_connections);
        Ok(pool)
    }

    /// Build a pool that only connects on first use
    pub fn connect_lazy(cfg: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if cfg.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
            .connect_lazy(&cfg.url)?;

        Ok(pool)
    }

    /// Apply embedded migrations from ./migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Wait until the database answers, retrying with a growing back-off
    pub async fn status_check(pool: &PgPool, attempts: u32) -> Result<(), DatabaseError> {
        let mut last = None;
        for attempt in 1..=attempts {
            match pool.ping().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!("Database not ready (attempt {}/{}): {}", attempt, attempts, e);
                    last = Some(e);
                    tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                }
            }
        }
        Err(last.unwrap_or(DatabaseError::ConfigMissing("DATABASE_URL")))
    }
}
