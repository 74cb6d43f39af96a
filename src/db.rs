//! SeaORM connection pool for the tender store.
//!
//! Production runs against Postgres; the integration tests run the same
//! migrations against in-memory SQLite. Startup retries transient connection
//! failures with exponential backoff, so the service comes up cleanly when
//! the database is still booting.

use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::time::sleep;

use crate::config::AppConfig;

const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur while setting up the connection pool.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to the tender store: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Open the connection pool described by `cfg`, retrying transient failures.
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "database URL is empty".to_string(),
        }
        .into());
    }

    let mut options = ConnectOptions::new(&cfg.database_url);
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    connect_with_retry(options).await
}

async fn connect_with_retry(options: ConnectOptions) -> Result<DatabaseConnection> {
    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                tracing::info!(attempt, "Connected to the tender store");
                return Ok(conn);
            }
            Err(err) if attempt < MAX_CONNECT_ATTEMPTS => {
                tracing::warn!(
                    attempt,
                    %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Tender store connection failed, retrying"
                );
                sleep(delay).await;
                delay *= 2;
            }
            Err(err) => {
                tracing::error!(
                    attempts = MAX_CONNECT_ATTEMPTS,
                    %err,
                    "Giving up on tender store connection"
                );
                return Err(DatabaseError::ConnectionFailed { source: err }.into());
            }
        }
    }
}

/// Round-trip a trivial query so the health endpoint can tell a live pool
/// from one whose backing database has gone away.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("tender store health check failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_database_url_is_rejected() {
        let config = AppConfig {
            database_url: String::new(),
            ..AppConfig::default()
        };

        let err = init_pool(&config).await.unwrap_err();
        assert!(matches!(
            err.downcast::<DatabaseError>(),
            Ok(DatabaseError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_health_check_on_live_connection() {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite");

        assert!(health_check(&db).await.is_ok());
    }
}
