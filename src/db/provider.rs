//! Connection provider: owns the MySQL pool and hands out connections.

use std::time::Duration;

use sqlx::MySql;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::FleetError;

/// Shared handle to the MySQL pool. Cloning is cheap, every clone talks to
/// the same pool.
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Builds the pool without touching the network. The first statement,
    /// or an explicit [`Database::ping`], opens the first connection.
    pub fn connect(cfg: &DatabaseConfig) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.username)
            .database(&cfg.database);
        if !cfg.password.is_empty() {
            options = options.password(&cfg.password);
        }
        let pool = MySqlPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect_lazy_with(options);
        debug!(
            host = %cfg.host,
            port = cfg.port,
            database = %cfg.database,
            "mysql pool configured"
        );
        Self { pool }
    }

    /// Checks a connection out of the pool, opening one if none is idle.
    /// Failure here means the server is unreachable or rejected our
    /// credentials, and maps to [`FleetError::Connection`].
    pub(crate) async fn acquire(&self) -> Result<PoolConnection<MySql>, FleetError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| FleetError::Connection(e.to_string()))
    }

    /// Round-trips `SELECT 1` to prove the server is reachable and the
    /// configured account is accepted.
    pub async fn ping(&self) -> Result<(), FleetError> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|e| FleetError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Drains the pool. Called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
