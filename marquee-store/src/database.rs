use crate::app_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

/// Connection pool for the booking ledger. Sizing comes from config so a
/// busy box office can raise limits without a rebuild.
#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_seconds))
            .connect(&cfg.url)
            .await?;

        info!(
            max_connections = cfg.max_connections,
            "booking ledger pool ready"
        );
        Ok(Self { pool })
    }

    /// Applies the ledger migrations. Runs once at startup, before the
    /// engine takes traffic.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("running booking ledger migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("booking ledger migrations complete");
        Ok(())
    }
}
