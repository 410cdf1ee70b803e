//! PostgreSQL connection pool.
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Postgres;
use crate::student::DEFAULT_STORAGE_TIMEOUT;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "students";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Bound applied to pool acquisition and storage calls.
pub fn timeout(config: Option<&Postgres>) -> Duration {
    config
        .and_then(|config| config.timeout)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_STORAGE_TIMEOUT)
}

/// Connect to PostgreSQL and apply pending migrations.
pub async fn connect(config: &Postgres) -> Result<PgPool, sqlx::Error> {
    let username = config.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
    let password = config.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
    let db = config.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME);
    let hostname = &config.address;

    let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size.unwrap_or(DEFAULT_POOL_SIZE))
        .acquire_timeout(timeout(Some(config)))
        .connect(&addr)
        .await?;

    tracing::info!(%hostname, %db, "postgres connected");

    // execute migrations scripts on start.
    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}
