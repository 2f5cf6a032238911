pub mod owner;
pub mod reminders;
pub mod server;

use anyhow::Context;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Connect to the configured database and bring the schema up to date
pub(crate) async fn open_database(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .with_context(|| format!("failed to open {}", config.database.url))?;
    DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    Ok(pool)
}
