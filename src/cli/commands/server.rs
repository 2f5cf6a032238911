use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

use super::open_database;

pub async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = config::config().clone();
    if let Some(port) = port {
        config.api.port = port;
    }
    crate::serve(config).await
}

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    open_database(config).await?;
    output_success(
        &output_format,
        &format!("Database at {} is up to date", config.database.url),
        None,
    )
}
