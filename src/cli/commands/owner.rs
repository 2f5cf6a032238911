use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::services::AccountService;

use super::open_database;

#[derive(Subcommand)]
pub enum OwnerCommands {
    #[command(about = "Create the owner account (refused if one exists)")]
    Create {
        #[arg(long, help = "Owner email")]
        email: String,
        #[arg(long, help = "Owner password")]
        password: String,
        #[arg(long, help = "Owner full name")]
        full_name: String,
    },

    #[command(about = "Show whether an owner account exists")]
    Status,
}

pub async fn handle(cmd: OwnerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = open_database(config).await?;
    let accounts = AccountService::new(pool, config.security.clone());

    match cmd {
        OwnerCommands::Create {
            email,
            password,
            full_name,
        } => {
            let owner = accounts
                .bootstrap_owner(&email, &password, &full_name)
                .await
                .context("failed to create owner")?;
            output_success(
                &output_format,
                &format!("Owner {} created", owner.email),
                Some(json!({ "id": owner.id, "email": owner.email })),
            )
        }
        OwnerCommands::Status => {
            let exists = accounts.owner_exists().await?;
            output_fields(&output_format, &[("owner_exists", exists.to_string())])
        }
    }
}
