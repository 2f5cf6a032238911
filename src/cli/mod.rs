pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "rentdesk")]
#[command(about = "rentdesk - operator commands for the warehouse rental API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides RENTDESK_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Owner account bootstrap")]
    Owner {
        #[command(subcommand)]
        cmd: commands::owner::OwnerCommands,
    },

    #[command(about = "Payment reminder job")]
    Reminders {
        #[command(subcommand)]
        cmd: commands::reminders::ReminderCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port } => commands::server::serve(port).await,
        Commands::Migrate => commands::server::migrate(output_format).await,
        Commands::Owner { cmd } => commands::owner::handle(cmd, output_format).await,
        Commands::Reminders { cmd } => commands::reminders::handle(cmd, output_format).await,
    }
}
