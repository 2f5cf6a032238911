use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use crate::cli::utils::output_fields;
use crate::cli::OutputFormat;
use crate::config;
use crate::services::ReminderService;

use super::open_database;

#[derive(Subcommand)]
pub enum ReminderCommands {
    #[command(about = "Run one reminder pass now")]
    Run {
        #[arg(long, help = "Pretend today is this date (YYYY-MM-DD)")]
        date: Option<NaiveDate>,
    },
}

pub async fn handle(cmd: ReminderCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = open_database(config).await?;
    let service = ReminderService::new(pool, config.reminders.window_days);

    match cmd {
        ReminderCommands::Run { date } => {
            let now = match date.and_then(|d| d.and_hms_opt(12, 0, 0)) {
                Some(at) => at.and_utc(),
                None => Utc::now(),
            };
            let report = service.run(now).await?;
            output_fields(
                &output_format,
                &[
                    ("skipped", report.skipped.to_string()),
                    ("days_until_month_end", report.days_until_month_end.to_string()),
                    ("unpaid_tenants", report.unpaid_tenants.to_string()),
                    ("notifications_created", report.notifications_created.to_string()),
                ],
            )
        }
    }
}
