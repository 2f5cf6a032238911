// scheduler.rs - Background reminder job

use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::ReminderConfig;
use crate::services::ReminderService;

/// Spawn the periodic reminder pass; `None` when reminders are disabled.
///
/// A failed pass is logged and the loop keeps going.
pub fn spawn_reminder_job(pool: SqlitePool, config: &ReminderConfig) -> Option<JoinHandle<()>> {
    if !config.enabled {
        tracing::info!("Payment reminders disabled");
        return None;
    }

    let period = Duration::from_secs(config.interval_secs.max(1));
    let service = ReminderService::new(pool, config.window_days);
    tracing::info!("Payment reminders every {}s", period.as_secs());

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match service.run(Utc::now()).await {
                Ok(report) if report.skipped => {}
                Ok(report) => tracing::info!(
                    "Reminder pass: {} unpaid tenant(s), {} notification(s)",
                    report.unpaid_tenants,
                    report.notifications_created
                ),
                Err(e) => tracing::error!("Reminder pass failed: {}", e),
            }
        }
    }))
}
