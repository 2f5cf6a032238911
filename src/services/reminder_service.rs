use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::notification_service::{self, NewNotification};
use super::ServiceResult;
use crate::ledger::{Entry, Period};
use crate::types::NotificationKind;

const NAMES_IN_MESSAGE: usize = 3;

/// Outcome of one reminder pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    /// True when today is outside the reminder window and nothing was checked
    pub skipped: bool,
    pub days_until_month_end: i64,
    pub unpaid_tenants: usize,
    pub notifications_created: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpaidTenant {
    pub tenant_id: Uuid,
    pub admin_id: Uuid,
    pub full_name: String,
    pub outstanding: i64,
}

#[derive(Debug, FromRow)]
struct TenantDue {
    id: Uuid,
    admin_id: Uuid,
    full_name: String,
    monthly_rent: i64,
    expected_amount: Option<i64>,
    paid_amount: Option<i64>,
    carry_over_debt: Option<i64>,
}

impl TenantDue {
    /// A tenant without a row for the month owes its monthly rent
    fn entry(&self) -> Entry {
        match self.expected_amount {
            Some(expected) => Entry::new(
                expected,
                self.paid_amount.unwrap_or(0),
                self.carry_over_debt.unwrap_or(0),
            ),
            None => Entry::new(self.monthly_rent, 0, 0),
        }
    }
}

/// Month-end payment reminders for admins
pub struct ReminderService {
    pool: SqlitePool,
    window_days: i64,
}

impl ReminderService {
    pub fn new(pool: SqlitePool, window_days: i64) -> Self {
        Self { pool, window_days }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> ServiceResult<ReminderReport> {
        let today = now.date_naive();
        let days_left = days_until_month_end(today);

        if days_left > self.window_days {
            tracing::debug!("{} days until month end, outside the reminder window", days_left);
            return Ok(ReminderReport {
                skipped: true,
                days_until_month_end: days_left,
                unpaid_tenants: 0,
                notifications_created: 0,
            });
        }

        let period = Period::from_date(today);
        let dues = sqlx::query_as::<_, TenantDue>(
            r#"
            SELECT t.id, t.admin_id, t.full_name, t.monthly_rent,
                   p.expected_amount, p.paid_amount, p.carry_over_debt
            FROM tenants t
            LEFT JOIN payments p ON p.tenant_id = t.id AND p.month = $1 AND p.year = $2
            WHERE t.is_active = 1
            ORDER BY t.full_name
            "#,
        )
        .bind(i64::from(period.month))
        .bind(i64::from(period.year))
        .fetch_all(&self.pool)
        .await?;

        let unpaid = unpaid_tenants(&dues);
        let by_admin = group_by_admin(&unpaid);
        let day_start = today.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);

        let mut tx = self.pool.begin().await?;
        let mut created = 0;

        for (admin_id, tenants) in by_admin {
            let (already,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND kind = $2 AND created_at >= $3",
            )
            .bind(admin_id)
            .bind(NotificationKind::PaymentReminder.as_str())
            .bind(day_start)
            .fetch_one(&mut *tx)
            .await?;

            if already > 0 {
                tracing::debug!("Admin {} already reminded today", admin_id);
                continue;
            }

            let (title, message) = compose_message(&tenants);
            notification_service::insert(
                &mut *tx,
                NewNotification {
                    user_id: admin_id,
                    title,
                    message,
                    kind: NotificationKind::PaymentReminder,
                    related_id: None,
                    related_type: Some("payment".to_string()),
                },
                now,
            )
            .await?;
            created += 1;
        }

        tx.commit().await?;

        tracing::info!(
            "Reminder pass for {}: {} unpaid tenant(s), {} notification(s) created",
            period,
            unpaid.len(),
            created
        );
        Ok(ReminderReport {
            skipped: false,
            days_until_month_end: days_left,
            unpaid_tenants: unpaid.len(),
            notifications_created: created,
        })
    }
}

/// Days between `date` and the last day of its month; zero on the last day
pub fn days_until_month_end(date: NaiveDate) -> i64 {
    let last = Period::from_date(date).last_day();
    (last - date).num_days()
}

fn unpaid_tenants(dues: &[TenantDue]) -> Vec<UnpaidTenant> {
    dues.iter()
        .filter_map(|due| {
            let entry = due.entry();
            (entry.paid_amount < entry.total_due()).then(|| UnpaidTenant {
                tenant_id: due.id,
                admin_id: due.admin_id,
                full_name: due.full_name.clone(),
                outstanding: entry.remaining(),
            })
        })
        .collect()
}

pub fn group_by_admin(unpaid: &[UnpaidTenant]) -> BTreeMap<Uuid, Vec<UnpaidTenant>> {
    let mut groups: BTreeMap<Uuid, Vec<UnpaidTenant>> = BTreeMap::new();
    for tenant in unpaid {
        groups.entry(tenant.admin_id).or_default().push(tenant.clone());
    }
    groups
}

/// Title and body for one admin's reminder
pub fn compose_message(tenants: &[UnpaidTenant]) -> (String, String) {
    let total: i64 = tenants.iter().map(|t| t.outstanding).sum();
    let names = tenants
        .iter()
        .take(NAMES_IN_MESSAGE)
        .map(|t| t.full_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let more = if tenants.len() > NAMES_IN_MESSAGE {
        format!(" and {} more", tenants.len() - NAMES_IN_MESSAGE)
    } else {
        String::new()
    };

    let message = format!(
        "{} tenant(s) have not paid this month: {}{}. Total: {}",
        tenants.len(),
        names,
        more,
        format_amount(total)
    );
    ("Payment reminder".to_string(), message)
}

/// `1500000` -> `1 500 000 so'm`
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{} so'm", sign, grouped)
}
