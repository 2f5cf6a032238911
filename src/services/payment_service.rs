use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{optional, ServiceError, ServiceResult};
use crate::database::models::{Payment, PaymentRow, PaymentView, Tenant};
use crate::ledger::{self, carry_over_from, split_advance, Period, Summary};
use crate::types::Scope;

const PAYMENT_COLUMNS: &str = "id, tenant_id, month, year, expected_amount, paid_amount, carry_over_debt, \
                               notes, payment_date, created_at, updated_at";

const ROW_SELECT: &str = r#"
    SELECT p.id, p.tenant_id, p.month, p.year, p.expected_amount, p.paid_amount,
           p.carry_over_debt, p.notes, p.payment_date, p.created_at, p.updated_at,
           t.full_name AS tenant_name, t.phone AS tenant_phone, t.product_type, t.admin_id
    FROM payments p
    JOIN tenants t ON t.id = p.tenant_id
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPayment {
    pub tenant_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub paid_amount: i64,
    /// Only used when the row is created; defaults to the tenant's monthly rent
    #[serde(default)]
    pub expected_amount: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvancePayment {
    pub tenant_id: Uuid,
    pub start_month: u32,
    pub start_year: i32,
    pub months: u32,
    pub amount: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// All rows of one period with the totals shown under the table
#[derive(Debug, Clone, Serialize)]
pub struct PeriodPayments {
    pub month: u32,
    pub year: i32,
    pub payments: Vec<PaymentView>,
    pub summary: Summary,
}

/// Writes to the monthly ledger. Every write is a single transaction.
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tenant's row for the period, or overwrite the paid amount of the existing one
    pub async fn record(&self, admin_id: Uuid, request: RecordPayment) -> ServiceResult<PaymentView> {
        let period = Period::new(request.month, request.year)?;
        let paid_amount = amount_field("paid_amount", request.paid_amount)?;
        let expected_amount = request
            .expected_amount
            .map(|e| amount_field("expected_amount", e))
            .transpose()?;
        let notes = optional(request.notes);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let tenant = own_tenant(&mut tx, admin_id, request.tenant_id).await?;

        let payment = match find_row(&mut tx, tenant.id, period).await? {
            Some(existing) => {
                let query = format!(
                    r#"
                    UPDATE payments
                    SET paid_amount = $1, notes = $2, payment_date = $3, updated_at = $3
                    WHERE id = $4
                    RETURNING {}
                    "#,
                    PAYMENT_COLUMNS
                );
                sqlx::query_as::<_, Payment>(&query)
                    .bind(paid_amount)
                    .bind(notes)
                    .bind(now)
                    .bind(existing.id)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let expected = expected_amount.unwrap_or(tenant.monthly_rent);
                insert_row(&mut tx, &tenant, period, expected, paid_amount, notes, now).await?
            }
        };

        tx.commit().await?;

        tracing::info!(
            "Payment recorded: tenant {} period {} paid {}",
            tenant.id,
            period,
            payment.paid_amount
        );
        Ok(payment.into())
    }

    /// Spread one lump sum over consecutive months, creating rows as needed
    pub async fn advance(&self, admin_id: Uuid, request: AdvancePayment) -> ServiceResult<Vec<PaymentView>> {
        let start = Period::new(request.start_month, request.start_year)?;
        let shares = split_advance(request.amount, request.months)?;
        let periods = Period::series(start, request.months);
        let notes = optional(request.notes);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let tenant = own_tenant(&mut tx, admin_id, request.tenant_id).await?;

        let mut rows = Vec::with_capacity(shares.len());
        for (period, share) in periods.into_iter().zip(shares) {
            let row = match find_row(&mut tx, tenant.id, period).await? {
                Some(existing) => {
                    let query = format!(
                        r#"
                        UPDATE payments
                        SET paid_amount = $1,
                            notes = COALESCE($2, notes),
                            payment_date = $3,
                            updated_at = $3
                        WHERE id = $4
                        RETURNING {}
                        "#,
                        PAYMENT_COLUMNS
                    );
                    let paid = amount_field("amount", existing.paid_amount.saturating_add(share))?;
                    sqlx::query_as::<_, Payment>(&query)
                        .bind(paid)
                        .bind(notes.clone())
                        .bind(now)
                        .bind(existing.id)
                        .fetch_one(&mut *tx)
                        .await?
                }
                // Carry-over may come from a row created a moment ago in this same loop
                None => insert_row(&mut tx, &tenant, period, tenant.monthly_rent, share, notes.clone(), now).await?,
            };
            rows.push(PaymentView::from(row));
        }

        tx.commit().await?;

        tracing::info!(
            "Advance payment of {} over {} month(s) from {} for tenant {}",
            request.amount,
            request.months,
            start,
            tenant.id
        );
        Ok(rows)
    }

    pub async fn list_period(&self, scope: Scope, period: Period) -> ServiceResult<PeriodPayments> {
        let rows = match scope.admin_id() {
            Some(admin_id) => {
                let query = format!(
                    "{} WHERE p.month = $1 AND p.year = $2 AND t.admin_id = $3 ORDER BY t.full_name",
                    ROW_SELECT
                );
                sqlx::query_as::<_, PaymentRow>(&query)
                    .bind(i64::from(period.month))
                    .bind(i64::from(period.year))
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} WHERE p.month = $1 AND p.year = $2 ORDER BY t.full_name", ROW_SELECT);
                sqlx::query_as::<_, PaymentRow>(&query)
                    .bind(i64::from(period.month))
                    .bind(i64::from(period.year))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let entries: Vec<_> = rows.iter().map(|r| r.payment.entry()).collect();
        let summary = ledger::summarize(&entries);

        Ok(PeriodPayments {
            month: period.month,
            year: period.year,
            payments: rows.into_iter().map(PaymentView::from).collect(),
            summary,
        })
    }

    /// Full ledger of one tenant, latest month first
    pub async fn history(&self, scope: Scope, tenant_id: Uuid) -> ServiceResult<Vec<PaymentView>> {
        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT admin_id FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            Some((admin_id,)) if scope.includes(admin_id) => {}
            _ => return Err(ServiceError::NotFound(format!("Tenant {}", tenant_id))),
        }

        let query = format!("{} WHERE p.tenant_id = $1 ORDER BY p.year DESC, p.month DESC", ROW_SELECT);
        let rows = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PaymentView::from).collect())
    }

    pub async fn get(&self, scope: Scope, id: Uuid) -> ServiceResult<PaymentView> {
        let query = format!("{} WHERE p.id = $1", ROW_SELECT);
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) if scope.includes(row.admin_id) => Ok(row.into()),
            _ => Err(ServiceError::NotFound(format!("Payment {}", id))),
        }
    }

    /// Later months keep the carry-over they were created with
    pub async fn delete(&self, admin_id: Uuid, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query(
            "DELETE FROM payments WHERE id = $1 AND tenant_id IN (SELECT id FROM tenants WHERE admin_id = $2)",
        )
        .bind(id)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Payment {}", id)));
        }

        tracing::info!("Payment {} deleted", id);
        Ok(())
    }
}

fn amount_field(field: &'static str, amount: i64) -> ServiceResult<i64> {
    ledger::check_amount(amount).map_err(|e| ServiceError::invalid(field, e.to_string()))
}

async fn own_tenant(conn: &mut SqliteConnection, admin_id: Uuid, tenant_id: Uuid) -> ServiceResult<Tenant> {
    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, admin_id, warehouse_id, full_name, phone, product_type,
               monthly_rent, is_active, created_at, updated_at
        FROM tenants WHERE id = $1 AND admin_id = $2
        "#,
    )
    .bind(tenant_id)
    .bind(admin_id)
    .fetch_optional(&mut *conn)
    .await?;

    tenant.ok_or_else(|| ServiceError::NotFound(format!("Tenant {}", tenant_id)))
}

async fn find_row(conn: &mut SqliteConnection, tenant_id: Uuid, period: Period) -> ServiceResult<Option<Payment>> {
    let query = format!(
        "SELECT {} FROM payments WHERE tenant_id = $1 AND month = $2 AND year = $3",
        PAYMENT_COLUMNS
    );
    let row = sqlx::query_as::<_, Payment>(&query)
        .bind(tenant_id)
        .bind(i64::from(period.month))
        .bind(i64::from(period.year))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// New row for a period; carry-over is taken from the month before, as it stands right now
async fn insert_row(
    conn: &mut SqliteConnection,
    tenant: &Tenant,
    period: Period,
    expected_amount: i64,
    paid_amount: i64,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> ServiceResult<Payment> {
    let previous = find_row(conn, tenant.id, period.previous()).await?;
    let carry_over = carry_over_from(previous.map(|p| p.entry()).as_ref());

    let query = format!(
        r#"
        INSERT INTO payments (id, tenant_id, month, year, expected_amount, paid_amount,
                              carry_over_debt, notes, payment_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    );

    let payment = sqlx::query_as::<_, Payment>(&query)
        .bind(Uuid::new_v4())
        .bind(tenant.id)
        .bind(i64::from(period.month))
        .bind(i64::from(period.year))
        .bind(expected_amount)
        .bind(paid_amount)
        .bind(carry_over)
        .bind(notes)
        .bind((paid_amount > 0).then_some(now))
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

    tracing::debug!(
        "Payment row {} created for {} with carry-over {}",
        payment.id,
        period,
        carry_over
    );
    Ok(payment)
}
