use sqlx::SqlitePool;
use uuid::Uuid;

use super::ServiceResult;
use crate::ledger::Period;
use crate::stats::{
    self, AdminOverview, AdminPerformance, Lang, LedgerRow, MonthlyIncome, MonthlyTrend, Overview, OwnerOverview,
    PaymentSummary, ProductTypeCount,
};
use crate::types::Scope;

const LEDGER_SELECT: &str = r#"
    SELECT p.tenant_id, t.admin_id, p.month, p.year,
           p.expected_amount, p.paid_amount, p.carry_over_debt
    FROM payments p
    JOIN tenants t ON t.id = p.tenant_id
"#;

/// Loads ledger rows for a scope and hands them to the rollups in `stats`
pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self, scope: Scope, period: Period) -> ServiceResult<Overview> {
        let rows = self.period_rows(scope, period).await?;
        let settled = stats::settlement(&rows);
        let total_income = stats::income(&rows);
        let total_warehouses = self.count_warehouses(scope).await?;
        let total_tenants = self.count_active_tenants(scope).await?;

        let overview = match scope {
            Scope::All => {
                let (total_admins,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = 'admin'")
                        .fetch_one(&self.pool)
                        .await?;
                let (blocked_admins,): (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*) FROM admin_status s
                    JOIN user_roles r ON r.user_id = s.admin_id AND r.role = 'admin'
                    WHERE s.is_blocked = 1
                    "#,
                )
                .fetch_one(&self.pool)
                .await?;

                Overview::Owner(OwnerOverview {
                    total_income,
                    total_admins,
                    active_admins: total_admins - blocked_admins,
                    blocked_admins,
                    total_warehouses,
                    total_tenants,
                    paid_tenants: settled.paid_tenants,
                    unpaid_tenants: settled.unpaid_tenants,
                })
            }
            Scope::Admin(_) => Overview::Admin(AdminOverview {
                total_income,
                total_tenants,
                paid_tenants: settled.paid_tenants,
                unpaid_tenants: settled.unpaid_tenants,
                total_warehouses,
            }),
        };

        Ok(overview)
    }

    pub async fn monthly_income(
        &self,
        scope: Scope,
        year: i32,
        months: u32,
        lang: Lang,
    ) -> ServiceResult<Vec<MonthlyIncome>> {
        let rows = self.year_rows(scope, year).await?;
        Ok(stats::monthly_income(&rows, months, lang))
    }

    pub async fn monthly_trend(
        &self,
        scope: Scope,
        year: i32,
        months: u32,
        lang: Lang,
    ) -> ServiceResult<Vec<MonthlyTrend>> {
        let rows = self.year_rows(scope, year).await?;
        Ok(stats::monthly_trend(&rows, months, lang))
    }

    /// Active tenants only
    pub async fn product_types(&self, scope: Scope) -> ServiceResult<Vec<ProductTypeCount>> {
        let types: Vec<(String,)> = match scope.admin_id() {
            Some(admin_id) => {
                sqlx::query_as("SELECT product_type FROM tenants WHERE is_active = 1 AND admin_id = $1")
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT product_type FROM tenants WHERE is_active = 1")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(stats::product_breakdown(types.iter().map(|(t,)| t.as_str())))
    }

    /// Income from each admin's active tenants in the period, top five
    pub async fn admin_performance(&self, period: Period) -> ServiceResult<Vec<AdminPerformance>> {
        let rows: Vec<(Uuid, Option<String>, i64, i64)> = sqlx::query_as(
            r#"
            SELECT r.user_id,
                   p.full_name,
                   (SELECT COALESCE(SUM(pay.paid_amount), 0)
                      FROM payments pay
                      JOIN tenants t ON t.id = pay.tenant_id
                     WHERE t.admin_id = r.user_id AND t.is_active = 1
                       AND pay.month = $1 AND pay.year = $2) AS income,
                   (SELECT COUNT(*) FROM tenants t
                     WHERE t.admin_id = r.user_id AND t.is_active = 1) AS tenants
            FROM user_roles r
            LEFT JOIN profiles p ON p.user_id = r.user_id
            WHERE r.role = 'admin'
            "#,
        )
        .bind(i64::from(period.month))
        .bind(i64::from(period.year))
        .fetch_all(&self.pool)
        .await?;

        let admins = rows
            .into_iter()
            .map(|(admin_id, name, income, tenants)| AdminPerformance {
                admin_id,
                name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| "Admin".to_string()),
                income,
                tenants,
            })
            .collect();

        Ok(stats::top_admins(admins, stats::TOP_ADMINS))
    }

    pub async fn payment_summary(&self, scope: Scope, period: Period) -> ServiceResult<PaymentSummary> {
        let rows = self.period_rows(scope, period).await?;
        Ok(stats::payment_summary(&rows))
    }

    async fn period_rows(&self, scope: Scope, period: Period) -> ServiceResult<Vec<LedgerRow>> {
        let rows = match scope.admin_id() {
            Some(admin_id) => {
                let query = format!("{} WHERE p.month = $1 AND p.year = $2 AND t.admin_id = $3", LEDGER_SELECT);
                sqlx::query_as::<_, LedgerRow>(&query)
                    .bind(i64::from(period.month))
                    .bind(i64::from(period.year))
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} WHERE p.month = $1 AND p.year = $2", LEDGER_SELECT);
                sqlx::query_as::<_, LedgerRow>(&query)
                    .bind(i64::from(period.month))
                    .bind(i64::from(period.year))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn year_rows(&self, scope: Scope, year: i32) -> ServiceResult<Vec<LedgerRow>> {
        let rows = match scope.admin_id() {
            Some(admin_id) => {
                let query = format!("{} WHERE p.year = $1 AND t.admin_id = $2", LEDGER_SELECT);
                sqlx::query_as::<_, LedgerRow>(&query)
                    .bind(i64::from(year))
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} WHERE p.year = $1", LEDGER_SELECT);
                sqlx::query_as::<_, LedgerRow>(&query)
                    .bind(i64::from(year))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn count_warehouses(&self, scope: Scope) -> ServiceResult<i64> {
        let (count,): (i64,) = match scope.admin_id() {
            Some(admin_id) => {
                sqlx::query_as("SELECT COUNT(*) FROM warehouses WHERE admin_id = $1")
                    .bind(admin_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM warehouses")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    async fn count_active_tenants(&self, scope: Scope) -> ServiceResult<i64> {
        let (count,): (i64,) = match scope.admin_id() {
            Some(admin_id) => {
                sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE is_active = 1 AND admin_id = $1")
                    .bind(admin_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE is_active = 1")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
