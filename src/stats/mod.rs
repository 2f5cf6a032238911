// stats/mod.rs - Dashboard rollups over ledger rows
//
// Everything is recomputed from the rows handed in; StatsService does the loading.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::ledger::{Entry, PaymentStatus};

pub const DEFAULT_SERIES_MONTHS: u32 = 6;
pub const MAX_SERIES_MONTHS: u32 = 12;
pub const TOP_ADMINS: usize = 5;

/// Chart label language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Uz,
    Ru,
    En,
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uz" => Ok(Lang::Uz),
            "ru" => Ok(Lang::Ru),
            "en" => Ok(Lang::En),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

const MONTHS_UZ: [&str; 12] = ["Yan", "Fev", "Mar", "Apr", "May", "Iyn", "Iyl", "Avg", "Sen", "Okt", "Noy", "Dek"];
const MONTHS_RU: [&str; 12] = ["Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек"];
const MONTHS_EN: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Three-letter month label; out-of-range months get an empty label
pub fn month_label(lang: Lang, month: u32) -> &'static str {
    let table = match lang {
        Lang::Uz => &MONTHS_UZ,
        Lang::Ru => &MONTHS_RU,
        Lang::En => &MONTHS_EN,
    };
    month
        .checked_sub(1)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// Payment row reduced to what the rollups need
#[derive(Debug, Clone, FromRow)]
pub struct LedgerRow {
    pub tenant_id: Uuid,
    pub admin_id: Uuid,
    pub month: i64,
    pub year: i64,
    pub expected_amount: i64,
    pub paid_amount: i64,
    pub carry_over_debt: i64,
}

impl LedgerRow {
    pub fn entry(&self) -> Entry {
        Entry::new(self.expected_amount, self.paid_amount, self.carry_over_debt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Settlement {
    pub paid_tenants: usize,
    pub unpaid_tenants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerOverview {
    pub total_income: i64,
    pub total_admins: i64,
    pub active_admins: i64,
    pub blocked_admins: i64,
    pub total_warehouses: i64,
    pub total_tenants: i64,
    pub paid_tenants: usize,
    pub unpaid_tenants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub total_income: i64,
    pub total_tenants: i64,
    pub paid_tenants: usize,
    pub unpaid_tenants: usize,
    pub total_warehouses: i64,
}

/// Either overview, tagged by who asked
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Overview {
    Owner(OwnerOverview),
    Admin(AdminOverview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyIncome {
    pub month: String,
    pub income: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub expected: i64,
    pub paid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTypeCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminPerformance {
    pub admin_id: Uuid,
    pub name: String,
    pub income: i64,
    pub tenants: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub expected: i64,
    pub paid: i64,
    pub unpaid: i64,
    pub percentage: f64,
}

pub fn income(rows: &[LedgerRow]) -> i64 {
    rows.iter().fold(0, |acc: i64, r| acc.saturating_add(r.paid_amount))
}

/// Distinct tenants by ledger status, carry-over included. Partial counts as unpaid.
pub fn settlement(rows: &[LedgerRow]) -> Settlement {
    let mut paid = HashSet::new();
    let mut unpaid = HashSet::new();
    for row in rows {
        match row.entry().status() {
            PaymentStatus::Paid => paid.insert(row.tenant_id),
            PaymentStatus::Partial | PaymentStatus::Unpaid => unpaid.insert(row.tenant_id),
        };
    }
    Settlement {
        paid_tenants: paid.len(),
        unpaid_tenants: unpaid.len(),
    }
}

/// Clamp a requested series length to 1..=12, defaulting to six months
pub fn series_len(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_SERIES_MONTHS)
        .clamp(1, MAX_SERIES_MONTHS)
}

/// Paid totals for months 1..=months; months with no rows report zero
pub fn monthly_income(rows: &[LedgerRow], months: u32, lang: Lang) -> Vec<MonthlyIncome> {
    monthly_trend(rows, months, lang)
        .into_iter()
        .map(|t| MonthlyIncome {
            month: t.month,
            income: t.paid,
        })
        .collect()
}

/// Expected vs paid for months 1..=months. Expected excludes carry-over.
pub fn monthly_trend(rows: &[LedgerRow], months: u32, lang: Lang) -> Vec<MonthlyTrend> {
    (1..=months)
        .map(|m| {
            let (expected, paid) = rows
                .iter()
                .filter(|r| r.month == i64::from(m))
                .fold((0i64, 0i64), |(e, p), r| {
                    (e.saturating_add(r.expected_amount), p.saturating_add(r.paid_amount))
                });
            MonthlyTrend {
                month: month_label(lang, m).to_string(),
                expected,
                paid,
            }
        })
        .collect()
}

/// Count per product type, largest first; ties in name order
pub fn product_breakdown<'a>(product_types: impl IntoIterator<Item = &'a str>) -> Vec<ProductTypeCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for product_type in product_types {
        *counts.entry(product_type).or_default() += 1;
    }

    let mut out: Vec<ProductTypeCount> = counts
        .into_iter()
        .map(|(name, value)| ProductTypeCount {
            name: name.to_string(),
            value,
        })
        .collect();
    // stable sort keeps the BTreeMap's name order among equal counts
    out.sort_by(|a, b| b.value.cmp(&a.value));
    out
}

pub fn top_admins(mut admins: Vec<AdminPerformance>, limit: usize) -> Vec<AdminPerformance> {
    admins.sort_by(|a, b| b.income.cmp(&a.income));
    admins.truncate(limit);
    admins
}

/// Collection rate over expected amounts, rounded to one decimal
pub fn payment_summary(rows: &[LedgerRow]) -> PaymentSummary {
    let expected = rows.iter().fold(0, |acc: i64, r| acc.saturating_add(r.expected_amount));
    let paid = income(rows);
    let percentage = if expected > 0 {
        (paid as f64 / expected as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    PaymentSummary {
        expected,
        paid,
        unpaid: expected.saturating_sub(paid),
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tenant: Uuid, month: i64, expected: i64, paid: i64, carry: i64) -> LedgerRow {
        LedgerRow {
            tenant_id: tenant,
            admin_id: Uuid::nil(),
            month,
            year: 2025,
            expected_amount: expected,
            paid_amount: paid,
            carry_over_debt: carry,
        }
    }

    #[test]
    fn settlement_counts_carry_over_and_partials_as_unpaid() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            row(a, 3, 100, 100, 0),
            // covers this month but not last month's debt
            row(b, 3, 100, 100, 40),
            row(c, 3, 100, 0, 0),
        ];
        assert_eq!(
            settlement(&rows),
            Settlement {
                paid_tenants: 1,
                unpaid_tenants: 2
            }
        );
        assert_eq!(income(&rows), 200);
    }

    #[test]
    fn trend_fills_empty_months_with_zero() {
        let t = Uuid::new_v4();
        let rows = vec![row(t, 1, 500, 300, 0), row(t, 3, 500, 500, 200)];
        let trend = monthly_trend(&rows, 4, Lang::En);
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0], MonthlyTrend { month: "Jan".into(), expected: 500, paid: 300 });
        assert_eq!(trend[1], MonthlyTrend { month: "Feb".into(), expected: 0, paid: 0 });
        assert_eq!(trend[2].expected, 500, "carry-over is not part of expected");

        let income = monthly_income(&rows, 3, Lang::Uz);
        assert_eq!(income[0].month, "Yan");
        assert_eq!(income[2].income, 500);
    }

    #[test]
    fn series_length_is_clamped() {
        assert_eq!(series_len(None), 6);
        assert_eq!(series_len(Some(0)), 1);
        assert_eq!(series_len(Some(40)), 12);
    }

    #[test]
    fn product_types_sort_by_count_then_name() {
        let types = ["Mebel", "Oziq-ovqat", "Mebel", "Elektronika", "Oziq-ovqat", "Mebel"];
        let counts = product_breakdown(types.iter().copied());
        let names: Vec<_> = counts.iter().map(|c| (c.name.as_str(), c.value)).collect();
        assert_eq!(names, vec![("Mebel", 3), ("Oziq-ovqat", 2), ("Elektronika", 1)]);
    }

    #[test]
    fn top_admins_keeps_highest_income() {
        let admins: Vec<_> = (0..7)
            .map(|i| AdminPerformance {
                admin_id: Uuid::new_v4(),
                name: format!("Admin {}", i),
                income: i * 100,
                tenants: 1,
            })
            .collect();
        let top = top_admins(admins, TOP_ADMINS);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].income, 600);
        assert_eq!(top[4].income, 200);
    }

    #[test]
    fn summary_percentage_has_one_decimal() {
        let t = Uuid::new_v4();
        let summary = payment_summary(&[row(t, 1, 300, 100, 0)]);
        assert_eq!(summary.unpaid, 200);
        assert_eq!(summary.percentage, 33.3);
        assert_eq!(payment_summary(&[]).percentage, 0.0);
    }

    #[test]
    fn rollups_saturate_on_extreme_rows() {
        let rows = [row(Uuid::new_v4(), 1, i64::MAX, i64::MAX, 0), row(Uuid::new_v4(), 1, 10, 10, 0)];
        assert_eq!(income(&rows), i64::MAX);

        let summary = payment_summary(&rows);
        assert_eq!(summary.expected, i64::MAX);
        assert_eq!(summary.unpaid, 0);
    }

    #[test]
    fn month_labels_by_language() {
        assert_eq!(month_label(Lang::Ru, 12), "Дек");
        assert_eq!(month_label(Lang::Uz, 6), "Iyn");
        assert_eq!(month_label(Lang::En, 13), "");
        assert_eq!("ru".parse::<Lang>(), Ok(Lang::Ru));
    }
}
