use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::{PaymentService, ServiceResult, TenantService, WarehouseService};
use crate::export::{self, Cell, Sheet};
use crate::ledger::{PaymentStatus, Period};
use crate::types::Scope;

/// A rendered workbook ready to be sent as a download
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Builds the xlsx downloads from the same queries the list endpoints use
pub struct ExportService {
    pool: SqlitePool,
}

impl ExportService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn warehouses(&self, scope: Scope, today: NaiveDate) -> ServiceResult<ExportFile> {
        let warehouses = WarehouseService::new(self.pool.clone()).list(scope).await?;

        let mut sheet = Sheet::new("Warehouses", &["Name", "Address", "Description", "Active", "Created"]);
        for w in warehouses {
            sheet.push_row(vec![
                w.name.into(),
                w.address.into(),
                w.description.into(),
                yes_no(w.is_active),
                w.created_at.format("%Y-%m-%d").to_string().into(),
            ]);
        }

        finish(&sheet, "warehouses", today)
    }

    /// The owner's export carries an extra admin column
    pub async fn tenants(&self, scope: Scope, today: NaiveDate) -> ServiceResult<ExportFile> {
        let tenants = TenantService::new(self.pool.clone()).list(scope).await?;
        let with_admin = scope == Scope::All;

        let mut headers = vec!["Full name", "Phone", "Warehouse", "Product type", "Monthly rent", "Active"];
        if with_admin {
            headers.push("Admin");
        }

        let mut sheet = Sheet::new("Tenants", &headers);
        for listing in tenants {
            let t = listing.tenant;
            let mut row = vec![
                t.full_name.into(),
                t.phone.into(),
                listing.warehouse_name.into(),
                t.product_type.into(),
                t.monthly_rent.into(),
                yes_no(t.is_active),
            ];
            if with_admin {
                row.push(listing.admin_name.into());
            }
            sheet.push_row(row);
        }

        finish(&sheet, "tenants", today)
    }

    pub async fn payments(&self, scope: Scope, period: Period, today: NaiveDate) -> ServiceResult<ExportFile> {
        let listing = PaymentService::new(self.pool.clone()).list_period(scope, period).await?;

        let mut sheet = Sheet::new(
            format!("Payments {}", period),
            &[
                "Tenant",
                "Phone",
                "Product type",
                "Expected",
                "Carry-over",
                "Total due",
                "Paid",
                "Remaining",
                "Status",
                "Notes",
            ],
        );
        for p in listing.payments {
            sheet.push_row(vec![
                p.tenant_name.into(),
                p.tenant_phone.into(),
                p.product_type.into(),
                p.payment.expected_amount.into(),
                p.payment.carry_over_debt.into(),
                p.total_due.into(),
                p.payment.paid_amount.into(),
                p.remaining.into(),
                status_label(p.status).into(),
                p.payment.notes.into(),
            ]);
        }

        finish(&sheet, &format!("payments_{}", period), today)
    }
}

fn finish(sheet: &Sheet, base: &str, today: NaiveDate) -> ServiceResult<ExportFile> {
    let bytes = export::render(sheet)?;
    tracing::info!("Exported {} row(s) to {}", sheet.rows.len(), base);
    Ok(ExportFile {
        filename: export::filename(base, today),
        bytes,
    })
}

fn yes_no(flag: bool) -> Cell {
    Cell::from(if flag { "Yes" } else { "No" })
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Paid",
        PaymentStatus::Partial => "Partial",
        PaymentStatus::Unpaid => "Unpaid",
    }
}
