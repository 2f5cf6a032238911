use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ledger::{Entry, PaymentStatus};

/// One ledger row: what a tenant owed and paid for a single month
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub month: i64,
    pub year: i64,
    pub expected_amount: i64,
    pub paid_amount: i64,
    pub carry_over_debt: i64,
    pub notes: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn entry(&self) -> Entry {
        Entry::new(self.expected_amount, self.paid_amount, self.carry_over_debt)
    }
}

/// Payment joined with its tenant, as listed for a period
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    #[sqlx(flatten)]
    pub payment: Payment,
    pub tenant_name: String,
    pub tenant_phone: String,
    pub product_type: String,
    pub admin_id: Uuid,
}

/// API view with the ledger figures computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub tenant_name: Option<String>,
    pub tenant_phone: Option<String>,
    pub product_type: Option<String>,
    pub total_due: i64,
    pub remaining: i64,
    pub status: PaymentStatus,
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        let entry = payment.entry();
        Self {
            total_due: entry.total_due(),
            remaining: entry.remaining(),
            status: entry.status(),
            tenant_name: None,
            tenant_phone: None,
            product_type: None,
            payment,
        }
    }
}

impl From<PaymentRow> for PaymentView {
    fn from(row: PaymentRow) -> Self {
        let mut view = PaymentView::from(row.payment);
        view.tenant_name = Some(row.tenant_name);
        view.tenant_phone = Some(row.tenant_phone);
        view.product_type = Some(row.product_type);
        view
    }
}
