// handlers/protected/mod.rs - Protected handlers (session + role gate required)
//
// Every route here sits behind session_middleware and one of the gate layers, so handlers
// receive the admitted `Session` as an extension. Role scope (owner sees all, admin sees own)
// is taken from that session, never from request input.

pub mod accounts;
pub mod notifications;
pub mod payments;
pub mod stats;
pub mod tenants;
pub mod warehouses;

use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::ledger::Period;

/// `?month=&year=` with the current month as the default
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<Period, ApiError> {
        let current = Period::from_date(Utc::now().date_naive());
        Period::new(self.month.unwrap_or(current.month), self.year.unwrap_or(current.year))
            .map_err(|e| ApiError::field_error("month", e.to_string()))
    }
}
