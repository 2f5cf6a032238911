pub mod account_service;
pub mod export_service;
pub mod notification_service;
pub mod payment_service;
pub mod reminder_service;
pub mod stats_service;
pub mod tenant_service;
pub mod warehouse_service;

pub use account_service::AccountService;
pub use export_service::ExportService;
pub use notification_service::NotificationService;
pub use payment_service::PaymentService;
pub use reminder_service::{ReminderReport, ReminderService};
pub use stats_service::StatsService;
pub use tenant_service::TenantService;
pub use warehouse_service::WarehouseService;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::export::ExportError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Account blocked: {0}")]
    Blocked(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl ServiceError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Trim a required text field, failing when nothing is left
pub(crate) fn required(field: &'static str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(field, format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Optional text: blank input is stored as NULL
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Depot 1 ").unwrap(), "Depot 1");
        assert!(matches!(
            required("name", "   "),
            Err(ServiceError::Validation { field: Some("name"), .. })
        ));
    }

    #[test]
    fn optional_drops_blank_values() {
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional(None), None);
    }
}
