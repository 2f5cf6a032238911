pub mod account;
pub mod notification;
pub mod payment;
pub mod tenant;
pub mod warehouse;

pub use account::{Account, AccountRow, AdminStatus};
pub use notification::Notification;
pub use payment::{Payment, PaymentRow, PaymentView};
pub use tenant::{Tenant, TenantListing};
pub use warehouse::Warehouse;
