pub mod auth;
pub mod gate;
pub mod response;

pub use auth::session_middleware;
pub use gate::{admin_only, owner_only, staff_only};
pub use response::{ApiResponse, ApiResult, Download};
