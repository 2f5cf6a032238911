pub mod login;
pub mod setup;

pub use login::login;
pub use setup::{create_owner, setup_status};
