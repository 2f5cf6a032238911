// handlers/public/auth/setup.rs - Owner bootstrap

use axum::{extract::State, Json};
use serde::Serialize;

use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::CreateOwnerRequest;
use crate::services::AccountService;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SetupStatus {
    pub owner_exists: bool,
}

/// GET /auth/setup - Whether the owner account has been created yet
pub async fn setup_status(State(state): State<AppState>) -> ApiResult<SetupStatus> {
    let accounts = AccountService::new(state.pool.clone(), state.config.security.clone());
    let owner_exists = accounts.owner_exists().await?;
    Ok(ApiResponse::success(SetupStatus { owner_exists }))
}

/// POST /auth/setup/owner - Create the owner account
///
/// Requires `secret_key` to match the server's configured owner secret (401 otherwise).
/// Refused with 400 once an owner exists.
pub async fn create_owner(
    State(state): State<AppState>,
    Json(body): Json<CreateOwnerRequest>,
) -> ApiResult<Account> {
    let accounts = AccountService::new(state.pool.clone(), state.config.security.clone());
    let owner = accounts.create_owner(body).await?;
    Ok(ApiResponse::created(owner))
}
