// handlers/protected/accounts.rs - Identity, profile and admin management

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::gate::Session;
use crate::database::models::{Account, AdminStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{CreateAdminRequest, ProfileUpdate};
use crate::services::AccountService;
use crate::types::Role;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocked: bool,
}

fn accounts(state: &AppState) -> AccountService {
    AccountService::new(state.pool.clone(), state.config.security.clone())
}

/// GET /api/auth/whoami - The caller's account, read fresh from the database
pub async fn whoami(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Account> {
    let account = accounts(&state).account(session.user_id).await?;
    Ok(ApiResponse::success(account))
}

/// GET /api/profile
pub async fn profile_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Account> {
    let account = accounts(&state).account(session.user_id).await?;
    Ok(ApiResponse::success(account))
}

/// PUT /api/profile - Update own full name and phone
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<ProfileUpdate>,
) -> ApiResult<Account> {
    let account = accounts(&state).update_profile(session.user_id, body).await?;
    Ok(ApiResponse::success(account))
}

/// GET /api/admins - All admins, newest first (owner only)
pub async fn admins_list(State(state): State<AppState>) -> ApiResult<Vec<Account>> {
    let admins = accounts(&state).list_admins().await?;
    Ok(ApiResponse::success(admins))
}

/// POST /api/admins - Provision a new admin account (owner only)
///
/// Expected Input:
/// ```json
/// { "email": "admin@depot.uz", "password": "secret1", "full_name": "Aziz Rahimov", "phone": "+998901234567" }
/// ```
pub async fn admin_create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<CreateAdminRequest>,
) -> ApiResult<Account> {
    let admin = accounts(&state).create_admin(body).await?;
    tracing::info!("Owner {} created admin {}", session.user_id, admin.id);
    Ok(ApiResponse::created(admin))
}

/// GET /api/admins/:id
pub async fn admin_get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Account> {
    let service = accounts(&state);
    let admin = service.account(id).await?;
    if admin.role != Some(Role::Admin) {
        return Err(ApiError::not_found(format!("Admin {}", id)));
    }
    Ok(ApiResponse::success(admin))
}

/// PUT /api/admins/:id - Edit an admin's name and phone
pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProfileUpdate>,
) -> ApiResult<Account> {
    let admin = accounts(&state).update_admin(id, body).await?;
    Ok(ApiResponse::success(admin))
}

/// PUT /api/admins/:id/block - Block or unblock an admin
///
/// Takes effect on the admin's next request; the admin is notified either way.
pub async fn admin_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<BlockRequest>,
) -> ApiResult<AdminStatus> {
    let status = accounts(&state).set_blocked(id, body.blocked).await?;
    Ok(ApiResponse::success(status))
}
