// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{LoginRequest, LoginResponse};
use crate::services::AccountService;
use crate::AppState;

/// POST /auth/login - Exchange email and password for a JWT
///
/// Expected Input:
/// ```json
/// { "email": "admin@depot.uz", "password": "secret1" }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 604800,
///     "user": { "id": "...", "email": "admin@depot.uz", "role": "admin", "is_blocked": false }
///   }
/// }
/// ```
///
/// A blocked admin gets 403 `ACCOUNT_BLOCKED` even with the right password.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let accounts = AccountService::new(state.pool.clone(), state.config.security.clone());
    let response = accounts.login(body).await?;
    Ok(ApiResponse::success(response))
}
