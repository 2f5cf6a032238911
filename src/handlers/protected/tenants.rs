// handlers/protected/tenants.rs - Tenant CRUD, payment history and export

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::gate::Session;
use crate::database::models::{PaymentView, Tenant, TenantListing};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Download};
use crate::services::tenant_service::TenantRequest;
use crate::services::{ExportService, PaymentService, TenantService};
use crate::AppState;

/// GET /api/tenants - Tenants with warehouse name; the owner's list also names the admin
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<TenantListing>> {
    let tenants = TenantService::new(state.pool.clone()).list(session.scope()).await?;
    Ok(ApiResponse::success(tenants))
}

/// GET /api/tenants/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<TenantListing> {
    let tenant = TenantService::new(state.pool.clone()).get(session.scope(), id).await?;
    Ok(ApiResponse::success(tenant))
}

/// POST /api/tenants
///
/// Expected Input:
/// ```json
/// {
///   "warehouse_id": "uuid",
///   "full_name": "Bekzod Karimov",
///   "phone": "+998901112233",
///   "product_type": "Mebel",
///   "monthly_rent": 1500000
/// }
/// ```
///
/// The warehouse must belong to the calling admin.
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<TenantRequest>,
) -> ApiResult<Tenant> {
    let tenant = TenantService::new(state.pool.clone()).create(session.user_id, body).await?;
    Ok(ApiResponse::created(tenant))
}

/// PUT /api/tenants/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<TenantRequest>,
) -> ApiResult<Tenant> {
    let tenant = TenantService::new(state.pool.clone())
        .update(session.user_id, id, body)
        .await?;
    Ok(ApiResponse::success(tenant))
}

/// DELETE /api/tenants/:id - Removes the tenant's payment rows too
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    TenantService::new(state.pool.clone()).delete(session.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// GET /api/tenants/:id/payments - Ledger history, latest month first
pub async fn payments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<PaymentView>> {
    let history = PaymentService::new(state.pool.clone()).history(session.scope(), id).await?;
    Ok(ApiResponse::success(history))
}

/// GET /api/tenants/export - `tenants_<date>.xlsx`
pub async fn export(State(state): State<AppState>, Extension(session): Extension<Session>) -> Result<Download, ApiError> {
    let file = ExportService::new(state.pool.clone())
        .tenants(session.scope(), Utc::now().date_naive())
        .await?;
    Ok(Download(file))
}
