// handlers/protected/warehouses.rs - Warehouse CRUD and export

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::gate::Session;
use crate::database::models::Warehouse;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Download};
use crate::services::warehouse_service::WarehouseRequest;
use crate::services::{ExportService, WarehouseService};
use crate::AppState;

/// GET /api/warehouses - Own warehouses for an admin, all of them for the owner
pub async fn list(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Vec<Warehouse>> {
    let warehouses = WarehouseService::new(state.pool.clone()).list(session.scope()).await?;
    Ok(ApiResponse::success(warehouses))
}

/// GET /api/warehouses/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Warehouse> {
    let warehouse = WarehouseService::new(state.pool.clone()).get(session.scope(), id).await?;
    Ok(ApiResponse::success(warehouse))
}

/// POST /api/warehouses
///
/// Expected Input:
/// ```json
/// { "name": "Chilonzor 1", "address": "Chilonzor 9-kvartal", "description": null, "is_active": true }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<WarehouseRequest>,
) -> ApiResult<Warehouse> {
    let warehouse = WarehouseService::new(state.pool.clone()).create(session.user_id, body).await?;
    Ok(ApiResponse::created(warehouse))
}

/// PUT /api/warehouses/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<WarehouseRequest>,
) -> ApiResult<Warehouse> {
    let warehouse = WarehouseService::new(state.pool.clone())
        .update(session.user_id, id, body)
        .await?;
    Ok(ApiResponse::success(warehouse))
}

/// DELETE /api/warehouses/:id - 409 while tenants are still assigned
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    WarehouseService::new(state.pool.clone()).delete(session.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// GET /api/warehouses/export - `warehouses_<date>.xlsx`
pub async fn export(State(state): State<AppState>, Extension(session): Extension<Session>) -> Result<Download, ApiError> {
    let file = ExportService::new(state.pool.clone())
        .warehouses(session.scope(), Utc::now().date_naive())
        .await?;
    Ok(Download(file))
}
