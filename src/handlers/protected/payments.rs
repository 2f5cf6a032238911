// handlers/protected/payments.rs - Monthly ledger endpoints (admin only)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::PeriodQuery;
use crate::auth::gate::Session;
use crate::database::models::PaymentView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Download};
use crate::services::payment_service::{AdvancePayment, PeriodPayments, RecordPayment};
use crate::services::{ExportService, PaymentService};
use crate::AppState;

/// GET /api/payments?month=&year= - Rows for the period with totals
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "month": 3, "year": 2025,
///     "payments": [{ "tenant_name": "...", "expected_amount": 1500000, "carry_over_debt": 200000,
///                    "paid_amount": 1000000, "total_due": 1700000, "remaining": 700000, "status": "partial" }],
///     "summary": { "total_due": 1700000, "total_paid": 1000000, "remaining": 700000 }
///   }
/// }
/// ```
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<PeriodPayments> {
    let period = query.period()?;
    let listing = PaymentService::new(state.pool.clone())
        .list_period(session.scope(), period)
        .await?;
    Ok(ApiResponse::success(listing))
}

/// POST /api/payments - Record (create or overwrite) a tenant's payment for one month
///
/// Expected Input:
/// ```json
/// { "tenant_id": "uuid", "month": 3, "year": 2025, "paid_amount": 1000000, "notes": "cash" }
/// ```
pub async fn record(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<RecordPayment>,
) -> ApiResult<PaymentView> {
    let payment = PaymentService::new(state.pool.clone()).record(session.user_id, body).await?;
    Ok(ApiResponse::success(payment))
}

/// POST /api/payments/advance - Split one payment over several consecutive months
///
/// Expected Input:
/// ```json
/// { "tenant_id": "uuid", "start_month": 11, "start_year": 2025, "months": 3, "amount": 4500000 }
/// ```
pub async fn advance(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AdvancePayment>,
) -> ApiResult<Vec<PaymentView>> {
    let rows = PaymentService::new(state.pool.clone()).advance(session.user_id, body).await?;
    Ok(ApiResponse::created(rows))
}

/// GET /api/payments/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<PaymentView> {
    let payment = PaymentService::new(state.pool.clone()).get(session.scope(), id).await?;
    Ok(ApiResponse::success(payment))
}

/// DELETE /api/payments/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    PaymentService::new(state.pool.clone()).delete(session.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// GET /api/payments/export?month=&year= - `payments_<YYYY-MM>_<date>.xlsx`
pub async fn export(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> Result<Download, ApiError> {
    let period = query.period()?;
    let file = ExportService::new(state.pool.clone())
        .payments(session.scope(), period, Utc::now().date_naive())
        .await?;
    Ok(Download(file))
}
