// handlers/protected/stats.rs - Dashboard statistics
//
// All figures default to the current month/year and are scoped by the caller's role.

use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::PeriodQuery;
use crate::auth::gate::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::StatsService;
use crate::stats::{self, AdminPerformance, Lang, MonthlyIncome, MonthlyTrend, Overview, PaymentSummary, ProductTypeCount};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub year: Option<i32>,
    pub months: Option<u32>,
    pub lang: Option<String>,
}

impl SeriesQuery {
    fn resolve(&self) -> Result<(i32, u32, Lang), ApiError> {
        let year = self.year.unwrap_or_else(|| Utc::now().year());
        let lang = match self.lang.as_deref() {
            Some(lang) => lang.parse().map_err(|e: String| ApiError::field_error("lang", e))?,
            None => Lang::default(),
        };
        Ok((year, stats::series_len(self.months), lang))
    }
}

/// GET /api/stats/overview - Owner or admin overview, tagged by `view`
pub async fn overview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Overview> {
    let period = query.period()?;
    let overview = StatsService::new(state.pool.clone())
        .overview(session.scope(), period)
        .await?;
    Ok(ApiResponse::success(overview))
}

/// GET /api/stats/monthly-income?year=&months=&lang=
pub async fn monthly_income(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Vec<MonthlyIncome>> {
    let (year, months, lang) = query.resolve()?;
    let series = StatsService::new(state.pool.clone())
        .monthly_income(session.scope(), year, months, lang)
        .await?;
    Ok(ApiResponse::success(series))
}

/// GET /api/stats/monthly-trend?year=&months=&lang=
pub async fn monthly_trend(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Vec<MonthlyTrend>> {
    let (year, months, lang) = query.resolve()?;
    let series = StatsService::new(state.pool.clone())
        .monthly_trend(session.scope(), year, months, lang)
        .await?;
    Ok(ApiResponse::success(series))
}

/// GET /api/stats/product-types
pub async fn product_types(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<ProductTypeCount>> {
    let breakdown = StatsService::new(state.pool.clone()).product_types(session.scope()).await?;
    Ok(ApiResponse::success(breakdown))
}

/// GET /api/stats/admin-performance - Top five admins by income (owner only)
pub async fn admin_performance(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Vec<AdminPerformance>> {
    let period = query.period()?;
    let top = StatsService::new(state.pool.clone()).admin_performance(period).await?;
    Ok(ApiResponse::success(top))
}

/// GET /api/stats/payment-summary
pub async fn payment_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<PaymentSummary> {
    let period = query.period()?;
    let summary = StatsService::new(state.pool.clone())
        .payment_summary(session.scope(), period)
        .await?;
    Ok(ApiResponse::success(summary))
}
