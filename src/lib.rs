pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod scheduler;
pub mod services;
pub mod stats;
pub mod types;

use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::DatabaseManager;
use crate::error::ApiError;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

/// Connect, migrate, start the reminder job and serve until the process exits
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;

    let _reminders = scheduler::spawn_reminder_job(pool.clone(), &config.reminders);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("rentdesk API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(pool, config))).await?;
    Ok(())
}

/// The full application router
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .nest("/api", protected_routes(state.clone()));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/setup", get(auth::setup_status))
        .route("/auth/setup/owner", post(auth::create_owner))
}

/// Three route groups, one per role gate, sharing a single session layer
fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{accounts, notifications, payments, stats, tenants, warehouses};

    let staff = Router::new()
        .route("/auth/whoami", get(accounts::whoami))
        .route("/profile", get(accounts::profile_get).put(accounts::profile_put))
        .route("/warehouses", get(warehouses::list))
        .route("/warehouses/export", get(warehouses::export))
        .route("/warehouses/:id", get(warehouses::show))
        .route("/tenants", get(tenants::list))
        .route("/tenants/export", get(tenants::export))
        .route("/tenants/:id", get(tenants::show))
        .route("/tenants/:id/payments", get(tenants::payments))
        .route("/stats/overview", get(stats::overview))
        .route("/stats/monthly-income", get(stats::monthly_income))
        .route("/stats/monthly-trend", get(stats::monthly_trend))
        .route("/stats/product-types", get(stats::product_types))
        .route("/stats/payment-summary", get(stats::payment_summary))
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route_layer(from_fn(middleware::staff_only));

    let owner = Router::new()
        .route("/admins", get(accounts::admins_list).post(accounts::admin_create))
        .route("/admins/:id", get(accounts::admin_get).put(accounts::admin_update))
        .route("/admins/:id/block", put(accounts::admin_block))
        .route("/stats/admin-performance", get(stats::admin_performance))
        .route("/reminders/run", post(notifications::run_reminders))
        .route_layer(from_fn(middleware::owner_only));

    let admin = Router::new()
        .route("/warehouses", post(warehouses::create))
        .route("/warehouses/:id", put(warehouses::update).delete(warehouses::delete))
        .route("/tenants", post(tenants::create))
        .route("/tenants/:id", put(tenants::update).delete(tenants::delete))
        .route("/payments", get(payments::list).post(payments::record))
        .route("/payments/advance", post(payments::advance))
        .route("/payments/export", get(payments::export))
        .route("/payments/:id", get(payments::show).delete(payments::delete))
        .route_layer(from_fn(middleware::admin_only));

    Router::new()
        .merge(staff)
        .merge(owner)
        .merge(admin)
        .layer(from_fn_with_state(state, middleware::session_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "rentdesk-api",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Warehouse rental management API",
        "endpoints": {
            "public": ["/", "/health", "/auth/login", "/auth/setup", "/auth/setup/owner"],
            "protected": [
                "/api/auth/whoami",
                "/api/profile",
                "/api/admins",
                "/api/warehouses",
                "/api/tenants",
                "/api/payments",
                "/api/stats/*",
                "/api/notifications",
                "/api/reminders/run"
            ]
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    DatabaseManager::health_check(&state.pool).await?;
    Ok(Json(json!({
        "status": "ok",
        "database": "ok",
        "environment": state.config.environment,
    })))
}
