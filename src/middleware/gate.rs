use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::gate::{evaluate, GateDecision, SessionState};
use crate::error::ApiError;
use crate::types::Role;

/// Routes open to the owner and to admins
pub async fn staff_only(request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(request, next, &[Role::Owner, Role::Admin]).await
}

pub async fn owner_only(request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(request, next, &[Role::Owner]).await
}

pub async fn admin_only(request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(request, next, &[Role::Admin]).await
}

/// Run the role gate and, on `Render`, hand the session to the handler as an extension
async fn enforce(mut request: Request, next: Next, allowed: &[Role]) -> Result<Response, ApiError> {
    let state = request
        .extensions()
        .get::<SessionState>()
        .cloned()
        .unwrap_or(SessionState::Loading);

    let decision = evaluate(&state, allowed);
    tracing::debug!("Gate decision for {} {}: {:?}", request.method(), request.uri().path(), decision);

    match (decision, state) {
        (GateDecision::Render, SessionState::Authenticated(session)) => {
            request.extensions_mut().insert(session);
            Ok(next.run(request).await)
        }
        (GateDecision::Pending, _) | (GateDecision::Render, _) => {
            Err(ApiError::service_unavailable("Session could not be resolved, please retry"))
        }
        (GateDecision::RedirectToLogin, _) => Err(ApiError::unauthorized("Authentication required")),
        (GateDecision::Blocked, SessionState::Authenticated(session)) => {
            tracing::warn!("Blocked admin {} refused at {}", session.user_id, request.uri().path());
            Err(ApiError::account_blocked("Your account has been blocked"))
        }
        (GateDecision::Blocked, _) => Err(ApiError::account_blocked("Your account has been blocked")),
        (GateDecision::RedirectToDashboard, _) => {
            tracing::warn!("Role mismatch at {}", request.uri().path());
            Err(ApiError::forbidden("You do not have access to this page"))
        }
    }
}
