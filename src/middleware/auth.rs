use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::gate::SessionState;
use crate::auth::validate_jwt;
use crate::services::AccountService;
use crate::AppState;

/// Resolve the caller's session and attach it to the request.
///
/// Never refuses a request itself: a missing or bad token becomes `Anonymous`, a failed
/// account lookup stays `Loading`, and the gate layer decides what that means for the route.
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(&state, &headers).await;
    request.extensions_mut().insert(session);
    next.run(request).await
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> SessionState {
    let token = match extract_jwt_from_headers(headers) {
        Ok(token) => token,
        Err(msg) => {
            tracing::debug!("No session: {}", msg);
            return SessionState::Anonymous;
        }
    };

    let claims = match validate_jwt(&token, &state.config.security) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected token: {}", e);
            return SessionState::Anonymous;
        }
    };

    // Role and block flag come from the database, not the token, so blocking takes effect at once
    let accounts = AccountService::new(state.pool.clone(), state.config.security.clone());
    match accounts.session(claims.sub).await {
        Ok(Some(session)) => SessionState::Authenticated(session),
        Ok(None) => SessionState::Anonymous,
        Err(e) => {
            tracing::error!("Session lookup failed for {}: {}", claims.sub, e);
            SessionState::Loading
        }
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
        assert!(extract_jwt_from_headers(&headers("Basic dXNlcg==")).is_err());
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
    }
}
