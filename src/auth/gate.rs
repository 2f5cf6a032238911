// auth/gate.rs - Role gate
//
// Decides what happens to a request given the caller's session and the roles a route
// allows. No I/O here; middleware::gate maps the decision onto HTTP responses.

use serde::Serialize;
use uuid::Uuid;

use crate::types::{Role, Scope};

/// Resolved identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    /// Only ever true for admins
    pub blocked: bool,
}

impl Session {
    pub fn scope(&self) -> Scope {
        match self.role {
            Some(role) => Scope::for_role(role, self.user_id),
            None => Scope::Admin(self.user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Identity lookup has not finished yet
    Loading,
    Anonymous,
    Authenticated(Session),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pending,
    RedirectToLogin,
    Blocked,
    RedirectToDashboard,
    Render,
}

/// Evaluate the gate. An empty `allowed` list admits any account that has a role.
///
/// Order matters: the blocked check runs before the role check, so a blocked admin is
/// refused on every route.
pub fn evaluate(state: &SessionState, allowed: &[Role]) -> GateDecision {
    let session = match state {
        SessionState::Loading => return GateDecision::Pending,
        SessionState::Anonymous => return GateDecision::RedirectToLogin,
        SessionState::Authenticated(session) => session,
    };

    if session.blocked {
        return GateDecision::Blocked;
    }

    match session.role {
        None => GateDecision::RedirectToDashboard,
        Some(role) if allowed.is_empty() || allowed.contains(&role) => GateDecision::Render,
        Some(_) => GateDecision::RedirectToDashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Option<Role>, blocked: bool) -> SessionState {
        SessionState::Authenticated(Session {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
            blocked,
        })
    }

    #[test]
    fn loading_and_anonymous_never_render() {
        assert_eq!(evaluate(&SessionState::Loading, &[Role::Admin]), GateDecision::Pending);
        assert_eq!(evaluate(&SessionState::Anonymous, &[]), GateDecision::RedirectToLogin);
    }

    #[test]
    fn blocked_admin_is_refused_on_every_route() {
        let state = session(Some(Role::Admin), true);
        for allowed in [&[][..], &[Role::Admin][..], &[Role::Owner][..], &[Role::Owner, Role::Admin][..]] {
            assert_eq!(evaluate(&state, allowed), GateDecision::Blocked);
        }
    }

    #[test]
    fn role_mismatch_redirects_to_dashboard() {
        let admin = session(Some(Role::Admin), false);
        assert_eq!(evaluate(&admin, &[Role::Owner]), GateDecision::RedirectToDashboard);
        assert_eq!(evaluate(&admin, &[Role::Owner, Role::Admin]), GateDecision::Render);

        let plain_user = session(Some(Role::User), false);
        assert_eq!(evaluate(&plain_user, &[Role::Owner, Role::Admin]), GateDecision::RedirectToDashboard);
    }

    #[test]
    fn missing_role_is_a_mismatch() {
        assert_eq!(evaluate(&session(None, false), &[]), GateDecision::RedirectToDashboard);
    }

    #[test]
    fn owner_scope_covers_everything() {
        let owner = Session {
            user_id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            role: Some(Role::Owner),
            blocked: false,
        };
        assert_eq!(owner.scope(), Scope::All);
    }
}
