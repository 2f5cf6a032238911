/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account role, one per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Which rows a caller may see: the owner sees everything, an admin only their own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Admin(Uuid),
}

impl Scope {
    pub fn for_role(role: Role, user_id: Uuid) -> Self {
        match role {
            Role::Owner => Scope::All,
            _ => Scope::Admin(user_id),
        }
    }

    pub fn admin_id(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Admin(id) => Some(*id),
        }
    }

    pub fn includes(&self, admin_id: Uuid) -> bool {
        match self {
            Scope::All => true,
            Scope::Admin(id) => *id == admin_id,
        }
    }
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
    PaymentReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::PaymentReminder => "payment_reminder",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(NotificationKind::Info),
            "success" => Ok(NotificationKind::Success),
            "warning" => Ok(NotificationKind::Warning),
            "error" => Ok(NotificationKind::Error),
            "payment_reminder" => Ok(NotificationKind::PaymentReminder),
            other => Err(format!("unknown notification kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("owner".parse::<Role>(), Ok(Role::Owner));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn scope_limits_admins_to_their_rows() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = Scope::for_role(Role::Admin, me);
        assert!(scope.includes(me));
        assert!(!scope.includes(other));
        assert!(Scope::for_role(Role::Owner, me).includes(other));
    }
}
