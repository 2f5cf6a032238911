use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::notification_service::{self, NewNotification};
use super::{required, ServiceError, ServiceResult};
use crate::auth::{self, gate::Session, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{Account, AccountRow, AdminStatus};
use crate::types::{NotificationKind, Role};

const ACCOUNT_SELECT: &str = r#"
    SELECT u.id, u.email, u.pwd_hash, u.created_at,
           p.full_name, p.phone, r.role, s.is_blocked
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
    LEFT JOIN user_roles r ON r.user_id = u.id
    LEFT JOIN admin_status s ON s.admin_id = u.id
"#;

const BLOCKED_REASON: &str = "Blocked by owner";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOwnerRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
}

/// Accounts, roles, admin blocking and profiles
pub struct AccountService {
    pool: SqlitePool,
    security: SecurityConfig,
}

impl AccountService {
    pub fn new(pool: SqlitePool, security: SecurityConfig) -> Self {
        Self { pool, security }
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(ServiceError::Validation {
                field: None,
                message: "Email and password are required".to_string(),
            });
        }

        let row = self.find_by_email(&email).await?;
        let row = match row {
            Some(row) if auth::verify_password(&request.password, &row.pwd_hash) => row,
            _ => {
                tracing::warn!("Failed login attempt for {}", email);
                return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        if row.is_blocked() {
            tracing::warn!("Blocked admin {} attempted to log in", row.id);
            return Err(ServiceError::Blocked("Your account has been blocked".to_string()));
        }

        let role = row
            .role()
            .ok_or_else(|| ServiceError::Forbidden("Account has no role assigned".to_string()))?;

        let claims = Claims::new(row.id, row.email.clone(), role, self.security.jwt_expiry_hours);
        let token = auth::generate_jwt(&claims, &self.security)?;

        tracing::info!("User {} logged in as {}", row.id, role);
        Ok(LoginResponse {
            token,
            expires_in: self.security.jwt_expiry_hours * 3600,
            user: row.into(),
        })
    }

    /// Fresh role and block state for a token subject; `None` when the account is gone
    pub async fn session(&self, user_id: Uuid) -> ServiceResult<Option<Session>> {
        let row = self.find_by_id(user_id).await?;
        Ok(row.map(|row| Session {
            user_id: row.id,
            email: row.email.clone(),
            role: row.role(),
            blocked: row.is_blocked(),
        }))
    }

    pub async fn owner_exists(&self) -> ServiceResult<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = 'owner'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// One-time owner bootstrap guarded by the configured secret key
    pub async fn create_owner(&self, request: CreateOwnerRequest) -> ServiceResult<Account> {
        if self.security.owner_secret_key.is_empty() || request.secret_key != self.security.owner_secret_key {
            tracing::warn!("Owner setup attempted with an invalid secret key");
            return Err(ServiceError::Unauthorized("Invalid secret key".to_string()));
        }

        self.bootstrap_owner(&request.email, &request.password, &request.full_name).await
    }

    /// Owner creation without the secret check, for the operator CLI
    pub async fn bootstrap_owner(&self, email: &str, password: &str, full_name: &str) -> ServiceResult<Account> {
        let email = validate_email(email)?;
        let full_name = required("full_name", full_name)?;
        self.validate_password(password)?;

        let mut tx = self.pool.begin().await?;

        // Uniqueness is only checked here, at creation time
        let (owners,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = 'owner'")
            .fetch_one(&mut *tx)
            .await?;
        if owners > 0 {
            return Err(ServiceError::BadRequest("Owner already exists".to_string()));
        }

        let user_id = insert_account(&mut tx, &email, password, &full_name, "", Role::Owner).await?;
        tx.commit().await?;

        tracing::info!("Owner account created: {}", user_id);
        self.account(user_id).await
    }

    /// Create an admin account. Any failure rolls the whole account back.
    pub async fn create_admin(&self, request: CreateAdminRequest) -> ServiceResult<Account> {
        let email = validate_email(&request.email)?;
        let full_name = required("full_name", &request.full_name)?;
        let phone = required("phone", &request.phone)?;
        self.validate_password(&request.password)?;

        let mut tx = self.pool.begin().await?;
        let user_id = insert_account(&mut tx, &email, &request.password, &full_name, &phone, Role::Admin).await?;

        sqlx::query("INSERT INTO admin_status (admin_id, is_blocked, updated_at) VALUES ($1, 0, $2)")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Admin account created: {} ({})", user_id, email);
        self.account(user_id).await
    }

    pub async fn list_admins(&self) -> ServiceResult<Vec<Account>> {
        let query = format!("{} WHERE r.role = 'admin' ORDER BY u.created_at DESC", ACCOUNT_SELECT);
        let rows = sqlx::query_as::<_, AccountRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    pub async fn update_admin(&self, admin_id: Uuid, update: ProfileUpdate) -> ServiceResult<Account> {
        self.require_admin(admin_id).await?;
        self.update_profile(admin_id, update).await
    }

    /// Block or unblock an admin and tell them about it, in one transaction
    pub async fn set_blocked(&self, admin_id: Uuid, blocked: bool) -> ServiceResult<AdminStatus> {
        self.require_admin(admin_id).await?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_as::<_, AdminStatus>(
            r#"
            INSERT INTO admin_status (admin_id, is_blocked, blocked_at, blocked_reason, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (admin_id) DO UPDATE SET
                is_blocked = excluded.is_blocked,
                blocked_at = excluded.blocked_at,
                blocked_reason = excluded.blocked_reason,
                updated_at = excluded.updated_at
            RETURNING admin_id, is_blocked, blocked_at, blocked_reason, updated_at
            "#,
        )
        .bind(admin_id)
        .bind(blocked)
        .bind(blocked.then_some(now))
        .bind(blocked.then_some(BLOCKED_REASON))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let (title, message, kind) = if blocked {
            ("Account blocked", "Your account has been blocked by the owner.", NotificationKind::Warning)
        } else {
            ("Account unblocked", "Your account has been unblocked by the owner.", NotificationKind::Success)
        };
        notification_service::insert(
            &mut *tx,
            NewNotification {
                user_id: admin_id,
                title: title.to_string(),
                message: message.to_string(),
                kind,
                related_id: None,
                related_type: None,
            },
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Admin {} {}", admin_id, if blocked { "blocked" } else { "unblocked" });
        Ok(status)
    }

    pub async fn account(&self, user_id: Uuid) -> ServiceResult<Account> {
        self.find_by_id(user_id)
            .await?
            .map(Account::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User {}", user_id)))
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> ServiceResult<Account> {
        let full_name = required("full_name", &update.full_name)?;
        let phone = update.phone.trim().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, full_name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = excluded.full_name,
                phone = excluded.phone,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&full_name)
        .bind(&phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.account(user_id).await
    }

    async fn require_admin(&self, user_id: Uuid) -> ServiceResult<AccountRow> {
        match self.find_by_id(user_id).await? {
            Some(row) if row.role() == Some(Role::Admin) => Ok(row),
            _ => Err(ServiceError::NotFound(format!("Admin {}", user_id))),
        }
    }

    async fn find_by_id(&self, user_id: Uuid) -> ServiceResult<Option<AccountRow>> {
        let query = format!("{} WHERE u.id = $1", ACCOUNT_SELECT);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<AccountRow>> {
        let query = format!("{} WHERE u.email = $1", ACCOUNT_SELECT);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    fn validate_password(&self, password: &str) -> ServiceResult<()> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(ServiceError::invalid(
                "password",
                format!("Password must be at least {} characters", min),
            ));
        }
        if password.len() > 128 {
            return Err(ServiceError::invalid("password", "Password must be at most 128 characters"));
        }
        Ok(())
    }
}

/// Insert user, profile and role rows inside the caller's transaction
async fn insert_account(
    tx: &mut Transaction<'_, Sqlite>,
    email: &str,
    password: &str,
    full_name: &str,
    phone: &str,
    role: Role,
) -> ServiceResult<Uuid> {
    let pwd_hash = auth::hash_password(password)?;
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query("INSERT INTO users (id, email, pwd_hash, created_at) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(email)
        .bind(pwd_hash)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| match ServiceError::from(e) {
            ServiceError::Database(crate::database::DatabaseError::UniqueViolation(_)) => {
                ServiceError::Conflict(format!("Email {} is already registered", email))
            }
            other => other,
        })?;

    sqlx::query(
        "INSERT INTO profiles (user_id, full_name, phone, created_at, updated_at) VALUES ($1, $2, $3, $4, $4)",
    )
    .bind(user_id)
    .bind(full_name)
    .bind(phone)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role.as_str())
        .execute(&mut **tx)
        .await?;

    Ok(user_id)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> ServiceResult<String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ServiceError::invalid("email", "Email is required"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ServiceError::invalid("email", "Invalid email format"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_and_checked() {
        assert_eq!(validate_email("  Admin@Depot.UZ ").unwrap(), "admin@depot.uz");
        assert!(validate_email("no-at-sign.uz").is_err());
        assert!(validate_email("a@b@c.uz").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("").is_err());
    }
}
