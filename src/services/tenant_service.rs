use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{required, ServiceError, ServiceResult};
use crate::database::models::{Tenant, TenantListing};
use crate::ledger;
use crate::types::Scope;

const TENANT_COLUMNS: &str =
    "id, admin_id, warehouse_id, full_name, phone, product_type, monthly_rent, is_active, created_at, updated_at";

const LISTING_SELECT: &str = r#"
    SELECT t.id, t.admin_id, t.warehouse_id, t.full_name, t.phone, t.product_type,
           t.monthly_rent, t.is_active, t.created_at, t.updated_at,
           w.name AS warehouse_name, p.full_name AS admin_name
    FROM tenants t
    LEFT JOIN warehouses w ON w.id = t.warehouse_id
    LEFT JOIN profiles p ON p.user_id = t.admin_id
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct TenantRequest {
    pub warehouse_id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub product_type: String,
    pub monthly_rent: i64,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub struct TenantService {
    pool: SqlitePool,
}

impl TenantService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tenants with their warehouse and admin names, newest first
    pub async fn list(&self, scope: Scope) -> ServiceResult<Vec<TenantListing>> {
        let rows = match scope.admin_id() {
            Some(admin_id) => {
                let query = format!("{} WHERE t.admin_id = $1 ORDER BY t.created_at DESC", LISTING_SELECT);
                sqlx::query_as::<_, TenantListing>(&query)
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} ORDER BY t.created_at DESC", LISTING_SELECT);
                sqlx::query_as::<_, TenantListing>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn get(&self, scope: Scope, id: Uuid) -> ServiceResult<TenantListing> {
        let query = format!("{} WHERE t.id = $1", LISTING_SELECT);
        let tenant = sqlx::query_as::<_, TenantListing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match tenant {
            Some(t) if scope.includes(t.tenant.admin_id) => Ok(t),
            _ => Err(ServiceError::NotFound(format!("Tenant {}", id))),
        }
    }

    pub async fn create(&self, admin_id: Uuid, request: TenantRequest) -> ServiceResult<Tenant> {
        let full_name = required("full_name", &request.full_name)?;
        validate_rent(request.monthly_rent)?;
        self.require_own_warehouse(admin_id, request.warehouse_id).await?;

        let query = format!(
            r#"
            INSERT INTO tenants (id, admin_id, warehouse_id, full_name, phone, product_type,
                                 monthly_rent, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            TENANT_COLUMNS
        );

        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(Uuid::new_v4())
            .bind(admin_id)
            .bind(request.warehouse_id)
            .bind(full_name)
            .bind(request.phone.trim())
            .bind(request.product_type.trim())
            .bind(request.monthly_rent)
            .bind(request.is_active.unwrap_or(true))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Tenant {} created in warehouse {}", tenant.id, tenant.warehouse_id);
        Ok(tenant)
    }

    pub async fn update(&self, admin_id: Uuid, id: Uuid, request: TenantRequest) -> ServiceResult<Tenant> {
        let full_name = required("full_name", &request.full_name)?;
        validate_rent(request.monthly_rent)?;
        let current = self.get(Scope::Admin(admin_id), id).await?;
        self.require_own_warehouse(admin_id, request.warehouse_id).await?;

        let query = format!(
            r#"
            UPDATE tenants
            SET warehouse_id = $1, full_name = $2, phone = $3, product_type = $4,
                monthly_rent = $5, is_active = $6, updated_at = $7
            WHERE id = $8 AND admin_id = $9
            RETURNING {}
            "#,
            TENANT_COLUMNS
        );

        // Existing payment rows keep their expected amounts; rent changes apply to new rows only
        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(request.warehouse_id)
            .bind(full_name)
            .bind(request.phone.trim())
            .bind(request.product_type.trim())
            .bind(request.monthly_rent)
            .bind(request.is_active.unwrap_or(current.tenant.is_active))
            .bind(Utc::now())
            .bind(id)
            .bind(admin_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Tenant {} updated", id);
        Ok(tenant)
    }

    /// Deleting a tenant removes its payment history with it
    pub async fn delete(&self, admin_id: Uuid, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Tenant {}", id)));
        }

        tracing::info!("Tenant {} deleted", id);
        Ok(())
    }

    async fn require_own_warehouse(&self, admin_id: Uuid, warehouse_id: Uuid) -> ServiceResult<()> {
        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT admin_id FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            Some((owner,)) if owner == admin_id => Ok(()),
            _ => Err(ServiceError::invalid("warehouse_id", "Warehouse not found")),
        }
    }
}

fn validate_rent(monthly_rent: i64) -> ServiceResult<()> {
    ledger::check_amount(monthly_rent)
        .map(|_| ())
        .map_err(|e| ServiceError::invalid("monthly_rent", e.to_string()))
}
