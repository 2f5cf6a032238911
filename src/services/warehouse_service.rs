use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{optional, required, ServiceError, ServiceResult};
use crate::database::models::Warehouse;
use crate::types::Scope;

const WAREHOUSE_COLUMNS: &str = "id, admin_id, name, address, description, is_active, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub struct WarehouseService {
    pool: SqlitePool,
}

impl WarehouseService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: Scope) -> ServiceResult<Vec<Warehouse>> {
        let rows = match scope.admin_id() {
            Some(admin_id) => {
                let query = format!(
                    "SELECT {} FROM warehouses WHERE admin_id = $1 ORDER BY created_at DESC",
                    WAREHOUSE_COLUMNS
                );
                sqlx::query_as::<_, Warehouse>(&query)
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {} FROM warehouses ORDER BY created_at DESC", WAREHOUSE_COLUMNS);
                sqlx::query_as::<_, Warehouse>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Rows outside the caller's scope read as missing
    pub async fn get(&self, scope: Scope, id: Uuid) -> ServiceResult<Warehouse> {
        let query = format!("SELECT {} FROM warehouses WHERE id = $1", WAREHOUSE_COLUMNS);
        let warehouse = sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match warehouse {
            Some(w) if scope.includes(w.admin_id) => Ok(w),
            _ => Err(ServiceError::NotFound(format!("Warehouse {}", id))),
        }
    }

    pub async fn create(&self, admin_id: Uuid, request: WarehouseRequest) -> ServiceResult<Warehouse> {
        let name = required("name", &request.name)?;
        let now = Utc::now();

        let query = format!(
            r#"
            INSERT INTO warehouses (id, admin_id, name, address, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );

        let warehouse = sqlx::query_as::<_, Warehouse>(&query)
            .bind(Uuid::new_v4())
            .bind(admin_id)
            .bind(name)
            .bind(optional(request.address))
            .bind(optional(request.description))
            .bind(request.is_active.unwrap_or(true))
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Warehouse {} created by admin {}", warehouse.id, admin_id);
        Ok(warehouse)
    }

    pub async fn update(&self, admin_id: Uuid, id: Uuid, request: WarehouseRequest) -> ServiceResult<Warehouse> {
        let name = required("name", &request.name)?;
        let current = self.get(Scope::Admin(admin_id), id).await?;

        let query = format!(
            r#"
            UPDATE warehouses
            SET name = $1, address = $2, description = $3, is_active = $4, updated_at = $5
            WHERE id = $6 AND admin_id = $7
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );

        let warehouse = sqlx::query_as::<_, Warehouse>(&query)
            .bind(name)
            .bind(optional(request.address))
            .bind(optional(request.description))
            .bind(request.is_active.unwrap_or(current.is_active))
            .bind(Utc::now())
            .bind(id)
            .bind(admin_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Warehouse {} updated", id);
        Ok(warehouse)
    }

    /// Refused while tenants still reference the warehouse
    pub async fn delete(&self, admin_id: Uuid, id: Uuid) -> ServiceResult<()> {
        self.get(Scope::Admin(admin_id), id).await?;

        let mut tx = self.pool.begin().await?;

        let (tenants,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE warehouse_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if tenants > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse still has {} tenant(s); move or delete them first",
                tenants
            )));
        }

        sqlx::query("DELETE FROM warehouses WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Warehouse {} deleted", id);
        Ok(())
    }
}
