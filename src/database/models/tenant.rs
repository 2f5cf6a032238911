use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A renter occupying space in one of an admin's warehouses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub warehouse_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub product_type: String,
    pub monthly_rent: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant with the names the tables and exports display next to it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub tenant: Tenant,
    pub warehouse_name: Option<String>,
    pub admin_name: Option<String>,
}
