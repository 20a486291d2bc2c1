// src/models/unit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Unidade serializada (IMEI / número de série) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "356938035643809")]
    pub code: String,
    // Cópia do nome do produto no momento da entrada, não é sincronizada.
    pub name: String,
    pub active: bool,
    pub current_warehouse_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUnit {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub warehouse_id: Option<Uuid>,
}
