// src/models/movement.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Movimentação (livro-razão, só inserção) ---
// A quantidade é sempre positiva; o sentido vem do tipo de movimentação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type_id: Uuid,
    #[schema(example = 10)]
    pub quantity: i32,
    #[schema(example = "3500.00")]
    pub unit_cost: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub comment: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub movement_type_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub comment: Option<String>,
}

// ---
// Payload cru vindo do formulário.
// Números chegam como texto ("10", "12.50"); quem interpreta é o validador.
// ---
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub product_id: Option<Uuid>,
    pub movement_type_id: Option<Uuid>,
    #[schema(example = "10")]
    pub quantity: Option<String>,
    #[schema(example = "3500.00")]
    pub unit_cost: Option<String>,
    #[serde(default)]
    #[schema(example = json!(["356938035643809", "356938035643810"]))]
    pub unit_codes: Vec<String>,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    #[schema(example = "4999.90")]
    pub list_price: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementCreated {
    pub movement_id: Uuid,
}

// ---
// Comando normalizado, já classificado, pronto para o razão.
// ---
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMovement {
    pub header: MovementHeader,
    pub command: MovementCommand,
}

// Campos comuns a qualquer classificação.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementHeader {
    pub movement_type_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MovementCommand {
    Incoming(StockChange),
    Outgoing(StockChange),
    Lateral(Transfer),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub list_price: Option<Decimal>,
    pub unit_codes: Vec<String>,
}

// Transferência: sem produto explícito ele é resolvido pela primeira unidade.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
    pub unit_codes: Vec<String>,
    pub warehouse_id: Uuid,
}
