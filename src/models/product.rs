// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Produto ---
// `quantity` é o saldo agregado; só o razão de movimentações escreve nele.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Samsung Galaxy S24 256GB 8GB Preto")]
    pub name: String,
    #[schema(example = 12)]
    pub quantity: i32,
    #[schema(example = "3500.00")]
    pub cost: Option<Decimal>,
    #[schema(example = "4999.90")]
    pub list_price: Option<Decimal>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub storage_id: Option<Uuid>,
    pub memory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Atributos compartilhados por todas as variantes de um lote.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,
    pub cost: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub attributes: ProductAttributes,
    pub storage_id: Option<Uuid>,
    pub memory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
}

// Relações já resolvidas (nomes, capacidades), usadas só para compor o nome.
// O modelo ainda carrega armazenamento/cor em texto livre (cadastro antigo).
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct NamingAttributes {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub model_storage: Option<String>,
    pub model_color: Option<String>,
    pub storage_gb: Option<i32>,
    pub memory_gb: Option<i32>,
    pub color: Option<String>,
    pub description: Option<String>,
}

// Projeção para relatórios: onde estão as unidades ativas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitLocation {
    pub warehouse_id: Option<Uuid>,
    #[schema(example = 7)]
    pub active_unit_count: i64,
}
