// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Cadastro de tipos de movimentação.
// As duas flags vêm do banco; fora daqui só se usa `MovementClass`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementType {
    pub id: Uuid,
    #[schema(example = "Compra de fornecedor")]
    pub name: String,
    pub is_incoming: bool,
    pub is_outgoing: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementClass {
    Incoming,
    Outgoing,
    Lateral,
}

impl MovementType {
    /// Deriva a classificação uma única vez, na borda.
    /// Nenhuma flag ligada = transferência entre depósitos.
    pub fn classify(&self) -> MovementClass {
        if self.is_incoming {
            MovementClass::Incoming
        } else if self.is_outgoing {
            MovementClass::Outgoing
        } else {
            MovementClass::Lateral
        }
    }
}
