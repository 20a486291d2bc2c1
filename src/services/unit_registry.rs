// src/services/unit_registry.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryTx,
    models::unit::NewUnit,
};

/// Dono do ciclo de vida das unidades serializadas (IMEI / série).
/// Toda operação roda dentro da transação recebida.
#[derive(Clone)]
pub struct UnitRegistry {
    code_prefix: String,
}

impl UnitRegistry {
    pub fn new(code_prefix: impl Into<String>) -> Self {
        Self { code_prefix: code_prefix.into() }
    }

    /// Identificador para unidades recebidas sem código: prefixo + token único.
    pub fn synthetic_code(&self) -> String {
        format!("{}{}", self.code_prefix, Uuid::new_v4().simple().to_string().to_uppercase())
    }

    /// Cria exatamente `count` unidades: primeiro as explícitas, o resto com código sintético.
    pub async fn create_units<T: InventoryTx>(
        &self,
        tx: &mut T,
        product_id: Uuid,
        count: usize,
        explicit_codes: &[String],
        name_snapshot: &str,
        warehouse_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppError> {
        if explicit_codes.len() > count {
            return Err(AppError::TooManyUnitIdentifiers {
                supplied: explicit_codes.len(),
                quantity: i32::try_from(count).unwrap_or(i32::MAX),
            });
        }

        // Códigos sintéticos são gerados um a um, conforme as inserções avançam.
        let synthetic = (explicit_codes.len()..count).map(|_| self.synthetic_code());

        let mut created = Vec::new();
        for code in explicit_codes.iter().cloned().chain(synthetic) {
            let unit = tx
                .insert_unit(&NewUnit {
                    product_id,
                    code,
                    name: name_snapshot.to_string(),
                    warehouse_id,
                })
                .await?;
            created.push(unit.id);
        }
        Ok(created)
    }

    /// Baixa as unidades pelos identificadores. Tudo ou nada:
    /// se faltar qualquer uma, nenhuma é baixada.
    pub async fn retire_units<T: InventoryTx>(
        &self,
        tx: &mut T,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Uuid>, AppError> {
        let ids = self.resolve_active(tx, product_id, codes).await?;
        tx.deactivate_units(&ids).await?;
        Ok(ids)
    }

    /// Baixa até `count` unidades ativas, das mais antigas para as mais novas.
    pub async fn retire_oldest<T: InventoryTx>(
        &self,
        tx: &mut T,
        product_id: Uuid,
        exclude: &[Uuid],
        count: usize,
    ) -> Result<Vec<Uuid>, AppError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let ids: Vec<Uuid> = tx
            .oldest_active_units(product_id, exclude, limit)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        tx.deactivate_units(&ids).await?;
        Ok(ids)
    }

    /// Transferência: move as unidades para o depósito de destino (tudo ou nada).
    pub async fn relocate_units<T: InventoryTx>(
        &self,
        tx: &mut T,
        product_id: Uuid,
        codes: &[String],
        warehouse_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let ids = self.resolve_active(tx, product_id, codes).await?;
        tx.relocate_units(&ids, warehouse_id).await?;
        Ok(ids)
    }

    /// Descobre o produto dono de uma unidade ativa.
    pub async fn resolve_product_by_unit_code<T: InventoryTx>(
        &self,
        tx: &mut T,
        code: &str,
    ) -> Result<Uuid, AppError> {
        tx.find_active_unit_by_code(code)
            .await?
            .map(|unit| unit.product_id)
            .ok_or_else(|| AppError::UnitNotFound(code.to_string()))
    }

    async fn resolve_active<T: InventoryTx>(
        &self,
        tx: &mut T,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Uuid>, AppError> {
        let found = tx.find_active_units(product_id, codes).await?;
        if found.len() != codes.len() {
            let missing: Vec<String> = codes
                .iter()
                .filter(|code| !found.iter().any(|u| &u.code == *code))
                .cloned()
                .collect();
            tracing::warn!(%product_id, ?missing, "Unidades ativas não encontradas");
            return Err(AppError::UnitsNotFound { missing });
        }
        Ok(found.into_iter().map(|u| u.id).collect())
    }
}
