// src/services/movement_ledger.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{within_deadline, TxOptions},
        error::AppError,
    },
    db::{InventoryStore, InventoryTx},
    models::movement::{
        CreateMovementPayload, Movement, MovementCommand, MovementHeader, NewMovement,
        StockChange, Transfer, ValidatedMovement,
    },
    services::{
        movement_validator::{validate_movement, MovementLimits},
        unit_registry::UnitRegistry,
    },
};

/// O livro-razão: único lugar que escreve saldo de produto e estado de unidades.
#[derive(Clone)]
pub struct MovementLedger<S: InventoryStore> {
    store: S,
    registry: UnitRegistry,
    tx_options: TxOptions,
    limits: MovementLimits,
}

// Resultado do passo 3 (ramo por classificação), antes de gravar o razão.
struct AppliedChange {
    quantity: i32,
    unit_ids: Vec<Uuid>,
    // None = transferência, o saldo não muda.
    new_quantity: Option<i32>,
    unit_cost: Option<Decimal>,
    list_price: Option<Decimal>,
    // Só a entrada atualiza custo e preço de lista do produto.
    reprices_product: bool,
}

impl<S: InventoryStore> MovementLedger<S> {
    pub fn new(store: S, registry: UnitRegistry, tx_options: TxOptions) -> Self {
        Self { store, registry, tx_options, limits: MovementLimits::default() }
    }

    pub fn with_limits(mut self, limits: MovementLimits) -> Self {
        self.limits = limits;
        self
    }

    // --- CREATE MOVEMENT ---
    /// Ponto de entrada único: valida, e só então abre a transação que
    /// aplica unidades + razão + saldo de uma vez.
    #[tracing::instrument(skip(self, payload), fields(movement_type = ?payload.movement_type_id))]
    pub async fn create_movement(
        &self,
        payload: CreateMovementPayload,
        created_by: Option<Uuid>,
    ) -> Result<Movement, AppError> {
        // As consultas de validação também respeitam o limite de espera.
        let validated = tokio::time::timeout(self.tx_options.acquire_timeout, self.validate(&payload))
            .await
            .map_err(|_| {
                tracing::warn!("⏱️ Validação abortada após {:?}", self.tx_options.acquire_timeout);
                AppError::TransactionTimeout
            })??;

        let mut tx = self.store.begin(self.tx_options).await?;
        let movement = within_deadline(self.tx_options, self.apply(&mut tx, validated, created_by)).await?;
        tx.commit().await?;

        tracing::info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            quantity = movement.quantity,
            "✅ Movimentação registrada"
        );
        Ok(movement)
    }

    /// Histórico do produto, mais recente primeiro.
    pub async fn movement_history(&self, product_id: Uuid) -> Result<Vec<Movement>, AppError> {
        let mut tx = self.store.begin(self.tx_options).await?;
        if tx.find_product(product_id).await?.is_none() {
            return Err(AppError::ProductNotFound(product_id));
        }
        let movements = tx.product_movements(product_id).await?;
        tx.commit().await?;
        Ok(movements)
    }

    // Erros daqui nunca abrem transação.
    async fn validate(&self, payload: &CreateMovementPayload) -> Result<ValidatedMovement, AppError> {
        let type_id = payload.movement_type_id.ok_or(AppError::InvalidMovementType)?;
        let movement_type = self
            .store
            .movement_type(type_id)
            .await?
            .ok_or(AppError::InvalidMovementType)?;

        let validated = validate_movement(payload, &movement_type, &self.limits)?;

        if let Some(warehouse_id) = validated.header.warehouse_id {
            if !self.store.warehouse_exists(warehouse_id).await? {
                return Err(AppError::WarehouseNotFound(warehouse_id));
            }
        }
        if let Some(supplier_id) = validated.header.supplier_id {
            if !self.store.supplier_exists(supplier_id).await? {
                return Err(AppError::SupplierNotFound(supplier_id));
            }
        }
        Ok(validated)
    }

    async fn apply(
        &self,
        tx: &mut S::Tx,
        movement: ValidatedMovement,
        created_by: Option<Uuid>,
    ) -> Result<Movement, AppError> {
        let ValidatedMovement { header, command } = movement;

        // 1. Transferência sem produto: o dono da primeira unidade decide.
        let product_id = match &command {
            MovementCommand::Incoming(change) | MovementCommand::Outgoing(change) => change.product_id,
            MovementCommand::Lateral(transfer) => match transfer.product_id {
                Some(id) => id,
                None => {
                    let first = transfer
                        .unit_codes
                        .first()
                        .ok_or(AppError::MissingUnitIdentifiers)?;
                    self.registry.resolve_product_by_unit_code(tx, first).await?
                }
            },
        };

        // 2. Trava a linha do produto até o commit.
        let product = tx
            .lock_product(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        // 3. Ramo por classificação.
        let applied = match command {
            MovementCommand::Incoming(change) => {
                self.apply_incoming(tx, product.id, &product.name, product.quantity, &header, change)
                    .await?
            }
            MovementCommand::Outgoing(change) => {
                self.apply_outgoing(tx, product.id, product.quantity, change).await?
            }
            MovementCommand::Lateral(transfer) => self.apply_lateral(tx, product.id, transfer).await?,
        };

        // 4. Grava o razão e liga as unidades tocadas.
        let movement = tx
            .insert_movement(&NewMovement {
                product_id: product.id,
                movement_type_id: header.movement_type_id,
                quantity: applied.quantity,
                unit_cost: applied.unit_cost,
                list_price: applied.list_price,
                warehouse_id: header.warehouse_id,
                supplier_id: header.supplier_id,
                created_by,
                comment: header.comment,
            })
            .await?;
        tx.link_movement_units(movement.id, &applied.unit_ids).await?;

        // 5. Saldo agregado (transferência não altera).
        if let Some(new_quantity) = applied.new_quantity {
            let (cost, list_price) = if applied.reprices_product {
                (applied.unit_cost, applied.list_price)
            } else {
                (None, None)
            };
            tx.update_product_stock(product.id, new_quantity, cost, list_price)
                .await?;
        }

        Ok(movement)
    }

    async fn apply_incoming(
        &self,
        tx: &mut S::Tx,
        product_id: Uuid,
        product_name: &str,
        current: i32,
        header: &MovementHeader,
        change: StockChange,
    ) -> Result<AppliedChange, AppError> {
        let unit_ids = self
            .registry
            .create_units(
                tx,
                product_id,
                change.quantity as usize,
                &change.unit_codes,
                product_name,
                header.warehouse_id,
            )
            .await?;

        let new_quantity = current
            .checked_add(change.quantity)
            .ok_or(AppError::QuantityOverflow)?;

        Ok(AppliedChange {
            quantity: change.quantity,
            unit_ids,
            new_quantity: Some(new_quantity),
            unit_cost: Some(change.unit_cost),
            list_price: change.list_price,
            reprices_product: true,
        })
    }

    async fn apply_outgoing(
        &self,
        tx: &mut S::Tx,
        product_id: Uuid,
        current: i32,
        change: StockChange,
    ) -> Result<AppliedChange, AppError> {
        // Explícitas primeiro (tudo ou nada); o restante sai das mais antigas.
        let mut unit_ids = if change.unit_codes.is_empty() {
            Vec::new()
        } else {
            self.registry
                .retire_units(tx, product_id, &change.unit_codes)
                .await?
        };
        let remaining = (change.quantity as usize).saturating_sub(unit_ids.len());
        let oldest = self
            .registry
            .retire_oldest(tx, product_id, &unit_ids, remaining)
            .await?;
        unit_ids.extend(oldest);

        let new_quantity = current - change.quantity;
        if new_quantity < 0 {
            tracing::warn!(%product_id, current, requested = change.quantity, "Saída recusada");
            return Err(AppError::NegativeResultingQuantity {
                current,
                requested: change.quantity,
            });
        }

        Ok(AppliedChange {
            quantity: change.quantity,
            unit_ids,
            new_quantity: Some(new_quantity),
            unit_cost: Some(change.unit_cost),
            list_price: None,
            reprices_product: false,
        })
    }

    async fn apply_lateral(
        &self,
        tx: &mut S::Tx,
        product_id: Uuid,
        transfer: Transfer,
    ) -> Result<AppliedChange, AppError> {
        let unit_ids = self
            .registry
            .relocate_units(tx, product_id, &transfer.unit_codes, transfer.warehouse_id)
            .await?;

        Ok(AppliedChange {
            quantity: transfer.quantity,
            unit_ids,
            new_quantity: None,
            unit_cost: transfer.unit_cost,
            list_price: None,
            reprices_product: false,
        })
    }
}
