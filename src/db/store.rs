// src/db/store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{db_utils::TxOptions, error::AppError},
    models::{
        catalog::MovementType,
        movement::{Movement, NewMovement},
        product::{NamingAttributes, NewProduct, Product, UnitLocation},
        unit::{NewUnit, Unit},
    },
};

/// Consultas de identidade (somente leitura) usadas antes de abrir a transação.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn movement_type(&self, id: Uuid) -> Result<Option<MovementType>, AppError>;
    async fn warehouse_exists(&self, id: Uuid) -> Result<bool, AppError>;
    async fn supplier_exists(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Ponto de entrada da persistência: abre transações com limites explícitos.
#[async_trait]
pub trait InventoryStore: IdentityResolver + Clone + Send + Sync + 'static {
    type Tx: InventoryTx;

    async fn begin(&self, options: TxOptions) -> Result<Self::Tx, AppError>;
}

/// Uma transação aberta. Descartar sem `commit` desfaz tudo.
#[async_trait]
pub trait InventoryTx: Send {
    // --- Produtos ---

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Lê o produto travando a linha até o fim da transação.
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn naming_attributes(&mut self, product_id: Uuid)
        -> Result<Option<NamingAttributes>, AppError>;

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, AppError>;

    async fn rename_product(&mut self, id: Uuid, name: &str) -> Result<(), AppError>;

    /// Grava o novo saldo; custo e preço só mudam quando informados.
    async fn update_product_stock(
        &mut self,
        id: Uuid,
        quantity: i32,
        cost: Option<Decimal>,
        list_price: Option<Decimal>,
    ) -> Result<(), AppError>;

    // --- Unidades ---

    async fn insert_unit(&mut self, new: &NewUnit) -> Result<Unit, AppError>;

    async fn find_active_unit_by_code(&mut self, code: &str) -> Result<Option<Unit>, AppError>;

    async fn find_active_units(
        &mut self,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Unit>, AppError>;

    /// Unidades ativas mais antigas primeiro, ignorando `exclude`.
    async fn oldest_active_units(
        &mut self,
        product_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Unit>, AppError>;

    async fn deactivate_units(&mut self, ids: &[Uuid]) -> Result<u64, AppError>;

    async fn relocate_units(&mut self, ids: &[Uuid], warehouse_id: Uuid) -> Result<u64, AppError>;

    async fn active_units(&mut self, product_id: Uuid) -> Result<Vec<Unit>, AppError>;

    async fn unit_locations(&mut self, product_id: Uuid) -> Result<Vec<UnitLocation>, AppError>;

    // --- Movimentações ---

    async fn insert_movement(&mut self, new: &NewMovement) -> Result<Movement, AppError>;

    async fn link_movement_units(
        &mut self,
        movement_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<(), AppError>;

    async fn product_movements(&mut self, product_id: Uuid) -> Result<Vec<Movement>, AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
