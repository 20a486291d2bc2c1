// src/db/pg_store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_bounded, TxOptions},
        error::AppError,
    },
    db::{
        store::{IdentityResolver, InventoryStore, InventoryTx},
        CatalogRepository, MovementRepository, ProductRepository, UnitRepository,
    },
    models::{
        catalog::MovementType,
        movement::{Movement, NewMovement},
        product::{NamingAttributes, NewProduct, Product, UnitLocation},
        unit::{NewUnit, Unit},
    },
};

// Implementação Postgres: os repositórios de sempre, rodando na mesma transação.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
    catalog: CatalogRepository,
    products: ProductRepository,
    units: UnitRepository,
    movements: MovementRepository,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            catalog: CatalogRepository::new(),
            products: ProductRepository::new(),
            units: UnitRepository::new(),
            movements: MovementRepository::new(),
        }
    }
}

#[async_trait]
impl IdentityResolver for PgInventoryStore {
    async fn movement_type(&self, id: Uuid) -> Result<Option<MovementType>, AppError> {
        self.catalog.find_movement_type(&self.pool, id).await
    }

    async fn warehouse_exists(&self, id: Uuid) -> Result<bool, AppError> {
        self.catalog.warehouse_exists(&self.pool, id).await
    }

    async fn supplier_exists(&self, id: Uuid) -> Result<bool, AppError> {
        self.catalog.supplier_exists(&self.pool, id).await
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    type Tx = PgInventoryTx;

    async fn begin(&self, options: TxOptions) -> Result<Self::Tx, AppError> {
        let tx = begin_bounded(&self.pool, options).await?;
        Ok(PgInventoryTx {
            tx,
            catalog: self.catalog.clone(),
            products: self.products.clone(),
            units: self.units.clone(),
            movements: self.movements.clone(),
        })
    }
}

pub struct PgInventoryTx {
    tx: Transaction<'static, Postgres>,
    catalog: CatalogRepository,
    products: ProductRepository,
    units: UnitRepository,
    movements: MovementRepository,
}

#[async_trait]
impl InventoryTx for PgInventoryTx {
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.products.find_by_id(&mut *self.tx, id).await
    }

    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.products.find_for_update(&mut *self.tx, id).await
    }

    async fn naming_attributes(
        &mut self,
        product_id: Uuid,
    ) -> Result<Option<NamingAttributes>, AppError> {
        self.catalog.naming_attributes(&mut *self.tx, product_id).await
    }

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, AppError> {
        self.products.create(&mut *self.tx, new).await
    }

    async fn rename_product(&mut self, id: Uuid, name: &str) -> Result<(), AppError> {
        self.products.rename(&mut *self.tx, id, name).await
    }

    async fn update_product_stock(
        &mut self,
        id: Uuid,
        quantity: i32,
        cost: Option<Decimal>,
        list_price: Option<Decimal>,
    ) -> Result<(), AppError> {
        self.products
            .update_stock(&mut *self.tx, id, quantity, cost, list_price)
            .await
    }

    async fn insert_unit(&mut self, new: &NewUnit) -> Result<Unit, AppError> {
        self.units.create(&mut *self.tx, new).await
    }

    async fn find_active_unit_by_code(&mut self, code: &str) -> Result<Option<Unit>, AppError> {
        self.units.find_active_by_code(&mut *self.tx, code).await
    }

    async fn find_active_units(
        &mut self,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Unit>, AppError> {
        self.units
            .find_active_by_codes(&mut *self.tx, product_id, codes)
            .await
    }

    async fn oldest_active_units(
        &mut self,
        product_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Unit>, AppError> {
        self.units
            .find_oldest_active(&mut *self.tx, product_id, exclude, limit)
            .await
    }

    async fn deactivate_units(&mut self, ids: &[Uuid]) -> Result<u64, AppError> {
        self.units.deactivate(&mut *self.tx, ids).await
    }

    async fn relocate_units(&mut self, ids: &[Uuid], warehouse_id: Uuid) -> Result<u64, AppError> {
        self.units.relocate(&mut *self.tx, ids, warehouse_id).await
    }

    async fn active_units(&mut self, product_id: Uuid) -> Result<Vec<Unit>, AppError> {
        self.units.list_active(&mut *self.tx, product_id).await
    }

    async fn unit_locations(&mut self, product_id: Uuid) -> Result<Vec<UnitLocation>, AppError> {
        self.units.locations(&mut *self.tx, product_id).await
    }

    async fn insert_movement(&mut self, new: &NewMovement) -> Result<Movement, AppError> {
        self.movements.create(&mut *self.tx, new).await
    }

    async fn link_movement_units(
        &mut self,
        movement_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<(), AppError> {
        self.movements
            .link_units(&mut *self.tx, movement_id, unit_ids)
            .await
    }

    async fn product_movements(&mut self, product_id: Uuid) -> Result<Vec<Movement>, AppError> {
        self.movements.list_for_product(&mut *self.tx, product_id).await
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
