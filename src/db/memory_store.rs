// src/db/memory_store.rs
//
// Store em memória para os testes do razão. Cada transação segura o mutex
// inteiro e trabalha numa cópia; o commit troca a cópia pelo estado real.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::{db_utils::TxOptions, error::AppError},
    db::store::{IdentityResolver, InventoryStore, InventoryTx},
    models::{
        catalog::MovementType,
        movement::{Movement, NewMovement},
        product::{NamingAttributes, NewProduct, Product, UnitLocation},
        unit::{NewUnit, Unit},
    },
    services::naming::DEFAULT_PRODUCT_NAME,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub movement_types: HashMap<Uuid, MovementType>,
    pub warehouses: HashSet<Uuid>,
    pub suppliers: HashSet<Uuid>,
    pub brands: HashMap<Uuid, String>,
    pub models: HashMap<Uuid, (String, Option<String>, Option<String>)>,
    pub storage_options: HashMap<Uuid, i32>,
    pub memory_options: HashMap<Uuid, i32>,
    pub colors: HashMap<Uuid, String>,
    pub products: HashMap<Uuid, Product>,
    pub units: Vec<Unit>,
    pub movements: Vec<Movement>,
    pub movement_units: Vec<(Uuid, Uuid)>,
}

impl MemoryState {
    pub fn active_unit_count(&self, product_id: Uuid) -> usize {
        self.units
            .iter()
            .filter(|u| u.product_id == product_id && u.active)
            .count()
    }

    pub fn quantity(&self, product_id: Uuid) -> i32 {
        self.products.get(&product_id).map(|p| p.quantity).unwrap_or_default()
    }

    pub fn unit(&self, code: &str) -> Option<&Unit> {
        self.units.iter().rev().find(|u| u.code == code)
    }
}

/// Falhas simuladas para testar atomicidade e limites.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub fail_movement_insert: bool,
    /// Falha na N-ésima inserção de produto (base 0) da transação.
    pub fail_product_insert_at: Option<usize>,
    pub stall_movement_insert: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<StdMutex<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn add_movement_type(&self, is_incoming: bool, is_outgoing: bool) -> Uuid {
        let id = Uuid::new_v4();
        let movement_type = MovementType {
            id,
            name: format!("tipo {id}"),
            is_incoming,
            is_outgoing,
            active: true,
        };
        self.state.lock().await.movement_types.insert(id, movement_type);
        id
    }

    pub async fn add_warehouse(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.warehouses.insert(id);
        id
    }

    pub async fn add_supplier(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.suppliers.insert(id);
        id
    }

    pub async fn add_brand(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.brands.insert(id, name.into());
        id
    }

    pub async fn add_model(
        &self,
        name: &str,
        storage_text: Option<&str>,
        color_text: Option<&str>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.models.insert(
            id,
            (name.into(), storage_text.map(Into::into), color_text.map(Into::into)),
        );
        id
    }

    pub async fn add_storage(&self, capacity_gb: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.storage_options.insert(id, capacity_gb);
        id
    }

    pub async fn add_memory(&self, capacity_gb: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.memory_options.insert(id, capacity_gb);
        id
    }

    pub async fn add_color(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.colors.insert(id, name.into());
        id
    }

    pub async fn add_product(&self, name: &str, quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let product = Product {
            id,
            name: name.into(),
            quantity,
            cost: None,
            list_price: None,
            brand_id: None,
            model_id: None,
            storage_id: None,
            memory_id: None,
            color_id: None,
            product_type_id: None,
            description: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.products.insert(id, product);
        id
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn movement_type(&self, id: Uuid) -> Result<Option<MovementType>, AppError> {
        let state = self.state.lock().await;
        Ok(state.movement_types.get(&id).filter(|t| t.active).cloned())
    }

    async fn warehouse_exists(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.lock().await.warehouses.contains(&id))
    }

    async fn supplier_exists(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.lock().await.suppliers.contains(&id))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self, options: TxOptions) -> Result<Self::Tx, AppError> {
        let guard = tokio::time::timeout(options.acquire_timeout, self.state.clone().lock_owned())
            .await
            .map_err(|_| AppError::TransactionTimeout)?;
        let work = guard.clone();
        let faults = *self.faults.lock().unwrap();
        Ok(MemoryTx { guard, work, faults, products_inserted: 0 })
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
    faults: Faults,
    products_inserted: usize,
}

#[async_trait]
impl InventoryTx for MemoryTx {
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn naming_attributes(
        &mut self,
        product_id: Uuid,
    ) -> Result<Option<NamingAttributes>, AppError> {
        let Some(product) = self.work.products.get(&product_id) else {
            return Ok(None);
        };
        let model = product.model_id.and_then(|id| self.work.models.get(&id));
        Ok(Some(NamingAttributes {
            brand: product.brand_id.and_then(|id| self.work.brands.get(&id)).cloned(),
            model: model.map(|m| m.0.clone()),
            model_storage: model.and_then(|m| m.1.clone()),
            model_color: model.and_then(|m| m.2.clone()),
            storage_gb: product.storage_id.and_then(|id| self.work.storage_options.get(&id)).copied(),
            memory_gb: product.memory_id.and_then(|id| self.work.memory_options.get(&id)).copied(),
            color: product.color_id.and_then(|id| self.work.colors.get(&id)).cloned(),
            description: product.description.clone(),
        }))
    }

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, AppError> {
        if self.faults.fail_product_insert_at == Some(self.products_inserted) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada")));
        }
        self.products_inserted += 1;

        let now = Utc::now();
        let attrs = &new.attributes;
        let product = Product {
            id: Uuid::new_v4(),
            name: DEFAULT_PRODUCT_NAME.into(),
            quantity: 0,
            cost: attrs.cost,
            list_price: attrs.list_price,
            brand_id: attrs.brand_id,
            model_id: attrs.model_id,
            storage_id: new.storage_id,
            memory_id: new.memory_id,
            color_id: new.color_id,
            product_type_id: attrs.product_type_id,
            description: attrs.description.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.work.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn rename_product(&mut self, id: Uuid, name: &str) -> Result<(), AppError> {
        if let Some(product) = self.work.products.get_mut(&id) {
            product.name = name.into();
        }
        Ok(())
    }

    async fn update_product_stock(
        &mut self,
        id: Uuid,
        quantity: i32,
        cost: Option<Decimal>,
        list_price: Option<Decimal>,
    ) -> Result<(), AppError> {
        if let Some(product) = self.work.products.get_mut(&id) {
            product.quantity = quantity;
            product.cost = cost.or(product.cost);
            product.list_price = list_price.or(product.list_price);
            product.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_unit(&mut self, new: &NewUnit) -> Result<Unit, AppError> {
        if self.work.units.iter().any(|u| u.active && u.code == new.code) {
            return Err(AppError::UnitIdentifierInUse(new.code.clone()));
        }
        let now = Utc::now();
        let unit = Unit {
            id: Uuid::new_v4(),
            product_id: new.product_id,
            code: new.code.clone(),
            name: new.name.clone(),
            active: true,
            current_warehouse_id: new.warehouse_id,
            created_at: now,
            updated_at: now,
        };
        self.work.units.push(unit.clone());
        Ok(unit)
    }

    async fn find_active_unit_by_code(&mut self, code: &str) -> Result<Option<Unit>, AppError> {
        Ok(self.work.units.iter().find(|u| u.active && u.code == code).cloned())
    }

    async fn find_active_units(
        &mut self,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Unit>, AppError> {
        Ok(self
            .work
            .units
            .iter()
            .filter(|u| u.active && u.product_id == product_id && codes.contains(&u.code))
            .cloned()
            .collect())
    }

    async fn oldest_active_units(
        &mut self,
        product_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Unit>, AppError> {
        Ok(self
            .work
            .units
            .iter()
            .filter(|u| u.active && u.product_id == product_id && !exclude.contains(&u.id))
            .take(usize::try_from(limit).unwrap_or_default())
            .cloned()
            .collect())
    }

    async fn deactivate_units(&mut self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut affected = 0;
        for unit in self.work.units.iter_mut().filter(|u| u.active && ids.contains(&u.id)) {
            unit.active = false;
            affected += 1;
        }
        Ok(affected)
    }

    async fn relocate_units(&mut self, ids: &[Uuid], warehouse_id: Uuid) -> Result<u64, AppError> {
        let mut affected = 0;
        for unit in self.work.units.iter_mut().filter(|u| u.active && ids.contains(&u.id)) {
            unit.current_warehouse_id = Some(warehouse_id);
            affected += 1;
        }
        Ok(affected)
    }

    async fn active_units(&mut self, product_id: Uuid) -> Result<Vec<Unit>, AppError> {
        Ok(self
            .work
            .units
            .iter()
            .filter(|u| u.active && u.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn unit_locations(&mut self, product_id: Uuid) -> Result<Vec<UnitLocation>, AppError> {
        let mut counts: HashMap<Option<Uuid>, i64> = HashMap::new();
        for unit in self.work.units.iter().filter(|u| u.active && u.product_id == product_id) {
            *counts.entry(unit.current_warehouse_id).or_default() += 1;
        }
        let mut locations: Vec<UnitLocation> = counts
            .into_iter()
            .map(|(warehouse_id, active_unit_count)| UnitLocation { warehouse_id, active_unit_count })
            .collect();
        locations.sort_by(|a, b| {
            b.active_unit_count
                .cmp(&a.active_unit_count)
                .then(a.warehouse_id.cmp(&b.warehouse_id))
        });
        Ok(locations)
    }

    async fn insert_movement(&mut self, new: &NewMovement) -> Result<Movement, AppError> {
        if let Some(stall) = self.faults.stall_movement_insert {
            tokio::time::sleep(stall).await;
        }
        if self.faults.fail_movement_insert {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada")));
        }
        let movement = Movement {
            id: Uuid::new_v4(),
            product_id: new.product_id,
            movement_type_id: new.movement_type_id,
            quantity: new.quantity,
            unit_cost: new.unit_cost,
            list_price: new.list_price,
            warehouse_id: new.warehouse_id,
            supplier_id: new.supplier_id,
            created_by: new.created_by,
            comment: new.comment.clone(),
            active: true,
            created_at: Utc::now(),
        };
        self.work.movements.push(movement.clone());
        Ok(movement)
    }

    async fn link_movement_units(
        &mut self,
        movement_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<(), AppError> {
        self.work
            .movement_units
            .extend(unit_ids.iter().map(|unit_id| (movement_id, *unit_id)));
        Ok(())
    }

    async fn product_movements(&mut self, product_id: Uuid) -> Result<Vec<Movement>, AppError> {
        Ok(self
            .work
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn commit(mut self) -> Result<(), AppError> {
        *self.guard = self.work;
        Ok(())
    }
}
