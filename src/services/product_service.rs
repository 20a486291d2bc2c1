// src/services/product_service.rs

use uuid::Uuid;

use crate::{
    common::{
        db_utils::{within_deadline, TxOptions},
        error::AppError,
    },
    db::{InventoryStore, InventoryTx},
    models::{
        product::{NewProduct, Product, ProductAttributes, UnitLocation},
        unit::Unit,
    },
    services::{
        naming::compose_product_name,
        variant_generator::{expand_variants, VariantOptions},
    },
};

#[derive(Clone)]
pub struct ProductService<S: InventoryStore> {
    store: S,
    tx_options: TxOptions,
    batch_tx_options: TxOptions,
}

impl<S: InventoryStore> ProductService<S> {
    pub fn new(store: S, tx_options: TxOptions, batch_tx_options: TxOptions) -> Self {
        Self { store, tx_options, batch_tx_options }
    }

    // --- CREATE PRODUCT ---
    #[tracing::instrument(skip(self, new))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product, AppError> {
        let mut tx = self.store.begin(self.tx_options).await?;
        let product = within_deadline(self.tx_options, insert_named(&mut tx, &new)).await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, name = %product.name, "✅ Produto criado");
        Ok(product)
    }

    // --- CREATE PRODUCT BATCH ---
    /// Uma variante por combinação, todas na mesma transação (limites de lote).
    #[tracing::instrument(skip(self, base, options))]
    pub async fn create_product_batch(
        &self,
        base: ProductAttributes,
        options: VariantOptions,
    ) -> Result<Vec<Uuid>, AppError> {
        let combinations = expand_variants(&options)?;
        let options = self.batch_tx_options;

        let mut tx = self.store.begin(options).await?;
        let ids = within_deadline(options, async {
            let mut ids = Vec::with_capacity(combinations.len());
            for combination in combinations {
                let product = insert_named(&mut tx, &combination.into_new_product(&base)).await?;
                ids.push(product.id);
            }
            Ok(ids)
        })
        .await?;
        tx.commit().await?;

        tracing::info!(count = ids.len(), "✅ Lote de variantes criado");
        Ok(ids)
    }

    // --- READS ---
    pub async fn unit_location_summary(&self, product_id: Uuid) -> Result<Vec<UnitLocation>, AppError> {
        let mut tx = self.store.begin(self.tx_options).await?;
        ensure_product(&mut tx, product_id).await?;
        let locations = tx.unit_locations(product_id).await?;
        tx.commit().await?;
        Ok(locations)
    }

    pub async fn active_units(&self, product_id: Uuid) -> Result<Vec<Unit>, AppError> {
        let mut tx = self.store.begin(self.tx_options).await?;
        ensure_product(&mut tx, product_id).await?;
        let units = tx.active_units(product_id).await?;
        tx.commit().await?;
        Ok(units)
    }
}

// O nome depende das relações já gravadas, por isso insere antes e renomeia depois.
async fn insert_named<T: InventoryTx>(tx: &mut T, new: &NewProduct) -> Result<Product, AppError> {
    let mut product = tx.insert_product(new).await?;
    let attrs = tx
        .naming_attributes(product.id)
        .await?
        .ok_or(AppError::ProductNotFound(product.id))?;

    let name = compose_product_name(&attrs);
    tx.rename_product(product.id, &name).await?;
    product.name = name;
    Ok(product)
}

async fn ensure_product<T: InventoryTx>(tx: &mut T, product_id: Uuid) -> Result<(), AppError> {
    match tx.find_product(product_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::ProductNotFound(product_id)),
    }
}
