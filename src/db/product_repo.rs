// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_reference_violation, error::AppError},
    models::product::{NewProduct, Product},
    services::naming::DEFAULT_PRODUCT_NAME,
};

const PRODUCT_COLUMNS: &str = r#"
    id, name, quantity, cost, list_price,
    brand_id, model_id, storage_id, memory_id, color_id, product_type_id,
    description, active, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Leitura com `FOR UPDATE`: a linha fica travada até o commit,
    /// então duas saídas concorrentes nunca leem o mesmo saldo.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Cria o produto com saldo zero e nome provisório (o nome final depende das relações).
    pub async fn create<'e, E>(&self, executor: E, new: &NewProduct) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO products (
                name, quantity, cost, list_price,
                brand_id, model_id, storage_id, memory_id, color_id, product_type_id,
                description
            )
            VALUES ($1, 0, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let attrs = &new.attributes;
        sqlx::query_as::<_, Product>(&sql)
            .bind(DEFAULT_PRODUCT_NAME)
            .bind(attrs.cost)
            .bind(attrs.list_price)
            .bind(attrs.brand_id)
            .bind(attrs.model_id)
            .bind(new.storage_id)
            .bind(new.memory_id)
            .bind(new.color_id)
            .bind(attrs.product_type_id)
            .bind(attrs.description.as_deref())
            .fetch_one(executor)
            .await
            .map_err(map_reference_violation)
    }

    pub async fn rename<'e, E>(&self, executor: E, id: Uuid, name: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE products SET name = $1, updated_at = NOW() WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn update_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: i32,
        cost: Option<Decimal>,
        list_price: Option<Decimal>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // COALESCE mantém o valor atual quando o campo não veio.
        sqlx::query(
            r#"
            UPDATE products
            SET quantity   = $1,
                cost       = COALESCE($2, cost),
                list_price = COALESCE($3, list_price),
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
            .bind(quantity)
            .bind(cost)
            .bind(list_price)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
