// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{catalog::MovementType, product::NamingAttributes},
};

// Cadastros mestres (tipos, depósitos, fornecedores, marcas...) pertencem a
// outro módulo; aqui só lemos o que o razão precisa.
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_movement_type<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<MovementType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement_type = sqlx::query_as::<_, MovementType>(
            r#"
            SELECT id, name, is_incoming, is_outgoing, active
            FROM movement_types
            WHERE id = $1 AND active
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(movement_type)
    }

    pub async fn warehouse_exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM warehouses WHERE id = $1 AND active)",
        )
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn supplier_exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM suppliers WHERE id = $1 AND active)",
        )
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    /// Resolve as relações do produto (marca, modelo, capacidades, cor) para o nome.
    pub async fn naming_attributes<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Option<NamingAttributes>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attributes = sqlx::query_as::<_, NamingAttributes>(
            r#"
            SELECT
                b.name         AS brand,
                m.name         AS model,
                m.storage_text AS model_storage,
                m.color_text   AS model_color,
                s.capacity_gb  AS storage_gb,
                mo.capacity_gb AS memory_gb,
                c.name         AS color,
                p.description  AS description
            FROM products p
            LEFT JOIN brands b           ON b.id = p.brand_id
            LEFT JOIN models m           ON m.id = p.model_id
            LEFT JOIN storage_options s  ON s.id = p.storage_id
            LEFT JOIN memory_options mo  ON mo.id = p.memory_id
            LEFT JOIN colors c           ON c.id = p.color_id
            WHERE p.id = $1
            "#,
        )
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(attributes)
    }
}
