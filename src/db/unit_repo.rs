// src/db/unit_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        product::UnitLocation,
        unit::{NewUnit, Unit},
    },
};

const UNIT_COLUMNS: &str =
    "id, product_id, code, name, active, current_warehouse_id, created_at, updated_at";

#[derive(Clone, Default)]
pub struct UnitRepository;

impl UnitRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewUnit) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO units (product_id, code, name, current_warehouse_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {UNIT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Unit>(&sql)
            .bind(new.product_id)
            .bind(&new.code)
            .bind(&new.name)
            .bind(new.warehouse_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Índice único parcial: um identificador só pode estar ativo uma vez.
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::UnitIdentifierInUse(new.code.clone());
                    }
                }
                e.into()
            })
    }

    pub async fn find_active_by_code<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {UNIT_COLUMNS} FROM units WHERE code = $1 AND active");
        let unit = sqlx::query_as::<_, Unit>(&sql)
            .bind(code)
            .fetch_optional(executor)
            .await?;
        Ok(unit)
    }

    /// Trava as unidades encontradas junto com o produto.
    pub async fn find_active_by_codes<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {UNIT_COLUMNS} FROM units
            WHERE product_id = $1 AND active AND code = ANY($2)
            ORDER BY created_at ASC
            FOR UPDATE
            "#
        );
        let units = sqlx::query_as::<_, Unit>(&sql)
            .bind(product_id)
            .bind(codes)
            .fetch_all(executor)
            .await?;
        Ok(units)
    }

    pub async fn find_oldest_active<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        exclude: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {UNIT_COLUMNS} FROM units
            WHERE product_id = $1 AND active AND NOT (id = ANY($2))
            ORDER BY created_at ASC, id ASC
            LIMIT $3
            FOR UPDATE
            "#
        );
        let units = sqlx::query_as::<_, Unit>(&sql)
            .bind(product_id)
            .bind(exclude)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(units)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE units SET active = FALSE, updated_at = NOW() WHERE id = ANY($1) AND active",
        )
            .bind(ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn relocate<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
        warehouse_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE units
            SET current_warehouse_id = $1, updated_at = NOW()
            WHERE id = ANY($2) AND active
            "#,
        )
            .bind(warehouse_id)
            .bind(ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {UNIT_COLUMNS} FROM units WHERE product_id = $1 AND active ORDER BY created_at ASC, id ASC"
        );
        let units = sqlx::query_as::<_, Unit>(&sql)
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(units)
    }

    pub async fn locations<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<UnitLocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations = sqlx::query_as::<_, UnitLocation>(
            r#"
            SELECT current_warehouse_id AS warehouse_id, COUNT(*) AS active_unit_count
            FROM units
            WHERE product_id = $1 AND active
            GROUP BY current_warehouse_id
            ORDER BY active_unit_count DESC, current_warehouse_id ASC NULLS FIRST
            "#,
        )
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(locations)
    }
}
