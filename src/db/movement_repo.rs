// src/db/movement_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_reference_violation, error::AppError},
    models::movement::{Movement, NewMovement},
};

const MOVEMENT_COLUMNS: &str = r#"
    id, product_id, movement_type_id, quantity, unit_cost, list_price,
    warehouse_id, supplier_id, created_by, comment, active, created_at
"#;

#[derive(Clone, Default)]
pub struct MovementRepository;

impl MovementRepository {
    pub fn new() -> Self {
        Self
    }

    /// Registra uma movimentação no livro-razão (auditoria).
    pub async fn create<'e, E>(&self, executor: E, new: &NewMovement) -> Result<Movement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO movements (
                product_id, movement_type_id, quantity, unit_cost, list_price,
                warehouse_id, supplier_id, created_by, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Movement>(&sql)
            .bind(new.product_id)
            .bind(new.movement_type_id)
            .bind(new.quantity)
            .bind(new.unit_cost)
            .bind(new.list_price)
            .bind(new.warehouse_id)
            .bind(new.supplier_id)
            .bind(new.created_by)
            .bind(new.comment.as_deref())
            .fetch_one(executor)
            .await
            .map_err(map_reference_violation)
    }

    pub async fn link_units<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
        unit_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if unit_ids.is_empty() {
            return Ok(());
        }

        // Um único INSERT para todas as unidades.
        sqlx::query(
            r#"
            INSERT INTO movement_units (movement_id, unit_id)
            SELECT $1, unit_id FROM UNNEST($2::uuid[]) AS t(unit_id)
            "#,
        )
            .bind(movement_id)
            .bind(unit_ids)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_for_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE product_id = $1 ORDER BY created_at DESC"
        );
        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(movements)
    }
}
