// src/common/db_utils.rs

use std::{future::Future, time::Duration};

use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;

/// Limites de uma transação: espera para obter a conexão e duração total.
/// Operações em lote usam limites maiores que uma movimentação avulsa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    pub acquire_timeout: Duration,
    pub execution_timeout: Duration,
}

impl TxOptions {
    pub fn new(acquire_timeout: Duration, execution_timeout: Duration) -> Self {
        Self { acquire_timeout, execution_timeout }
    }
}

impl Default for TxOptions {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(10))
    }
}

// ---
// Helper: abre a transação já com os limites aplicados
// ---
/// Obtém a conexão respeitando `acquire_timeout` e define o `statement_timeout`
/// local da transação (vale só até o commit/rollback).
pub(crate) async fn begin_bounded(
    pool: &PgPool,
    options: TxOptions,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // 1. Adquire conexão e abre a transação (PoolTimedOut já vira TransactionTimeout)
    let mut tx = tokio::time::timeout(options.acquire_timeout, pool.begin())
        .await
        .map_err(|_| AppError::TransactionTimeout)??;

    // 2. Limite do lado do servidor
    sqlx::query("SELECT set_config('statement_timeout', $1, true)")
        .bind(options.execution_timeout.as_millis().to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// Executa a unidade de trabalho dentro do limite de execução.
/// Se o prazo estourar, o future é descartado junto com a transação (rollback).
pub(crate) async fn within_deadline<T, F>(options: TxOptions, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(options.execution_timeout, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                "⏱️ Transação abortada após {:?}",
                options.execution_timeout
            );
            Err(AppError::TransactionTimeout)
        }
    }
}

/// Traduz violação de chave estrangeira em erro de referência.
pub(crate) fn map_reference_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            return AppError::InvalidReference(constraint);
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn deadline_passes_through_results() {
        let options = TxOptions::new(Duration::from_millis(10), Duration::from_millis(200));
        let value = within_deadline(options, async { Ok::<_, AppError>(42) }).await;
        assert_matches!(value, Ok(42));
    }

    #[tokio::test]
    async fn deadline_turns_stalls_into_timeouts() {
        let options = TxOptions::new(Duration::from_millis(10), Duration::from_millis(20));
        let result = within_deadline(options, async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, AppError>(())
        })
        .await;
        assert_matches!(result, Err(AppError::TransactionTimeout));
    }
}
