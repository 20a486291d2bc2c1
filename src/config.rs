// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::db_utils::TxOptions,
    db::PgInventoryStore,
    services::{movement_validator::MovementLimits, MovementLedger, ProductService, UnitRegistry},
};

// ---
// Configuração lida do ambiente (.env opcional)
// ---
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub tx_options: TxOptions,
    pub batch_tx_options: TxOptions,
    pub unit_code_prefix: String,
    pub movement_limits: MovementLimits,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let tx_options = TxOptions::new(
            Duration::from_secs(var_or("TX_ACQUIRE_TIMEOUT_SECS", 3)?),
            Duration::from_secs(var_or("TX_EXECUTION_TIMEOUT_SECS", 10)?),
        );
        // Lote cria dezenas de linhas: limites maiores.
        let batch_tx_options = TxOptions::new(
            Duration::from_secs(var_or("BATCH_TX_ACQUIRE_TIMEOUT_SECS", 10)?),
            Duration::from_secs(var_or("BATCH_TX_EXECUTION_TIMEOUT_SECS", 30)?),
        );

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            tx_options,
            batch_tx_options,
            unit_code_prefix: env::var("UNIT_CODE_PREFIX").unwrap_or_else(|_| "SN-".to_string()),
            movement_limits: MovementLimits {
                max_units: var_or("MAX_UNITS_PER_MOVEMENT", MovementLimits::default().max_units)?,
            },
        })
    }
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw}")),
        Err(_) => Ok(default),
    }
}

// ---
// Estado compartilhado pelos handlers
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub movement_ledger: MovementLedger<PgInventoryStore>,
    pub product_service: ProductService<PgInventoryStore>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            // O limite de cada transação é aplicado no `begin`; o pool espera o maior deles.
            .acquire_timeout(config.tx_options.acquire_timeout.max(config.batch_tx_options.acquire_timeout))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let store = PgInventoryStore::new(db_pool.clone());
        let movement_ledger = MovementLedger::new(
            store.clone(),
            UnitRegistry::new(config.unit_code_prefix.clone()),
            config.tx_options,
        )
        .with_limits(config.movement_limits);
        let product_service =
            ProductService::new(store, config.tx_options, config.batch_tx_options);

        Ok(Self {
            db_pool,
            jwt_secret: config.jwt_secret.clone(),
            movement_ledger,
            product_service,
        })
    }
}
