// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

// Todos os erros tipados do razão de estoque.
// A UI traduz pelo `code()`, a mensagem aqui é só o padrão em português.
#[derive(Debug, Error)]
pub enum AppError {
    // ---
    // Validação (detectados antes de abrir a transação)
    // ---
    #[error("Tipo de movimentação inválido ou inexistente")]
    InvalidMovementType,

    #[error("O produto é obrigatório para entradas e saídas")]
    MissingProduct,

    #[error("O custo unitário é obrigatório")]
    MissingCost,

    #[error("O custo unitário não pode ser negativo")]
    NegativeCost,

    #[error("A quantidade é obrigatória")]
    MissingQuantity,

    #[error("A quantidade deve ser maior que zero")]
    NonPositiveQuantity,

    #[error("Informe ao menos um identificador de unidade")]
    MissingUnitIdentifiers,

    #[error("O depósito é obrigatório para transferências")]
    MissingWarehouse,

    #[error("Foram informados {supplied} identificadores para uma quantidade de {quantity}")]
    TooManyUnitIdentifiers { supplied: usize, quantity: i32 },

    #[error("A quantidade ({quantity}) difere do número de identificadores ({supplied})")]
    UnitCountMismatch { supplied: usize, quantity: i32 },

    #[error("Identificadores repetidos no pedido: {0:?}")]
    DuplicateUnitIdentifiers(Vec<String>),

    #[error("O preço de lista não pode ser negativo")]
    NegativeListPrice,

    #[error("Valor numérico inválido no campo '{0}'")]
    InvalidNumber(&'static str),

    #[error("A movimentação de {quantity} unidades excede o limite de {max}")]
    TooManyUnits { quantity: i32, max: i32 },

    #[error("Identificador de unidade longo demais: '{0}…'")]
    UnitIdentifierTooLong(String),

    #[error("O lote geraria variantes demais (limite de {max})")]
    TooManyVariants { max: usize },

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // ---
    // Consistência (detectados dentro da transação, que é desfeita)
    // ---
    #[error("Produto {0} não encontrado")]
    ProductNotFound(Uuid),

    #[error("Nenhuma unidade ativa com o identificador '{0}'")]
    UnitNotFound(String),

    #[error("Unidades ativas não encontradas: {missing:?}")]
    UnitsNotFound { missing: Vec<String> },

    #[error("Estoque insuficiente: saldo {current}, saída de {requested}")]
    NegativeResultingQuantity { current: i32, requested: i32 },

    #[error("Depósito {0} não encontrado")]
    WarehouseNotFound(Uuid),

    #[error("Fornecedor {0} não encontrado")]
    SupplierNotFound(Uuid),

    #[error("O identificador '{0}' já pertence a uma unidade ativa")]
    UnitIdentifierInUse(String),

    #[error("Referência inexistente ({0})")]
    InvalidReference(String),

    #[error("A quantidade resultante excede o limite suportado")]
    QuantityOverflow,

    // ---
    // Infraestrutura
    // ---
    #[error("Token inválido")]
    InvalidToken,

    #[error("Tempo limite da transação excedido")]
    TransactionTimeout,

    #[error("Erro de banco de dados")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código estável para a camada de apresentação.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidMovementType => "INVALID_MOVEMENT_TYPE",
            AppError::MissingProduct => "MISSING_PRODUCT",
            AppError::MissingCost => "MISSING_COST",
            AppError::NegativeCost => "NEGATIVE_COST",
            AppError::MissingQuantity => "MISSING_QUANTITY",
            AppError::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            AppError::MissingUnitIdentifiers => "MISSING_UNIT_IDENTIFIERS",
            AppError::MissingWarehouse => "MISSING_WAREHOUSE",
            AppError::TooManyUnitIdentifiers { .. } => "TOO_MANY_UNIT_IDENTIFIERS",
            AppError::UnitCountMismatch { .. } => "UNIT_COUNT_MISMATCH",
            AppError::DuplicateUnitIdentifiers(_) => "DUPLICATE_UNIT_IDENTIFIERS",
            AppError::NegativeListPrice => "NEGATIVE_LIST_PRICE",
            AppError::InvalidNumber(_) => "INVALID_NUMBER",
            AppError::TooManyUnits { .. } => "TOO_MANY_UNITS",
            AppError::UnitIdentifierTooLong(_) => "UNIT_IDENTIFIER_TOO_LONG",
            AppError::TooManyVariants { .. } => "TOO_MANY_VARIANTS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            AppError::UnitNotFound(_) => "UNIT_NOT_FOUND",
            AppError::UnitsNotFound { .. } => "UNITS_NOT_FOUND",
            AppError::NegativeResultingQuantity { .. } => "NEGATIVE_RESULTING_QUANTITY",
            AppError::WarehouseNotFound(_) => "WAREHOUSE_NOT_FOUND",
            AppError::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            AppError::UnitIdentifierInUse(_) => "UNIT_IDENTIFIER_IN_USE",
            AppError::InvalidReference(_) => "INVALID_REFERENCE",
            AppError::QuantityOverflow => "QUANTITY_OVERFLOW",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::TransactionTimeout => "TRANSACTION_TIMEOUT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidMovementType
            | AppError::MissingProduct
            | AppError::MissingCost
            | AppError::NegativeCost
            | AppError::MissingQuantity
            | AppError::NonPositiveQuantity
            | AppError::MissingUnitIdentifiers
            | AppError::MissingWarehouse
            | AppError::TooManyUnitIdentifiers { .. }
            | AppError::UnitCountMismatch { .. }
            | AppError::DuplicateUnitIdentifiers(_)
            | AppError::NegativeListPrice
            | AppError::InvalidNumber(_)
            | AppError::TooManyUnits { .. }
            | AppError::UnitIdentifierTooLong(_)
            | AppError::TooManyVariants { .. }
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,

            AppError::ProductNotFound(_)
            | AppError::UnitNotFound(_)
            | AppError::WarehouseNotFound(_)
            | AppError::SupplierNotFound(_) => StatusCode::NOT_FOUND,

            AppError::UnitsNotFound { .. }
            | AppError::NegativeResultingQuantity { .. }
            | AppError::UnitIdentifierInUse(_) => StatusCode::CONFLICT,

            AppError::InvalidReference(_) | AppError::QuantityOverflow => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TransactionTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Erros de infraestrutura não expõem detalhes ao cliente.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::InternalServerError(_))
    }

    pub fn to_api_error(&self) -> ApiError {
        let status = self.status();
        let code = self.code();

        if self.is_infrastructure() {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
            return ApiError {
                status,
                error: "Ocorreu um erro inesperado.".into(),
                code,
                details: None,
            };
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::UnitsNotFound { missing } => Some(json!({ "missing": missing })),
            AppError::DuplicateUnitIdentifiers(codes) => Some(json!({ "duplicated": codes })),
            AppError::NegativeResultingQuantity { current, requested } => {
                Some(json!({ "current": current, "requested": requested }))
            }
            AppError::TooManyUnits { quantity, max } => {
                Some(json!({ "quantity": quantity, "max": max }))
            }
            _ => None,
        };

        ApiError {
            status,
            error: self.to_string(),
            code,
            details,
        }
    }
}

// SQLSTATE do Postgres quando o statement_timeout cancela a consulta.
const QUERY_CANCELED: &str = "57014";

// Toda falha do sqlx passa por aqui (inclusive o `?` dos repositórios).
// Pool esgotado e statement_timeout viram TransactionTimeout.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_timeout(&err) {
            return AppError::TransactionTimeout;
        }
        AppError::DatabaseError(err)
    }
}

fn is_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(QUERY_CANCELED) => {
            tracing::warn!("⏱️ Consulta cancelada pelo statement_timeout: {}", db_err.message());
            true
        }
        _ => false,
    }
}

// Resposta de erro serializada para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: &'static str,
    pub details: Option<Value>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "code": self.code, "details": details }),
            None => json!({ "error": self.error, "code": self.code }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_errors_are_conflicts() {
        let err = AppError::UnitsNotFound { missing: vec!["IMEI-1".into()] };
        let api = err.to_api_error();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.code, "UNITS_NOT_FOUND");
        assert_eq!(api.details, Some(json!({ "missing": ["IMEI-1"] })));
    }

    #[test]
    fn infrastructure_errors_hide_the_cause() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool fechado"));
        let api = err.to_api_error();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("pool"));
        assert!(api.details.is_none());
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        assert_eq!(AppError::TransactionTimeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    // Erro de banco mínimo com SQLSTATE configurável.
    #[derive(Debug)]
    struct PgFailure(&'static str);

    impl std::fmt::Display for PgFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "falha {}", self.0)
        }
    }

    impl std::error::Error for PgFailure {}

    impl sqlx::error::DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "canceling statement due to statement timeout"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.0.into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    #[test]
    fn statement_timeout_becomes_a_transaction_timeout() {
        let err: AppError = sqlx::Error::Database(Box::new(PgFailure("57014"))).into();
        assert!(matches!(err, AppError::TransactionTimeout));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn exhausted_pool_becomes_a_transaction_timeout() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::TransactionTimeout));
    }

    #[test]
    fn other_database_failures_stay_internal() {
        let err: AppError = sqlx::Error::Database(Box::new(PgFailure("23502"))).into();
        assert!(err.is_infrastructure());
        assert_eq!(err.code(), "DATABASE_ERROR");

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn unit_limit_reports_the_ceiling() {
        let api = AppError::TooManyUnits { quantity: 5000, max: 1000 }.to_api_error();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "TOO_MANY_UNITS");
        assert_eq!(api.details, Some(json!({ "quantity": 5000, "max": 1000 })));
    }
}
