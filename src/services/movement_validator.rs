// src/services/movement_validator.rs

use std::{collections::HashSet, str::FromStr};

use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    common::error::AppError,
    models::{
        catalog::{MovementClass, MovementType},
        movement::{
            CreateMovementPayload, MovementCommand, MovementHeader, StockChange, Transfer,
            ValidatedMovement,
        },
    },
};

/// Tamanho máximo de um identificador (coluna `units.code`).
pub const MAX_UNIT_CODE_LEN: usize = 120;

/// Maior valor monetário aceito pelas colunas NUMERIC(12, 2).
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Limites por movimentação. Cada unidade vira uma linha dentro da mesma transação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementLimits {
    pub max_units: i32,
}

impl Default for MovementLimits {
    fn default() -> Self {
        Self { max_units: 1000 }
    }
}

// ---
// Validação de movimentações (sem efeitos colaterais)
// ---
/// Classifica pelo tipo já resolvido e aplica as regras de formato
/// daquela classificação. Nada aqui toca o banco.
pub fn validate_movement(
    payload: &CreateMovementPayload,
    movement_type: &MovementType,
    limits: &MovementLimits,
) -> Result<ValidatedMovement, AppError> {
    let unit_codes = normalize_unit_codes(&payload.unit_codes)?;

    let header = MovementHeader {
        movement_type_id: movement_type.id,
        warehouse_id: payload.warehouse_id,
        supplier_id: payload.supplier_id,
        comment: payload
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
    };

    let command = match movement_type.classify() {
        MovementClass::Lateral => {
            MovementCommand::Lateral(validate_transfer(payload, unit_codes, limits)?)
        }
        class => {
            let change = validate_stock_change(payload, class, unit_codes, limits)?;
            if class == MovementClass::Incoming {
                MovementCommand::Incoming(change)
            } else {
                MovementCommand::Outgoing(change)
            }
        }
    };

    Ok(ValidatedMovement { header, command })
}

fn validate_transfer(
    payload: &CreateMovementPayload,
    unit_codes: Vec<String>,
    limits: &MovementLimits,
) -> Result<Transfer, AppError> {
    if unit_codes.is_empty() {
        return Err(AppError::MissingUnitIdentifiers);
    }
    let warehouse_id = payload.warehouse_id.ok_or(AppError::MissingWarehouse)?;

    let supplied = unit_codes.len();
    let count = i32::try_from(supplied).map_err(|_| AppError::InvalidNumber("unitCodes"))?;
    let quantity = match parse_quantity(payload.quantity.as_deref())? {
        None => count,
        Some(q) if q == count => q,
        Some(q) => return Err(AppError::UnitCountMismatch { supplied, quantity: q }),
    };
    check_unit_limit(quantity, limits)?;

    // Custo é opcional na transferência, mas se vier não pode ser negativo.
    let unit_cost = parse_money("unitCost", payload.unit_cost.as_deref())?;
    if unit_cost.is_some_and(|c| c < Decimal::ZERO) {
        return Err(AppError::NegativeCost);
    }

    Ok(Transfer {
        product_id: payload.product_id,
        quantity,
        unit_cost,
        unit_codes,
        warehouse_id,
    })
}

fn validate_stock_change(
    payload: &CreateMovementPayload,
    class: MovementClass,
    unit_codes: Vec<String>,
    limits: &MovementLimits,
) -> Result<StockChange, AppError> {
    let product_id = payload.product_id.ok_or(AppError::MissingProduct)?;

    let unit_cost = parse_money("unitCost", payload.unit_cost.as_deref())?
        .ok_or(AppError::MissingCost)?;
    if unit_cost < Decimal::ZERO {
        return Err(AppError::NegativeCost);
    }

    let quantity = parse_quantity(payload.quantity.as_deref())?.ok_or(AppError::MissingQuantity)?;
    check_unit_limit(quantity, limits)?;

    // Entrada: o excedente vira identificador sintético.
    // Saída: o excedente é baixado das unidades mais antigas.
    let supplied = unit_codes.len();
    if supplied > quantity as usize {
        return Err(AppError::TooManyUnitIdentifiers { supplied, quantity });
    }

    // Preço de lista só vale na entrada.
    let list_price = match class {
        MovementClass::Incoming => parse_money("listPrice", payload.list_price.as_deref())?,
        _ => None,
    };
    if list_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::NegativeListPrice);
    }

    tracing::debug!(?class, %product_id, quantity, supplied, "Movimentação validada");

    Ok(StockChange {
        product_id,
        quantity,
        unit_cost,
        list_price,
        unit_codes,
    })
}

fn check_unit_limit(quantity: i32, limits: &MovementLimits) -> Result<(), AppError> {
    if quantity > limits.max_units {
        return Err(AppError::TooManyUnits { quantity, max: limits.max_units });
    }
    Ok(())
}

/// Remove espaços e linhas vazias; identificadores repetidos são rejeitados.
fn normalize_unit_codes(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut duplicated = Vec::new();
    let mut codes = Vec::with_capacity(raw.len());

    for code in raw.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if code.chars().count() > MAX_UNIT_CODE_LEN {
            return Err(AppError::UnitIdentifierTooLong(code.chars().take(20).collect()));
        }
        if seen.insert(code) {
            codes.push(code.to_string());
        } else if !duplicated.iter().any(|d| d == code) {
            duplicated.push(code.to_string());
        }
    }

    if !duplicated.is_empty() {
        return Err(AppError::DuplicateUnitIdentifiers(duplicated));
    }
    Ok(codes)
}

fn parse_decimal(field: &'static str, raw: Option<&str>) -> Result<Option<Decimal>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => Decimal::from_str(v)
            .map(Some)
            .map_err(|_| AppError::InvalidNumber(field)),
    }
}

/// Valor monetário: no máximo duas casas e dentro da coluna NUMERIC(12, 2).
/// "-0" é tratado como zero.
fn parse_money(field: &'static str, raw: Option<&str>) -> Result<Option<Decimal>, AppError> {
    let Some(value) = parse_decimal(field, raw)? else {
        return Ok(None);
    };
    if !fits_money_column(&value) {
        return Err(AppError::InvalidNumber(field));
    }
    Ok(Some(if value.is_zero() { Decimal::ZERO } else { value }))
}

pub fn fits_money_column(value: &Decimal) -> bool {
    value.normalize().scale() <= 2 && value.abs() <= MAX_MONEY
}

// Aceita "10" e "10.0"; frações reais são inválidas.
fn parse_quantity(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    let Some(value) = parse_decimal("quantity", raw)? else {
        return Ok(None);
    };
    if value <= Decimal::ZERO {
        return Err(AppError::NonPositiveQuantity);
    }
    if !value.fract().is_zero() {
        return Err(AppError::InvalidNumber("quantity"));
    }
    value
        .to_i32()
        .map(Some)
        .ok_or(AppError::InvalidNumber("quantity"))
}
