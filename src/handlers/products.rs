// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::auth::CurrentUser,
    models::{
        product::{NewProduct, Product, ProductAttributes, UnitLocation},
        unit::Unit,
    },
    services::{movement_validator::fits_money_column, variant_generator::VariantOptions},
};

fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if !fits_money_column(val) {
        let mut err = ValidationError::new("money");
        err.message = Some("Use no máximo duas casas decimais e até 9.999.999.999,99.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBasePayload {
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "3500.00")]
    pub cost: Option<Decimal>,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "4999.90")]
    pub list_price: Option<Decimal>,

    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
}

impl From<ProductBasePayload> for ProductAttributes {
    fn from(base: ProductBasePayload) -> Self {
        Self {
            brand_id: base.brand_id,
            model_id: base.model_id,
            product_type_id: base.product_type_id,
            cost: base.cost,
            list_price: base.list_price,
            description: base
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub base: ProductBasePayload,
    pub storage_id: Option<Uuid>,
    pub memory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBatchPayload {
    #[validate(nested)]
    pub base: ProductBasePayload,
    #[serde(default)]
    #[validate(nested)]
    pub options: VariantOptions,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBatchCreated {
    pub product_ids: Vec<Uuid>,
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado e nomeado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_service
        .create_product(NewProduct {
            attributes: payload.base.into(),
            storage_id: payload.storage_id,
            memory_id: payload.memory_id,
            color_id: payload.color_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// ---
// Handler: create_product_batch
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/products/batch",
    tag = "Inventory",
    request_body = CreateProductBatchPayload,
    responses(
        (status = 201, description = "Uma variante por combinação", body = ProductBatchCreated),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Referência inexistente"),
        (status = 504, description = "Lote excedeu o tempo limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_batch(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CreateProductBatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product_ids = app_state
        .product_service
        .create_product_batch(payload.base.into(), payload.options)
        .await?;

    Ok((StatusCode::CREATED, Json(ProductBatchCreated { product_ids })))
}

// ---
// Handler: get_unit_locations
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/locations",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Unidades ativas por depósito", body = Vec<UnitLocation>),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_unit_locations(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let locations = app_state.product_service.unit_location_summary(product_id).await?;
    Ok(Json(locations))
}

// ---
// Handler: list_product_units
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/units",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Unidades ativas do produto", body = Vec<Unit>),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_product_units(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let units = app_state.product_service.active_units(product_id).await?;
    Ok(Json(units))
}
