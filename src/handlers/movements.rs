// src/handlers/movements.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::auth::CurrentUser,
    models::movement::{CreateMovementPayload, Movement, MovementCreated},
};

// ---
// Handler: create_movement
// ---
// A validação de formato fica no serviço: ela depende da classificação do tipo.
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Inventory",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = MovementCreated),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto, unidade, depósito ou fornecedor inexistente"),
        (status = 409, description = "Unidades não conferem ou saldo ficaria negativo"),
        (status = 504, description = "Transação excedeu o tempo limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let movement = app_state
        .movement_ledger
        .create_movement(payload, Some(user.0))
        .await?;

    Ok((StatusCode::CREATED, Json(MovementCreated { movement_id: movement.id })))
}

// ---
// Handler: list_product_movements
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Histórico do produto, mais recente primeiro", body = Vec<Movement>),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_product_movements(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = app_state.movement_ledger.movement_history(product_id).await?;
    Ok(Json(movements))
}
