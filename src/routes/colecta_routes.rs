//! Rutas del pool de colectas auto-servicio

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::colecta_controller::ColectaController;
use crate::dto::colecta_dto::{AvailableClient, AvailableParams, ClaimRequest, ClaimResponse};
use crate::middleware::auth::{require_driver, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_colecta_router() -> Router<AppState> {
    Router::new()
        .route("/available", get(list_available))
        .route("/claim", post(claim))
        .layer(middleware::from_fn(require_driver))
}

async fn list_available(
    State(state): State<AppState>,
    Query(params): Query<AvailableParams>,
) -> Result<Json<Vec<AvailableClient>>, AppError> {
    let controller = ColectaController::new(state.pool.clone());
    let response = controller.list_available(params.date).await?;
    Ok(Json(response))
}

async fn claim(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), AppError> {
    let controller = ColectaController::new(state.pool.clone());
    let response = controller.claim(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
