//! Ruta del bridge de finalización legado

use axum::{extract::State, middleware, routing::post, Extension, Json, Router};

use crate::controllers::completion_controller::CompletionController;
use crate::dto::completion_dto::{CompleteRequest, CompleteResponse};
use crate::middleware::auth::{require_driver, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_completion_router() -> Router<AppState> {
    Router::new()
        .route("/complete", post(complete))
        .layer(middleware::from_fn(require_driver))
}

async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let controller = CompletionController::new(state.pool.clone());
    let response = controller.complete(user.user_id, request).await?;
    Ok(Json(response))
}
