//! Rutas de planillas y asignaciones de retiro

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::pickup_controller::PickupController;
use crate::dto::pickup_dto::{
    AppendAssignmentsRequest, CopyRunRequest, CopyRunResponse, CreateRunRequest, CreateRunResponse,
    RangeParams, ReassignRunRequest, RunResponse, UpdateAssignmentRequest, UpdateStatusRequest,
};
use crate::middleware::auth::{require_admin, require_driver, AuthenticatedUser};
use crate::routes::colecta_routes::create_colecta_router;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_pickup_router() -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_runs).post(create_run))
        .route("/runs/:id/assignments", post(append_assignments))
        .route("/runs/:id/copy", post(copy_run))
        .route("/runs/:id/reassign", put(reassign_run))
        .route("/runs/:id/inform", put(mark_informed))
        .route("/runs/:id", delete(delete_run))
        .route("/assignments/:id", put(update_assignment).delete(delete_assignment))
        .layer(middleware::from_fn(require_admin));

    let driver = Router::new()
        .route("/driver/today", get(driver_today))
        .route("/assignments/:id/status", put(update_status))
        .layer(middleware::from_fn(require_driver));

    admin
        .merge(driver)
        .nest("/colectas", create_colecta_router())
}

async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<RunResponse>>, AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.list_runs(params.start_date, params.end_date).await?;
    Ok(Json(response))
}

async fn create_run(
    State(state): State<AppState>,
    Json(request): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<CreateRunResponse>), AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.create_run(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn append_assignments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AppendAssignmentsRequest>,
) -> Result<(StatusCode, Json<CreateRunResponse>), AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.append_assignments(id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn copy_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CopyRunRequest>,
) -> Result<(StatusCode, Json<CopyRunResponse>), AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.copy_run(id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn driver_today(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RunResponse>>, AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.driver_today(user.user_id).await?;
    Ok(Json(response))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<StatusCode, AppError> {
    let controller = PickupController::new(state.pool.clone());
    controller.update_status(id, &user, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAssignmentRequest>,
) -> Result<StatusCode, AppError> {
    let controller = PickupController::new(state.pool.clone());
    controller.update_assignment(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reassign_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReassignRunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let controller = PickupController::new(state.pool.clone());
    let response = controller.reassign_run(id, request.new_driver_id).await?;
    Ok(Json(response))
}

async fn mark_informed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let controller = PickupController::new(state.pool.clone());
    controller.mark_informed(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let controller = PickupController::new(state.pool.clone());
    controller.delete_assignment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let controller = PickupController::new(state.pool.clone());
    controller.delete_run(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
