//! Coordinador de rutas de retiro
//!
//! Servicio que asigna qué chofer visita qué cliente para retirar
//! paquetes pendientes, en qué fecha y turno, garantizando que un cliente
//! nunca quede doble-asignado entre choferes el mismo día.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::auth_middleware;
use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Armar el router completo de la aplicación
pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/pickups", routes::pickup_routes::create_pickup_router())
        .nest("/assignments", routes::completion_routes::create_completion_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(state)
}

/// Health check simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "pickup-routing",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
