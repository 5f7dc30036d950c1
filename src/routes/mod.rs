//! Rutas de la API

pub mod colecta_routes;
pub mod completion_routes;
pub mod pickup_routes;
