//! Capa de acceso a datos
//!
//! Funciones de query sobre `&mut PgConnection` para que los controllers
//! las compongan dentro de una única transacción por operación.

pub mod assignment_repository;
pub mod client_repository;
pub mod driver_repository;
pub mod legacy_event_repository;
pub mod package_repository;
pub mod run_repository;
