//! DTOs del bridge de finalización legado

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request del chofer al terminar un retiro
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    pub client_id: Uuid,
    #[validate(range(min = 0, message = "packages_picked_up must be non-negative"))]
    pub packages_picked_up: i32,
}

/// En qué sistema se resolvió la finalización
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSource {
    LegacyEvent,
    Ledger,
}

/// Registro actualizado por el bridge
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub source: CompletionSource,
    pub record_id: Uuid,
    pub packages_picked_up: i32,
}
