//! Tipo paralelo deprecado: evento de asignación lineal
//!
//! Registros previos al ledger de planillas/asignaciones. Un evento por
//! asignación, sin concepto de planilla. El código nuevo nunca crea estos
//! registros; solo el bridge de finalización los lee y los completa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del evento legado - mapea al ENUM legacy_event_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "legacy_event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyEventStatus {
    PreAsignado,
    Pendiente,
    Completado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentEvent {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: LegacyEventStatus,
    pub pickup_cost: i32,
    pub packages_picked_up: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&LegacyEventStatus::PreAsignado).unwrap(),
            "\"PRE_ASIGNADO\""
        );
        let parsed: LegacyEventStatus = serde_json::from_str("\"PENDIENTE\"").unwrap();
        assert_eq!(parsed, LegacyEventStatus::Pendiente);
    }
}
