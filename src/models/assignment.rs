//! Modelo de asignación de retiro (PickupAssignment)
//!
//! Cada asignación vincula un cliente con exactamente una planilla, con
//! costo y cantidades de paquetes snapshoteados al momento de crearla.
//!
//! Máquina de estados:
//!
//! | desde        | hacia                     |
//! |--------------|---------------------------|
//! | ASIGNADO     | EN_RUTA, RETIRADO, NO_RETIRADO |
//! | EN_RUTA      | RETIRADO, NO_RETIRADO     |
//! | RETIRADO     | (terminal)                |
//! | NO_RETIRADO  | (terminal)                |
//!
//! No se bloquean transiciones hacia atrás: la corrección administrativa
//! está permitida. La única regla dura es que `packages_picked_up` se
//! setea si y solo si el estado es RETIRADO. EN_RUTA es un estado
//! reservado: se acepta desde el endpoint de progreso del chofer y ningún
//! otro write path lo produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de la asignación - mapea al ENUM assignment_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "assignment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Asignado,
    EnRuta,
    Retirado,
    NoRetirado,
}

impl AssignmentStatus {
    /// Estados terminales: no cuentan como trabajo pendiente
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Retirado | AssignmentStatus::NoRetirado)
    }

    /// Estados vivos a efectos del espejo legado y del conflict guard.
    /// NO_RETIRADO queda exento de la regla de un-retiro-por-día.
    pub fn is_live(&self) -> bool {
        matches!(self, AssignmentStatus::Asignado | AssignmentStatus::EnRuta)
    }

    /// Regla de apareamiento: packages_picked_up viaja junto con RETIRADO
    /// y con ningún otro estado.
    pub fn validate_picked_pairing(&self, packages_picked_up: Option<i32>) -> Result<(), &'static str> {
        match (self, packages_picked_up) {
            (AssignmentStatus::Retirado, None) => {
                Err("packages_picked_up is required when status is RETIRADO")
            }
            (AssignmentStatus::Retirado, Some(_)) => Ok(()),
            (_, Some(_)) => Err("packages_picked_up is only allowed with status RETIRADO"),
            (_, None) => Ok(()),
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Asignado => write!(f, "ASIGNADO"),
            AssignmentStatus::EnRuta => write!(f, "EN_RUTA"),
            AssignmentStatus::Retirado => write!(f, "RETIRADO"),
            AssignmentStatus::NoRetirado => write!(f, "NO_RETIRADO"),
        }
    }
}

/// Asignación de retiro
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PickupAssignment {
    pub id: Uuid,
    pub run_id: Uuid,
    pub client_id: Uuid,
    pub status: AssignmentStatus,
    pub cost: i32,
    pub packages_to_pickup: i32,
    pub packages_picked_up: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asignación con los datos del cliente resueltos, para listados
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentWithClient {
    pub id: Uuid,
    pub run_id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_address: String,
    pub client_phone: Option<String>,
    pub status: AssignmentStatus,
    pub cost: i32,
    pub packages_to_pickup: i32,
    pub packages_picked_up: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&AssignmentStatus::EnRuta).unwrap(),
            "\"EN_RUTA\""
        );
        assert_eq!(
            serde_json::to_string(&AssignmentStatus::NoRetirado).unwrap(),
            "\"NO_RETIRADO\""
        );
        let parsed: AssignmentStatus = serde_json::from_str("\"ASIGNADO\"").unwrap();
        assert_eq!(parsed, AssignmentStatus::Asignado);
    }

    #[test]
    fn test_terminal_and_live() {
        assert!(AssignmentStatus::Retirado.is_terminal());
        assert!(AssignmentStatus::NoRetirado.is_terminal());
        assert!(!AssignmentStatus::Asignado.is_terminal());

        assert!(AssignmentStatus::Asignado.is_live());
        assert!(AssignmentStatus::EnRuta.is_live());
        // NO_RETIRADO no bloquea una nueva asignación el mismo día
        assert!(!AssignmentStatus::NoRetirado.is_live());
    }

    #[test]
    fn test_picked_pairing_rule() {
        assert!(AssignmentStatus::Retirado.validate_picked_pairing(Some(3)).is_ok());
        assert!(AssignmentStatus::Retirado.validate_picked_pairing(None).is_err());
        assert!(AssignmentStatus::Asignado.validate_picked_pairing(None).is_ok());
        assert!(AssignmentStatus::Asignado.validate_picked_pairing(Some(3)).is_err());
        assert!(AssignmentStatus::EnRuta.validate_picked_pairing(Some(1)).is_err());
        assert!(AssignmentStatus::NoRetirado.validate_picked_pairing(None).is_ok());
    }
}
