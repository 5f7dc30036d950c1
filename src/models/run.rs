//! Modelo de planilla de retiro (DeliveryRun)
//!
//! Una planilla agrupa los retiros de un chofer para una fecha y un turno.
//! La identidad lógica es la tripla (driver_id, run_date, shift); el
//! registry la garantiza con lookup-before-insert dentro de la misma
//! transacción que la escritura dependiente.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Turno de la planilla - mapea al ENUM run_shift
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "run_shift", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunShift {
    Morning,
    Afternoon,
}

impl Default for RunShift {
    fn default() -> Self {
        RunShift::Morning
    }
}

impl std::fmt::Display for RunShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunShift::Morning => write!(f, "MORNING"),
            RunShift::Afternoon => write!(f, "AFTERNOON"),
        }
    }
}

/// Planilla diaria de un chofer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryRun {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub run_date: NaiveDate,
    pub shift: RunShift,
    pub informed: bool,
    pub informed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Planilla con el nombre del chofer resuelto, para listados
#[derive(Debug, Clone, FromRow)]
pub struct RunWithDriver {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub run_date: NaiveDate,
    pub shift: RunShift,
    pub informed: bool,
    pub informed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_default_is_morning() {
        assert_eq!(RunShift::default(), RunShift::Morning);
    }

    #[test]
    fn test_shift_serde_names() {
        assert_eq!(
            serde_json::to_string(&RunShift::Afternoon).unwrap(),
            "\"AFTERNOON\""
        );
        let parsed: RunShift = serde_json::from_str("\"MORNING\"").unwrap();
        assert_eq!(parsed, RunShift::Morning);
    }
}
