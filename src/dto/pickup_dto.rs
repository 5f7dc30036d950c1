//! DTOs de planillas y asignaciones de retiro

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AssignmentStatus, AssignmentWithClient, RunShift, RunWithDriver};

/// Item de asignación dentro de un lote de alta
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentInput {
    pub client_id: Uuid,
    /// Si falta, se toma el costo de retiro por defecto del cliente
    pub cost: Option<i32>,
    pub notes: Option<String>,
}

/// Request para crear (o extender) la planilla de un chofer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRunRequest {
    pub driver_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub shift: Option<RunShift>,
    #[validate(length(min = 1, message = "at least one assignment is required"))]
    pub assignments: Vec<AssignmentInput>,
}

/// Request para agregar asignaciones a una planilla existente
#[derive(Debug, Deserialize, Validate)]
pub struct AppendAssignmentsRequest {
    #[validate(length(min = 1, message = "at least one assignment is required"))]
    pub assignments: Vec<AssignmentInput>,
}

/// Request de copy-forward de una planilla a fechas futuras
#[derive(Debug, Deserialize, Validate)]
pub struct CopyRunRequest {
    #[validate(length(min = 1, message = "at least one target date is required"))]
    pub dates: Vec<NaiveDate>,
    /// Vacío = copiar todas las asignaciones de la planilla origen
    #[serde(default)]
    pub assignment_ids: Vec<Uuid>,
}

/// Request del chofer para marcar progreso de una asignación
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AssignmentStatus,
    pub packages_picked_up: Option<i32>,
}

/// Request de edición administrativa: costo y/o reasignación de chofer
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssignmentRequest {
    #[validate(range(min = 0, message = "cost must be non-negative"))]
    pub cost: Option<i32>,
    pub driver_id: Option<Uuid>,
}

/// Request de reasignación de planilla completa
#[derive(Debug, Deserialize)]
pub struct ReassignRunRequest {
    pub new_driver_id: Uuid,
}

/// Rango de fechas para listados
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Asignación en las respuestas de la API
#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_address: String,
    pub client_phone: Option<String>,
    pub status: AssignmentStatus,
    pub cost: i32,
    pub packages_to_pickup: i32,
    pub packages_picked_up: Option<i32>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssignmentWithClient> for AssignmentResponse {
    fn from(a: AssignmentWithClient) -> Self {
        Self {
            id: a.id,
            client_id: a.client_id,
            client_name: a.client_name,
            client_address: a.client_address,
            client_phone: a.client_phone,
            status: a.status,
            cost: a.cost,
            packages_to_pickup: a.packages_to_pickup,
            packages_picked_up: a.packages_picked_up,
            notes: a.notes,
            updated_at: a.updated_at,
        }
    }
}

/// Planilla con asignaciones anidadas
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub date: NaiveDate,
    pub shift: RunShift,
    pub informed: bool,
    pub informed_at: Option<DateTime<Utc>>,
    pub assignments: Vec<AssignmentResponse>,
}

impl RunResponse {
    pub fn from_parts(run: RunWithDriver, assignments: Vec<AssignmentWithClient>) -> Self {
        Self {
            id: run.id,
            driver_id: run.driver_id,
            driver_name: run.driver_name,
            date: run.run_date,
            shift: run.shift,
            informed: run.informed,
            informed_at: run.informed_at,
            assignments: assignments.into_iter().map(AssignmentResponse::from).collect(),
        }
    }
}

/// Item salteado en una operación por lotes, con el motivo
#[derive(Debug, Serialize)]
pub struct SkippedAssignment {
    pub client_id: Uuid,
    pub reason: String,
}

/// Resumen de éxito parcial del alta por lotes
#[derive(Debug, Serialize)]
pub struct CreateRunResponse {
    pub run_id: Uuid,
    pub created: Vec<Uuid>,
    pub skipped: Vec<SkippedAssignment>,
}

/// Resumen de copy-forward hacia una fecha destino
#[derive(Debug, Serialize)]
pub struct CopyRunSummary {
    pub target_date: NaiveDate,
    pub run_id: Uuid,
    pub created: Vec<Uuid>,
    pub skipped: Vec<SkippedAssignment>,
}

/// Respuesta de copy-forward: un resumen por fecha, nunca todo-o-nada
#[derive(Debug, Serialize)]
pub struct CopyRunResponse {
    pub copies: Vec<CopyRunSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_run_request_parses() {
        let json = r#"{
            "driver_id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-05-01",
            "shift": "AFTERNOON",
            "assignments": [{"client_id": "550e8400-e29b-41d4-a716-446655440001", "cost": 5000}]
        }"#;
        let req: CreateRunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(req.shift, Some(RunShift::Afternoon));
        assert_eq!(req.assignments[0].cost, Some(5000));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_run_request_requires_assignments() {
        let json = r#"{
            "driver_id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-05-01",
            "assignments": []
        }"#;
        let req: CreateRunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.shift, None);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_copy_run_request_defaults_to_all_assignments() {
        let json = r#"{"dates": ["2024-05-02", "2024-05-03"]}"#;
        let req: CopyRunRequest = serde_json::from_str(json).unwrap();
        assert!(req.assignment_ids.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_assignment_rejects_negative_cost() {
        let req = UpdateAssignmentRequest {
            cost: Some(-100),
            driver_id: None,
        };
        assert!(req.validate().is_err());
    }
}
