//! Conflict Guard: regla de un-retiro-por-cliente-por-día
//!
//! Chequeo de invariante a nivel de query, invocado antes de cada insert,
//! move o copy. La unidad de exclusividad es la fecha calendario, no la
//! planilla ni el turno: un cliente no debe recibir dos choferes distintos
//! el mismo día aunque los turnos difieran. Las asignaciones NO_RETIRADO
//! quedan exentas.
//!
//! El chequeo debe correr dentro de la misma transacción que el insert
//! dependiente; la ventana entre listar y reclamar en las colectas se
//! tolera y el perdedor recibe un error de conflicto tipado.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::models::RunShift;
use crate::utils::errors::AppError;

/// Asignación viva que bloquea a un cliente en una fecha
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignmentConflict {
    pub assignment_id: Uuid,
    pub run_id: Uuid,
    pub driver_id: Uuid,
    pub driver_name: String,
    pub shift: RunShift,
}

impl AssignmentConflict {
    /// Error de conflicto con el detalle suficiente para que el caller lo
    /// explique sin una segunda consulta: chofer y turno en el mensaje.
    pub fn into_error(self, date: NaiveDate) -> AppError {
        AppError::Conflict(format!(
            "El cliente ya tiene un retiro asignado el {} con el chofer {} (turno {})",
            date, self.driver_name, self.shift
        ))
    }
}

/// Buscar un conflicto para (cliente, fecha) fuera de `exclude_run_id`
pub async fn check(
    conn: &mut PgConnection,
    client_id: Uuid,
    date: NaiveDate,
    exclude_run_id: Option<Uuid>,
) -> Result<Option<AssignmentConflict>, AppError> {
    let live = sqlx::query_as::<_, AssignmentConflict>(
        r#"
        SELECT a.id AS assignment_id, r.id AS run_id, r.driver_id,
               d.name AS driver_name, r.shift
        FROM pickup_assignments a
        JOIN delivery_runs r ON r.id = a.run_id
        JOIN drivers d ON d.id = r.driver_id
        WHERE a.client_id = $1
          AND r.run_date = $2
          AND a.status <> 'NO_RETIRADO'
        "#,
    )
    .bind(client_id)
    .bind(date)
    .fetch_all(&mut *conn)
    .await?;

    Ok(evaluate(live, exclude_run_id))
}

/// Decidir el conflicto sobre las asignaciones vivas ya cargadas
pub fn evaluate(
    live: Vec<AssignmentConflict>,
    exclude_run_id: Option<Uuid>,
) -> Option<AssignmentConflict> {
    live.into_iter()
        .find(|c| Some(c.run_id) != exclude_run_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(run_id: Uuid, driver_name: &str) -> AssignmentConflict {
        AssignmentConflict {
            assignment_id: Uuid::new_v4(),
            run_id,
            driver_id: Uuid::new_v4(),
            driver_name: driver_name.to_string(),
            shift: RunShift::Morning,
        }
    }

    #[test]
    fn test_no_live_assignments_means_no_conflict() {
        assert!(evaluate(vec![], None).is_none());
    }

    #[test]
    fn test_live_assignment_in_other_run_conflicts() {
        let other = Uuid::new_v4();
        let found = evaluate(vec![conflict(other, "Juan")], None);
        assert_eq!(found.unwrap().run_id, other);
    }

    #[test]
    fn test_own_run_is_excluded() {
        let own = Uuid::new_v4();
        assert!(evaluate(vec![conflict(own, "Juan")], Some(own)).is_none());
    }

    #[test]
    fn test_other_run_still_conflicts_when_excluding_own() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let found = evaluate(vec![conflict(own, "Juan"), conflict(other, "Pedro")], Some(own));
        assert_eq!(found.unwrap().driver_name, "Pedro");
    }

    #[test]
    fn test_error_message_names_driver_and_shift() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let err = conflict(Uuid::new_v4(), "Juan").into_error(date);
        let msg = format!("{}", err);
        assert!(msg.contains("Juan"));
        assert!(msg.contains("MORNING"));
        assert!(msg.contains("2024-05-01"));
    }
}
