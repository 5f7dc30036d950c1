//! Adaptador de solo lectura sobre los eventos de asignación deprecados
//!
//! Consultado únicamente por el bridge de finalización. Completar un
//! evento es la única escritura permitida; nunca se insertan filas nuevas
//! ni se migran al ledger.

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::AssignmentEvent;
use crate::utils::errors::AppError;

/// Evento abierto (PENDIENTE) para el par cliente/chofer, el más reciente
pub async fn find_open(
    conn: &mut PgConnection,
    client_id: Uuid,
    driver_id: Uuid,
) -> Result<Option<AssignmentEvent>, AppError> {
    let event = sqlx::query_as::<_, AssignmentEvent>(
        r#"
        SELECT * FROM assignment_events
        WHERE client_id = $1 AND driver_id = $2 AND status = 'PENDIENTE'
        ORDER BY assigned_at DESC
        LIMIT 1
        "#,
    )
    .bind(client_id)
    .bind(driver_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(event)
}

pub async fn complete(
    conn: &mut PgConnection,
    id: Uuid,
    packages_picked_up: i32,
) -> Result<AssignmentEvent, AppError> {
    let event = sqlx::query_as::<_, AssignmentEvent>(
        r#"
        UPDATE assignment_events
        SET status = 'COMPLETADO', completed_at = $2, packages_picked_up = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .bind(packages_picked_up)
    .fetch_one(&mut *conn)
    .await?;

    Ok(event)
}
