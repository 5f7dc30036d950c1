//! Assignment Ledger: persistencia de asignaciones de retiro

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{AssignmentStatus, AssignmentWithClient, PickupAssignment};
use crate::utils::errors::AppError;

pub async fn find_by_id(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<PickupAssignment>, AppError> {
    let assignment =
        sqlx::query_as::<_, PickupAssignment>("SELECT * FROM pickup_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(assignment)
}

/// Buscar la asignación de un cliente dentro de una planilla concreta.
/// Soporta la semántica idempotente de create: si el cliente ya está en
/// esta planilla no se duplica.
pub async fn find_in_run_for_client(
    conn: &mut PgConnection,
    run_id: Uuid,
    client_id: Uuid,
) -> Result<Option<PickupAssignment>, AppError> {
    let assignment = sqlx::query_as::<_, PickupAssignment>(
        "SELECT * FROM pickup_assignments WHERE run_id = $1 AND client_id = $2",
    )
    .bind(run_id)
    .bind(client_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(assignment)
}

pub async fn list_for_run(
    conn: &mut PgConnection,
    run_id: Uuid,
) -> Result<Vec<PickupAssignment>, AppError> {
    let assignments = sqlx::query_as::<_, PickupAssignment>(
        "SELECT * FROM pickup_assignments WHERE run_id = $1 ORDER BY created_at",
    )
    .bind(run_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(assignments)
}

pub async fn list_for_runs_with_clients(
    conn: &mut PgConnection,
    run_ids: &[Uuid],
) -> Result<Vec<AssignmentWithClient>, AppError> {
    let assignments = sqlx::query_as::<_, AssignmentWithClient>(
        r#"
        SELECT a.id, a.run_id, a.client_id, c.name AS client_name,
               c.address AS client_address, c.phone AS client_phone,
               a.status, a.cost, a.packages_to_pickup, a.packages_picked_up,
               a.notes, a.created_at, a.updated_at
        FROM pickup_assignments a
        JOIN clients c ON c.id = a.client_id
        WHERE a.run_id = ANY($1)
        ORDER BY a.created_at
        "#,
    )
    .bind(run_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(assignments)
}

pub async fn insert(
    conn: &mut PgConnection,
    run_id: Uuid,
    client_id: Uuid,
    cost: i32,
    packages_to_pickup: i32,
    notes: Option<String>,
) -> Result<PickupAssignment, AppError> {
    let now = Utc::now();
    let assignment = sqlx::query_as::<_, PickupAssignment>(
        r#"
        INSERT INTO pickup_assignments
            (id, run_id, client_id, status, cost, packages_to_pickup, packages_picked_up, notes, created_at, updated_at)
        VALUES ($1, $2, $3, 'ASIGNADO', $4, $5, NULL, $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(run_id)
    .bind(client_id)
    .bind(cost)
    .bind(packages_to_pickup)
    .bind(notes)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(assignment)
}

/// Actualizar estado. La regla de apareamiento packages_picked_up/RETIRADO
/// la valida el controller antes de llegar acá.
pub async fn update_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: AssignmentStatus,
    packages_picked_up: Option<i32>,
) -> Result<PickupAssignment, AppError> {
    let assignment = sqlx::query_as::<_, PickupAssignment>(
        r#"
        UPDATE pickup_assignments
        SET status = $2, packages_picked_up = $3, updated_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(packages_picked_up)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(assignment)
}

pub async fn update_cost(conn: &mut PgConnection, id: Uuid, cost: i32) -> Result<(), AppError> {
    sqlx::query("UPDATE pickup_assignments SET cost = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(cost)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Mover la asignación a otra planilla. Mover no preserva el estado
/// "ya retirado": el chofer nuevo debe re-verificar los paquetes, por eso
/// vuelve a ASIGNADO y se limpia packages_picked_up.
pub async fn move_to_run(
    conn: &mut PgConnection,
    id: Uuid,
    target_run_id: Uuid,
) -> Result<PickupAssignment, AppError> {
    let assignment = sqlx::query_as::<_, PickupAssignment>(
        r#"
        UPDATE pickup_assignments
        SET run_id = $2, status = 'ASIGNADO', packages_picked_up = NULL, updated_at = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(target_run_id)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(assignment)
}

/// Mover todas las asignaciones de una planilla a otra (merge de
/// reasignación total), reseteando estado y conteo retirado.
pub async fn move_all_to_run(
    conn: &mut PgConnection,
    source_run_id: Uuid,
    target_run_id: Uuid,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE pickup_assignments
        SET run_id = $2, status = 'ASIGNADO', packages_picked_up = NULL, updated_at = $3
        WHERE run_id = $1
        "#,
    )
    .bind(source_run_id)
    .bind(target_run_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Resetear todas las asignaciones de una planilla a ASIGNADO (caso
/// reapuntado de la reasignación total: las filas no cambian de planilla).
pub async fn reset_all_for_run(conn: &mut PgConnection, run_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE pickup_assignments
        SET status = 'ASIGNADO', packages_picked_up = NULL, updated_at = $2
        WHERE run_id = $1
        "#,
    )
    .bind(run_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM pickup_assignments WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn delete_for_run(conn: &mut PgConnection, run_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM pickup_assignments WHERE run_id = $1")
        .bind(run_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Asignación abierta de un cliente en una planilla del chofer dado,
/// deliberadamente sin filtrar por fecha: el bridge de finalización tolera
/// el corrimiento de día entre la creación de la planilla y el cierre.
pub async fn find_open_for_driver_client(
    conn: &mut PgConnection,
    client_id: Uuid,
    driver_id: Uuid,
) -> Result<Option<PickupAssignment>, AppError> {
    let assignment = sqlx::query_as::<_, PickupAssignment>(
        r#"
        SELECT a.*
        FROM pickup_assignments a
        JOIN delivery_runs r ON r.id = a.run_id
        WHERE a.client_id = $1
          AND r.driver_id = $2
          AND a.status IN ('ASIGNADO', 'EN_RUTA')
        ORDER BY r.run_date DESC
        LIMIT 1
        "#,
    )
    .bind(client_id)
    .bind(driver_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(assignment)
}
