//! Run Registry: persistencia de planillas de retiro
//!
//! Todas las funciones reciben `&mut PgConnection` para poder ejecutarse
//! dentro de la transacción del caller; la creación de la planilla y el
//! insert de asignaciones que depende de ella comparten transacción.

use chrono::{NaiveDate, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{DeliveryRun, RunShift, RunWithDriver};
use crate::utils::errors::AppError;

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DeliveryRun>, AppError> {
    let run = sqlx::query_as::<_, DeliveryRun>("SELECT * FROM delivery_runs WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(run)
}

pub async fn find_with_driver(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<RunWithDriver>, AppError> {
    let run = sqlx::query_as::<_, RunWithDriver>(
        r#"
        SELECT r.id, r.driver_id, d.name AS driver_name, r.run_date, r.shift,
               r.informed, r.informed_at, r.created_at
        FROM delivery_runs r
        JOIN drivers d ON d.id = r.driver_id
        WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(run)
}

pub async fn find_by_triple(
    conn: &mut PgConnection,
    driver_id: Uuid,
    run_date: NaiveDate,
    shift: RunShift,
) -> Result<Option<DeliveryRun>, AppError> {
    let run = sqlx::query_as::<_, DeliveryRun>(
        "SELECT * FROM delivery_runs WHERE driver_id = $1 AND run_date = $2 AND shift = $3",
    )
    .bind(driver_id)
    .bind(run_date)
    .bind(shift)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(run)
}

/// Buscar o crear la planilla para la tripla (chofer, fecha, turno).
/// Idempotente: lookup-before-insert dentro de la transacción del caller.
pub async fn find_or_create(
    conn: &mut PgConnection,
    driver_id: Uuid,
    run_date: NaiveDate,
    shift: RunShift,
) -> Result<DeliveryRun, AppError> {
    if let Some(existing) = find_by_triple(&mut *conn, driver_id, run_date, shift).await? {
        return Ok(existing);
    }

    let run = sqlx::query_as::<_, DeliveryRun>(
        r#"
        INSERT INTO delivery_runs (id, driver_id, run_date, shift, informed, informed_at, created_at)
        VALUES ($1, $2, $3, $4, FALSE, NULL, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(driver_id)
    .bind(run_date)
    .bind(shift)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(run)
}

pub async fn list_range(
    conn: &mut PgConnection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<RunWithDriver>, AppError> {
    let runs = sqlx::query_as::<_, RunWithDriver>(
        r#"
        SELECT r.id, r.driver_id, d.name AS driver_name, r.run_date, r.shift,
               r.informed, r.informed_at, r.created_at
        FROM delivery_runs r
        JOIN drivers d ON d.id = r.driver_id
        WHERE r.run_date BETWEEN $1 AND $2
        ORDER BY r.run_date, d.name, r.shift
        "#,
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_all(&mut *conn)
    .await?;

    Ok(runs)
}

pub async fn list_for_driver_on(
    conn: &mut PgConnection,
    driver_id: Uuid,
    run_date: NaiveDate,
) -> Result<Vec<RunWithDriver>, AppError> {
    let runs = sqlx::query_as::<_, RunWithDriver>(
        r#"
        SELECT r.id, r.driver_id, d.name AS driver_name, r.run_date, r.shift,
               r.informed, r.informed_at, r.created_at
        FROM delivery_runs r
        JOIN drivers d ON d.id = r.driver_id
        WHERE r.driver_id = $1 AND r.run_date = $2
        ORDER BY r.shift
        "#,
    )
    .bind(driver_id)
    .bind(run_date)
    .fetch_all(&mut *conn)
    .await?;

    Ok(runs)
}

/// Cualquier cambio estructural en el set de asignaciones invalida el
/// flag de notificación para que el operador vuelva a avisar al chofer.
pub async fn mark_uninformed(conn: &mut PgConnection, run_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE delivery_runs SET informed = FALSE, informed_at = NULL WHERE id = $1")
        .bind(run_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn mark_informed(conn: &mut PgConnection, run_id: Uuid) -> Result<bool, AppError> {
    let result =
        sqlx::query("UPDATE delivery_runs SET informed = TRUE, informed_at = $2 WHERE id = $1")
            .bind(run_id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Reapuntar la planilla entera a otro chofer sin tocar sus asignaciones
pub async fn repoint_driver(
    conn: &mut PgConnection,
    run_id: Uuid,
    driver_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("UPDATE delivery_runs SET driver_id = $2 WHERE id = $1")
        .bind(run_id)
        .bind(driver_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Borrar la planilla si quedó sin asignaciones. Devuelve true si se borró.
pub async fn delete_if_empty(conn: &mut PgConnection, run_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM delivery_runs
        WHERE id = $1
          AND NOT EXISTS (SELECT 1 FROM pickup_assignments WHERE run_id = $1)
        "#,
    )
    .bind(run_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(conn: &mut PgConnection, run_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM delivery_runs WHERE id = $1")
        .bind(run_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
