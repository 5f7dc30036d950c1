//! Adaptador sobre el ledger de paquetes
//!
//! El ledger es dueño de los paquetes; el coordinador solo dispara las
//! transiciones masivas que necesita: contar pendientes, marcarlos como
//! retirados por un chofer, y devolver a pendiente los retirados cuando
//! una reasignación obliga a re-verificar.

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Cantidad de paquetes pendientes de un cliente. Se recalcula en cada
/// creación de asignación; nunca se copia de un snapshot anterior.
pub async fn pending_count(conn: &mut PgConnection, client_id: Uuid) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM packages WHERE client_id = $1 AND status = 'PENDIENTE'",
    )
    .bind(client_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Marcar los paquetes pendientes del cliente como retirados por el chofer
pub async fn mark_picked_up(
    conn: &mut PgConnection,
    client_id: Uuid,
    driver_id: Uuid,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE packages
        SET status = 'RETIRADO', picked_up_by = $2, picked_up_at = $3
        WHERE client_id = $1 AND status = 'PENDIENTE'
        "#,
    )
    .bind(client_id)
    .bind(driver_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Devolver a pendiente los paquetes ya retirados del cliente. El chofer
/// nuevo debe verificarlos físicamente de nuevo tras una reasignación.
pub async fn reset_to_pending(conn: &mut PgConnection, client_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE packages
        SET status = 'PENDIENTE', picked_up_by = NULL, picked_up_at = NULL
        WHERE client_id = $1 AND status = 'RETIRADO'
        "#,
    )
    .bind(client_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
