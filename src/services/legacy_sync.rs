//! Legacy Sync: write-through del puntero legado en el cliente
//!
//! Durante la ventana de migración conviven dos representaciones de
//! "quién retira a este cliente": el ledger normalizado y el campo
//! `clients.assigned_driver_id` que todavía leen las vistas de chofer.
//! Este adaptador es el único escritor del espejo y corre siempre dentro
//! de la misma transacción que la mutación del ledger: se setea cuando una
//! asignación queda viva y se limpia cuando se completa, se borra o se
//! reemplaza.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Apuntar el espejo del cliente al chofer de su asignación viva
pub async fn mirror_live(
    conn: &mut PgConnection,
    client_id: Uuid,
    driver_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("UPDATE clients SET assigned_driver_id = $2 WHERE id = $1")
        .bind(client_id)
        .bind(driver_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Limpiar el espejo cuando la asignación termina o desaparece
pub async fn clear_mirror(conn: &mut PgConnection, client_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE clients SET assigned_driver_id = NULL WHERE id = $1")
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
