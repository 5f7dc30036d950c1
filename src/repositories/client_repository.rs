//! Lecturas del directorio de clientes

use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::colecta_dto::AvailableClient;
use crate::models::Client;
use crate::utils::errors::AppError;

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Client>, AppError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(client)
}

/// Pool de colectas: clientes con paquetes pendientes y sin asignación
/// viva en la fecha dada. La lectura corre fuera de transacción; el
/// reclamo re-valida el guard adentro de la suya.
pub async fn list_claimable(
    conn: &mut PgConnection,
    date: NaiveDate,
) -> Result<Vec<AvailableClient>, AppError> {
    let clients = sqlx::query_as::<_, AvailableClient>(
        r#"
        SELECT c.id AS client_id, c.name, c.address, c.phone, COUNT(p.id) AS pending_count
        FROM clients c
        JOIN packages p ON p.client_id = c.id AND p.status = 'PENDIENTE'
        WHERE NOT EXISTS (
            SELECT 1
            FROM pickup_assignments a
            JOIN delivery_runs r ON r.id = a.run_id
            WHERE a.client_id = c.id
              AND r.run_date = $1
              AND a.status <> 'NO_RETIRADO'
        )
        GROUP BY c.id, c.name, c.address, c.phone
        ORDER BY c.name
        "#,
    )
    .bind(date)
    .fetch_all(&mut *conn)
    .await?;

    Ok(clients)
}
