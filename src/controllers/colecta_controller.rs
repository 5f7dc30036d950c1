//! Controller del pool de colectas auto-servicio
//!
//! Los choferes reclaman clientes no asignados de un pool compartido,
//! compitiendo entre sí. Internamente es el mismo Run Registry +
//! Assignment Ledger + Conflict Guard invocado desde el path del chofer.
//! Entre listar y reclamar queda una ventana de carrera tolerada: el
//! guard se re-valida dentro de la transacción del insert y el perdedor
//! recibe un conflicto con el nombre del ganador, para reintentar sobre
//! un listado fresco.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::colecta_dto::{AvailableClient, ClaimRequest, ClaimResponse};
use crate::repositories::{
    assignment_repository, client_repository, package_repository, run_repository,
};
use crate::services::{conflict_guard, legacy_sync};
use crate::utils::errors::AppError;

pub struct ColectaController {
    pool: PgPool,
}

impl ColectaController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Candidatos reclamables: pendientes > 0 y sin asignación viva en la fecha
    pub async fn list_available(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AvailableClient>, AppError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());

        let mut conn = self.pool.acquire().await?;
        client_repository::list_claimable(&mut conn, date).await
    }

    /// Reclamar un candidato para el chofer autenticado. Gana el primer
    /// reclamo que commitea; los demás reciben ConflictError.
    pub async fn claim(
        &self,
        driver_id: Uuid,
        request: ClaimRequest,
    ) -> Result<ClaimResponse, AppError> {
        let today = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let client = client_repository::find_by_id(&mut tx, request.client_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Cliente '{}' no encontrado", request.client_id))
            })?;

        if let Some(conflict) = conflict_guard::check(&mut tx, client.id, today, None).await? {
            return Err(conflict.into_error(today));
        }

        let pending = package_repository::pending_count(&mut tx, client.id).await?;
        if pending == 0 {
            return Err(AppError::BadRequest(format!(
                "El cliente '{}' no tiene paquetes pendientes",
                client.id
            )));
        }

        let run = run_repository::find_or_create(
            &mut tx,
            driver_id,
            today,
            request.shift.unwrap_or_default(),
        )
        .await?;

        // El guard con exclude ya cubrió otras planillas; si el cliente
        // quedó en esta misma planilla el reclamo es idempotente.
        if let Some(existing) =
            assignment_repository::find_in_run_for_client(&mut tx, run.id, client.id).await?
        {
            tx.commit().await?;
            return Ok(ClaimResponse {
                assignment_id: existing.id,
                run_id: run.id,
            });
        }

        let assignment = assignment_repository::insert(
            &mut tx,
            run.id,
            client.id,
            client.pickup_cost,
            pending as i32,
            None,
        )
        .await?;

        legacy_sync::mirror_live(&mut tx, client.id, driver_id).await?;
        run_repository::mark_uninformed(&mut tx, run.id).await?;

        tx.commit().await?;

        Ok(ClaimResponse {
            assignment_id: assignment.id,
            run_id: run.id,
        })
    }
}
