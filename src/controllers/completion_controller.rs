//! Bridge de finalización legado
//!
//! El flujo /complete consulta primero el tipo deprecado de eventos de
//! asignación, porque hay asignaciones en vuelo anteriores al ledger de
//! planillas. Si no hay evento abierto, cae al ledger. Si ninguno de los
//! dos sistemas tiene un registro abierto, devuelve not-found en vez de
//! crear uno silenciosamente.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::completion_dto::{CompleteRequest, CompleteResponse, CompletionSource};
use crate::models::AssignmentStatus;
use crate::repositories::{
    assignment_repository, legacy_event_repository, package_repository, run_repository,
};
use crate::services::legacy_sync;
use crate::utils::errors::AppError;

pub struct CompletionController {
    pool: PgPool,
}

impl CompletionController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn complete(
        &self,
        driver_id: Uuid,
        request: CompleteRequest,
    ) -> Result<CompleteResponse, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        // Primero el sistema viejo: eventos abiertos anteriores al ledger.
        // Nunca se migran; se completan donde están.
        if let Some(event) =
            legacy_event_repository::find_open(&mut tx, request.client_id, driver_id).await?
        {
            legacy_event_repository::complete(&mut tx, event.id, request.packages_picked_up)
                .await?;
            legacy_sync::clear_mirror(&mut tx, request.client_id).await?;

            tx.commit().await?;

            return Ok(CompleteResponse {
                source: CompletionSource::LegacyEvent,
                record_id: event.id,
                packages_picked_up: request.packages_picked_up,
            });
        }

        // Fallback al ledger, deliberadamente sin matchear fecha: tolera
        // el corrimiento de día entre crear la planilla y cerrar el retiro.
        if let Some(assignment) = assignment_repository::find_open_for_driver_client(
            &mut tx,
            request.client_id,
            driver_id,
        )
        .await?
        {
            assignment_repository::update_status(
                &mut tx,
                assignment.id,
                AssignmentStatus::Retirado,
                Some(request.packages_picked_up),
            )
            .await?;

            let run = run_repository::find_by_id(&mut tx, assignment.run_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Planilla '{}' no encontrada", assignment.run_id))
                })?;

            package_repository::mark_picked_up(&mut tx, request.client_id, run.driver_id).await?;
            legacy_sync::clear_mirror(&mut tx, request.client_id).await?;

            tx.commit().await?;

            return Ok(CompleteResponse {
                source: CompletionSource::Ledger,
                record_id: assignment.id,
                packages_picked_up: request.packages_picked_up,
            });
        }

        Err(AppError::NotFound(format!(
            "No hay retiro abierto para el cliente '{}' y el chofer '{}'",
            request.client_id, driver_id
        )))
    }
}
