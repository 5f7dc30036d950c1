//! Controller de planillas y asignaciones de retiro
//!
//! Orquesta el Run Registry, el Assignment Ledger, el Conflict Guard y el
//! Legacy Sync. Toda operación que toca más de un registro corre dentro de
//! una única transacción; un fallo en cualquier paso revierte la operación
//! completa. Las operaciones por lotes (alta múltiple, copy-forward)
//! saltean los items en conflicto y devuelven un resumen de éxito parcial
//! en vez de abortar el lote entero.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::dto::pickup_dto::{
    AppendAssignmentsRequest, AssignmentInput, CopyRunRequest, CopyRunResponse, CopyRunSummary,
    CreateRunRequest, CreateRunResponse, RunResponse, SkippedAssignment, UpdateAssignmentRequest,
    UpdateStatusRequest,
};
use crate::middleware::auth::{AuthenticatedUser, UserRole};
use crate::models::{AssignmentStatus, DeliveryRun, PickupAssignment, RunWithDriver};
use crate::repositories::{
    assignment_repository, client_repository, driver_repository, package_repository,
    run_repository,
};
use crate::services::{conflict_guard, legacy_sync};
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::ensure_non_negative;

pub struct PickupController {
    pool: PgPool,
}

impl PickupController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Listar planillas con asignaciones anidadas en un rango de fechas
    pub async fn list_runs(
        &self,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<Vec<RunResponse>, AppError> {
        if start_date > end_date {
            return Err(validation_error("start_date", "must not be after end_date"));
        }

        let mut conn = self.pool.acquire().await?;
        let runs = run_repository::list_range(&mut conn, start_date, end_date).await?;

        build_run_responses(&mut conn, runs).await
    }

    /// Planillas del chofer para hoy
    pub async fn driver_today(&self, driver_id: Uuid) -> Result<Vec<RunResponse>, AppError> {
        let today = Utc::now().date_naive();

        let mut conn = self.pool.acquire().await?;
        let runs = run_repository::list_for_driver_on(&mut conn, driver_id, today).await?;

        build_run_responses(&mut conn, runs).await
    }

    /// Crear (o extender) la planilla de un chofer con un lote de asignaciones
    pub async fn create_run(&self, request: CreateRunRequest) -> Result<CreateRunResponse, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        driver_repository::find_by_id(&mut tx, request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chofer '{}' no encontrado", request.driver_id)))?;

        let run = run_repository::find_or_create(
            &mut tx,
            request.driver_id,
            request.date,
            request.shift.unwrap_or_default(),
        )
        .await?;

        let (created, skipped) = insert_batch(&mut tx, &run, &request.assignments).await?;

        if !created.is_empty() {
            run_repository::mark_uninformed(&mut tx, run.id).await?;
        }

        tx.commit().await?;

        Ok(CreateRunResponse {
            run_id: run.id,
            created,
            skipped,
        })
    }

    /// Agregar asignaciones a una planilla existente
    pub async fn append_assignments(
        &self,
        run_id: Uuid,
        request: AppendAssignmentsRequest,
    ) -> Result<CreateRunResponse, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let run = run_repository::find_by_id(&mut tx, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Planilla '{}' no encontrada", run_id)))?;

        let (created, skipped) = insert_batch(&mut tx, &run, &request.assignments).await?;

        if !created.is_empty() {
            run_repository::mark_uninformed(&mut tx, run.id).await?;
        }

        tx.commit().await?;

        Ok(CreateRunResponse {
            run_id: run.id,
            created,
            skipped,
        })
    }

    /// Copy-forward de una planilla hacia fechas futuras. Los clientes en
    /// conflicto o ya copiados se saltean; el resultado esperado de un
    /// lote grande es una copia parcial exitosa.
    pub async fn copy_run(
        &self,
        run_id: Uuid,
        request: CopyRunRequest,
    ) -> Result<CopyRunResponse, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let source = run_repository::find_by_id(&mut tx, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Planilla '{}' no encontrada", run_id)))?;

        let all = assignment_repository::list_for_run(&mut tx, source.id).await?;
        let selected: Vec<PickupAssignment> = if request.assignment_ids.is_empty() {
            all
        } else {
            all.into_iter()
                .filter(|a| request.assignment_ids.contains(&a.id))
                .collect()
        };

        if selected.is_empty() {
            return Err(validation_error(
                "assignment_ids",
                "no source assignments matched",
            ));
        }

        let mut copies = Vec::with_capacity(request.dates.len());

        for target_date in &request.dates {
            let target = run_repository::find_or_create(
                &mut tx,
                source.driver_id,
                *target_date,
                source.shift,
            )
            .await?;

            let mut created = Vec::new();
            let mut skipped = Vec::new();

            for assignment in &selected {
                if assignment_repository::find_in_run_for_client(
                    &mut tx,
                    target.id,
                    assignment.client_id,
                )
                .await?
                .is_some()
                {
                    skipped.push(SkippedAssignment {
                        client_id: assignment.client_id,
                        reason: "el cliente ya está en la planilla destino".to_string(),
                    });
                    continue;
                }

                if let Some(conflict) =
                    conflict_guard::check(&mut tx, assignment.client_id, *target_date, Some(target.id))
                        .await?
                {
                    skipped.push(SkippedAssignment {
                        client_id: assignment.client_id,
                        reason: format!(
                            "ya asignado al chofer {} (turno {})",
                            conflict.driver_name, conflict.shift
                        ),
                    });
                    continue;
                }

                // El conteo de pendientes se recalcula: entre la planilla
                // origen y la fecha destino pudo cambiar.
                let pending =
                    package_repository::pending_count(&mut tx, assignment.client_id).await? as i32;

                let copy = assignment_repository::insert(
                    &mut tx,
                    target.id,
                    assignment.client_id,
                    assignment.cost,
                    pending,
                    assignment.notes.clone(),
                )
                .await?;

                legacy_sync::mirror_live(&mut tx, assignment.client_id, source.driver_id).await?;
                created.push(copy.id);
            }

            if !created.is_empty() {
                run_repository::mark_uninformed(&mut tx, target.id).await?;
            }

            copies.push(CopyRunSummary {
                target_date: *target_date,
                run_id: target.id,
                created,
                skipped,
            });
        }

        tx.commit().await?;

        Ok(CopyRunResponse { copies })
    }

    /// El chofer marca progreso sobre su asignación
    pub async fn update_status(
        &self,
        assignment_id: Uuid,
        caller: &AuthenticatedUser,
        request: UpdateStatusRequest,
    ) -> Result<(), AppError> {
        request
            .status
            .validate_picked_pairing(request.packages_picked_up)
            .map_err(|msg| validation_error("packages_picked_up", msg))?;

        if let Some(picked) = request.packages_picked_up {
            ensure_non_negative("packages_picked_up", picked)?;
        }

        let mut tx = self.pool.begin().await?;

        let assignment = assignment_repository::find_by_id(&mut tx, assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Asignación '{}' no encontrada", assignment_id))
            })?;

        let run = run_repository::find_by_id(&mut tx, assignment.run_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Planilla '{}' no encontrada", assignment.run_id))
            })?;

        if caller.role == UserRole::Driver && run.driver_id != caller.user_id {
            return Err(AppError::Forbidden(
                "La asignación pertenece a otro chofer".to_string(),
            ));
        }

        assignment_repository::update_status(
            &mut tx,
            assignment.id,
            request.status,
            request.packages_picked_up,
        )
        .await?;

        match request.status {
            AssignmentStatus::Retirado => {
                package_repository::mark_picked_up(&mut tx, assignment.client_id, run.driver_id)
                    .await?;
                legacy_sync::clear_mirror(&mut tx, assignment.client_id).await?;
            }
            AssignmentStatus::NoRetirado => {
                legacy_sync::clear_mirror(&mut tx, assignment.client_id).await?;
            }
            AssignmentStatus::Asignado | AssignmentStatus::EnRuta => {
                legacy_sync::mirror_live(&mut tx, assignment.client_id, run.driver_id).await?;
            }
        }

        tx.commit().await?;

        Ok(())
    }

    /// Edición administrativa: costo y/o reasignación a otro chofer
    pub async fn update_assignment(
        &self,
        assignment_id: Uuid,
        request: UpdateAssignmentRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        if request.cost.is_none() && request.driver_id.is_none() {
            return Err(validation_error("body", "cost or driver_id is required"));
        }

        let mut tx = self.pool.begin().await?;

        let assignment = assignment_repository::find_by_id(&mut tx, assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Asignación '{}' no encontrada", assignment_id))
            })?;

        if let Some(cost) = request.cost {
            assignment_repository::update_cost(&mut tx, assignment.id, cost).await?;
        }

        if let Some(new_driver_id) = request.driver_id {
            reassign_one(&mut tx, &assignment, new_driver_id).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Reasignación de la planilla completa a otro chofer
    pub async fn reassign_run(
        &self,
        run_id: Uuid,
        new_driver_id: Uuid,
    ) -> Result<RunResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let source = run_repository::find_by_id(&mut tx, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Planilla '{}' no encontrada", run_id)))?;

        driver_repository::find_by_id(&mut tx, new_driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chofer '{}' no encontrado", new_driver_id)))?;

        if source.driver_id == new_driver_id {
            let response = load_run_response(&mut tx, source.id).await?;
            tx.commit().await?;
            return Ok(response);
        }

        let assignments = assignment_repository::list_for_run(&mut tx, source.id).await?;

        // El chofer nuevo debe re-verificar: los paquetes ya retirados
        // vuelven a pendiente y el espejo legado pasa a apuntarle.
        for assignment in &assignments {
            package_repository::reset_to_pending(&mut tx, assignment.client_id).await?;
            legacy_sync::mirror_live(&mut tx, assignment.client_id, new_driver_id).await?;
        }

        let result_run_id = match run_repository::find_by_triple(
            &mut tx,
            new_driver_id,
            source.run_date,
            source.shift,
        )
        .await?
        {
            // Merge: el chofer destino ya tiene planilla para esa fecha/turno
            Some(target) => {
                assignment_repository::move_all_to_run(&mut tx, source.id, target.id).await?;
                run_repository::delete(&mut tx, source.id).await?;
                run_repository::mark_uninformed(&mut tx, target.id).await?;
                target.id
            }
            // Reapuntado barato: la planilla cambia de chofer sin mover filas
            None => {
                run_repository::repoint_driver(&mut tx, source.id, new_driver_id).await?;
                assignment_repository::reset_all_for_run(&mut tx, source.id).await?;
                run_repository::mark_uninformed(&mut tx, source.id).await?;
                source.id
            }
        };

        let response = load_run_response(&mut tx, result_run_id).await?;

        tx.commit().await?;

        Ok(response)
    }

    /// Marcar al chofer como notificado de su planilla
    pub async fn mark_informed(&self, run_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;

        let updated = run_repository::mark_informed(&mut conn, run_id).await?;
        if !updated {
            return Err(AppError::NotFound(format!(
                "Planilla '{}' no encontrada",
                run_id
            )));
        }

        Ok(())
    }

    /// Baja administrativa de una asignación
    pub async fn delete_assignment(&self, assignment_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let assignment = assignment_repository::find_by_id(&mut tx, assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Asignación '{}' no encontrada", assignment_id))
            })?;

        legacy_sync::clear_mirror(&mut tx, assignment.client_id).await?;
        assignment_repository::delete(&mut tx, assignment.id).await?;

        let run_deleted = run_repository::delete_if_empty(&mut tx, assignment.run_id).await?;
        if !run_deleted {
            run_repository::mark_uninformed(&mut tx, assignment.run_id).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Baja administrativa de una planilla completa
    pub async fn delete_run(&self, run_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let run = run_repository::find_by_id(&mut tx, run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Planilla '{}' no encontrada", run_id)))?;

        let assignments = assignment_repository::list_for_run(&mut tx, run.id).await?;
        for assignment in &assignments {
            legacy_sync::clear_mirror(&mut tx, assignment.client_id).await?;
        }

        assignment_repository::delete_for_run(&mut tx, run.id).await?;
        run_repository::delete(&mut tx, run.id).await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Reasignación de una sola asignación: la planilla destino se resuelve
/// con la fecha/turno de la planilla origen y el chofer nuevo.
async fn reassign_one(
    conn: &mut PgConnection,
    assignment: &PickupAssignment,
    new_driver_id: Uuid,
) -> Result<(), AppError> {
    let source_run = run_repository::find_by_id(&mut *conn, assignment.run_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Planilla '{}' no encontrada", assignment.run_id))
        })?;

    driver_repository::find_by_id(&mut *conn, new_driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chofer '{}' no encontrado", new_driver_id)))?;

    if source_run.driver_id == new_driver_id {
        return Ok(());
    }

    if let Some(conflict) = conflict_guard::check(
        &mut *conn,
        assignment.client_id,
        source_run.run_date,
        Some(source_run.id),
    )
    .await?
    {
        return Err(conflict.into_error(source_run.run_date));
    }

    let target = run_repository::find_or_create(
        &mut *conn,
        new_driver_id,
        source_run.run_date,
        source_run.shift,
    )
    .await?;

    package_repository::reset_to_pending(&mut *conn, assignment.client_id).await?;
    assignment_repository::move_to_run(&mut *conn, assignment.id, target.id).await?;
    legacy_sync::mirror_live(&mut *conn, assignment.client_id, new_driver_id).await?;

    let source_deleted = run_repository::delete_if_empty(&mut *conn, source_run.id).await?;
    if !source_deleted {
        run_repository::mark_uninformed(&mut *conn, source_run.id).await?;
    }
    run_repository::mark_uninformed(&mut *conn, target.id).await?;

    Ok(())
}

/// Lote de alta de asignaciones sobre una planilla. Devuelve creados y
/// salteados; los conflictos por item no abortan el lote.
async fn insert_batch(
    conn: &mut PgConnection,
    run: &DeliveryRun,
    items: &[AssignmentInput],
) -> Result<(Vec<Uuid>, Vec<SkippedAssignment>), AppError> {
    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for item in items {
        let client = match client_repository::find_by_id(&mut *conn, item.client_id).await? {
            Some(client) => client,
            None => {
                skipped.push(SkippedAssignment {
                    client_id: item.client_id,
                    reason: "cliente inexistente".to_string(),
                });
                continue;
            }
        };

        // Idempotencia dentro de la misma planilla: no se duplica
        if assignment_repository::find_in_run_for_client(&mut *conn, run.id, client.id)
            .await?
            .is_some()
        {
            skipped.push(SkippedAssignment {
                client_id: client.id,
                reason: "el cliente ya está en esta planilla".to_string(),
            });
            continue;
        }

        if let Some(conflict) =
            conflict_guard::check(&mut *conn, client.id, run.run_date, Some(run.id)).await?
        {
            skipped.push(SkippedAssignment {
                client_id: client.id,
                reason: format!(
                    "ya asignado al chofer {} (turno {})",
                    conflict.driver_name, conflict.shift
                ),
            });
            continue;
        }

        let cost = item.cost.unwrap_or(client.pickup_cost);
        ensure_non_negative("cost", cost)?;

        let pending = package_repository::pending_count(&mut *conn, client.id).await? as i32;

        let assignment =
            assignment_repository::insert(&mut *conn, run.id, client.id, cost, pending, item.notes.clone())
                .await?;

        legacy_sync::mirror_live(&mut *conn, client.id, run.driver_id).await?;
        created.push(assignment.id);
    }

    Ok((created, skipped))
}

/// Armar la respuesta anidada de una planilla
async fn load_run_response(conn: &mut PgConnection, run_id: Uuid) -> Result<RunResponse, AppError> {
    let run = run_repository::find_with_driver(&mut *conn, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Planilla '{}' no encontrada", run_id)))?;

    let assignments =
        assignment_repository::list_for_runs_with_clients(&mut *conn, &[run.id]).await?;

    Ok(RunResponse::from_parts(run, assignments))
}

/// Agrupar asignaciones por planilla y armar las respuestas anidadas
async fn build_run_responses(
    conn: &mut PgConnection,
    runs: Vec<RunWithDriver>,
) -> Result<Vec<RunResponse>, AppError> {
    let run_ids: Vec<Uuid> = runs.iter().map(|r| r.id).collect();
    let assignments =
        assignment_repository::list_for_runs_with_clients(&mut *conn, &run_ids).await?;

    let mut by_run: HashMap<Uuid, Vec<_>> = HashMap::new();
    for assignment in assignments {
        by_run.entry(assignment.run_id).or_default().push(assignment);
    }

    Ok(runs
        .into_iter()
        .map(|run| {
            let assignments = by_run.remove(&run.id).unwrap_or_default();
            RunResponse::from_parts(run, assignments)
        })
        .collect())
}
