//! DTOs del pool de colectas auto-servicio

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::RunShift;

/// Filtro del pool disponible; sin fecha se asume hoy
#[derive(Debug, Deserialize)]
pub struct AvailableParams {
    pub date: Option<NaiveDate>,
}

/// Candidato reclamable: cliente con pendientes y sin asignación viva
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AvailableClient {
    pub client_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub pending_count: i64,
}

/// Request de reclamo de un candidato por parte de un chofer
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub client_id: Uuid,
    #[serde(default)]
    pub shift: Option<RunShift>,
}

/// Reclamo exitoso
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub assignment_id: Uuid,
    pub run_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_request_shift_is_optional() {
        let req: ClaimRequest =
            serde_json::from_str(r#"{"client_id": "550e8400-e29b-41d4-a716-446655440000"}"#)
                .unwrap();
        assert_eq!(req.shift, None);

        let req: ClaimRequest = serde_json::from_str(
            r#"{"client_id": "550e8400-e29b-41d4-a716-446655440000", "shift": "MORNING"}"#,
        )
        .unwrap();
        assert_eq!(req.shift, Some(RunShift::Morning));
    }
}
