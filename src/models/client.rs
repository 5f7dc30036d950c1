//! Read model del directorio de clientes
//!
//! El directorio es un colaborador externo; el coordinador solo lee estas
//! filas, salvo el puntero legado `assigned_driver_id` que mantiene
//! `services::legacy_sync`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub pickup_cost: i32,
    pub assigned_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
