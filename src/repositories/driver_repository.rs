//! Lecturas del directorio de choferes

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::Driver;
use crate::utils::errors::AppError;

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Driver>, AppError> {
    let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(driver)
}
