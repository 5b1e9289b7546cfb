use sqlx::PgPool;

use crate::error::AppError;
use crate::models::work_location::WorkLocation;

const SELECT_COLUMNS: &str =
    "id, name, latitude, longitude, radius_meters, timezone, created_at, updated_at";

pub async fn find_by_id(db: &PgPool, id: &str) -> Result<Option<WorkLocation>, AppError> {
    let query = format!("SELECT {} FROM work_locations WHERE id = $1", SELECT_COLUMNS);
    let location = sqlx::query_as::<_, WorkLocation>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(location)
}

/// All known locations, ordered by id so roaming geofence matching stays
/// deterministic.
pub async fn list_all_ordered(db: &PgPool) -> Result<Vec<WorkLocation>, AppError> {
    let query = format!("SELECT {} FROM work_locations ORDER BY id", SELECT_COLUMNS);
    let locations = sqlx::query_as::<_, WorkLocation>(&query)
        .fetch_all(db)
        .await?;
    Ok(locations)
}
