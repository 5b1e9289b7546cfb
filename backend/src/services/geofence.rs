//! Geofence evaluation for punches.
//!
//! Fixed-location employees must punch inside their assigned radius.
//! Roaming employees are matched against every known location (ascending id,
//! first hit wins) but are never blocked; an unmatched punch keeps the
//! nominal location, which may be none.

use serde_json::json;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::employee::Employee;
use crate::models::work_location::WorkLocation;
use crate::repositories::work_location;
use crate::utils::geo::haversine_distance;

/// Boundary-inclusive containment check.
pub fn within_radius(latitude: f64, longitude: f64, location: &WorkLocation) -> bool {
    let distance = haversine_distance(latitude, longitude, location.latitude, location.longitude);
    distance <= location.radius_meters
}

/// Enforces the fixed-location fence, reporting the measured distance on
/// rejection.
pub fn check_fixed(latitude: f64, longitude: f64, location: &WorkLocation) -> Result<(), AppError> {
    let distance = haversine_distance(latitude, longitude, location.latitude, location.longitude);
    if distance > location.radius_meters {
        return Err(AppError::ForbiddenWithDetails(
            "Outside the allowed office range.".to_string(),
            json!({
                "distance_meters": distance.round() as i64,
                "allowed_radius_meters": location.radius_meters,
            }),
        ));
    }
    Ok(())
}

/// First location containing the punch; the slice must already be in
/// deterministic (ascending id) order.
pub fn match_roaming<'a>(
    latitude: f64,
    longitude: f64,
    locations: &'a [WorkLocation],
) -> Option<&'a WorkLocation> {
    locations
        .iter()
        .find(|location| within_radius(latitude, longitude, location))
}

/// Resolves the location a punch belongs to, enforcing the fence for
/// fixed-location employees.
pub async fn locate(
    db: &PgPool,
    employee: &Employee,
    latitude: f64,
    longitude: f64,
) -> Result<Option<String>, AppError> {
    if employee.is_flexible_location {
        let locations = work_location::list_all_ordered(db).await?;
        let matched = match_roaming(latitude, longitude, &locations)
            .map(|location| location.id.clone())
            .or_else(|| employee.work_location_id.clone());
        return Ok(matched);
    }

    let location_id = employee
        .work_location_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Work location has not been configured.".to_string()))?;
    let location = work_location::find_by_id(db, location_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Work location has not been configured.".to_string()))?;

    check_fixed(latitude, longitude, &location)?;
    Ok(Some(location.id))
}
