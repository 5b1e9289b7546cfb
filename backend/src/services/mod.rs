pub mod approval;
pub mod geofence;
pub mod punch;
pub mod reconciliation;
pub mod schedule_resolver;

use chrono_tz::Tz;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::models::employee::Employee;
use crate::repositories::work_location;
use crate::utils::time::parse_timezone;

/// Timezone governing an employee's schedule arithmetic: their work
/// location's zone when set, the configured fallback otherwise.
pub async fn employee_timezone(
    db: &PgPool,
    employee: &Employee,
    config: &Config,
) -> Result<Tz, AppError> {
    let tz = match &employee.work_location_id {
        Some(location_id) => match work_location::find_by_id(db, location_id).await? {
            Some(location) => parse_timezone(Some(&location.timezone), config.time_zone),
            None => config.time_zone,
        },
        None => config.time_zone,
    };
    Ok(tz)
}
