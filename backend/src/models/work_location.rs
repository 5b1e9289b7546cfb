use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A geofenced office or site. `radius_meters` bounds valid punches and
/// `timezone` drives all schedule arithmetic for employees stationed here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
