use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: String,
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub full_name: String,
    pub employment_status: EmploymentStatus,
    pub work_location_id: Option<String>,
    pub is_flexible_location: bool,
    pub registered_device_id: Option<String>,
    pub attendance_required: bool,
    /// Direct superior; absent at the top of the hierarchy.
    pub supervisor_id: Option<String>,
    pub manager_id: Option<String>,
    pub is_hr: bool,
    pub join_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    Resigned,
    Terminated,
    Retired,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::Resigned => "resigned",
            EmploymentStatus::Terminated => "terminated",
            EmploymentStatus::Retired => "retired",
        }
    }
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_status_serde_snake_case() {
        let s: EmploymentStatus = serde_json::from_str("\"resigned\"").unwrap();
        assert_eq!(s, EmploymentStatus::Resigned);
        let v = serde_json::to_value(EmploymentStatus::Active).unwrap();
        assert_eq!(v, serde_json::json!("active"));
    }
}
