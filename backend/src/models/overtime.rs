use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::approval_status::ApprovalStatus;
use crate::validation::rules::validate_reason;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OvertimeRequest {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub reason: String,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OvertimeRequest {
    pub fn new(
        tenant_id: String,
        employee_id: String,
        date: NaiveDate,
        duration_minutes: i32,
        reason: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            employee_id,
            date,
            duration_minutes,
            reason,
            status: ApprovalStatus::Pending,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOvertimePayload {
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(custom(function = "validate_reason"))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct OvertimeRequestResponse {
    pub id: String,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub reason: String,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OvertimeRequest> for OvertimeRequestResponse {
    fn from(request: OvertimeRequest) -> Self {
        OvertimeRequestResponse {
            id: request.id,
            date: request.date,
            duration_minutes: request.duration_minutes,
            reason: request.reason,
            status: request.status,
            rejection_reason: request.rejection_reason,
            created_at: request.created_at,
        }
    }
}
