//! Leave master data, quota ledger, and request entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::approval_status::ApprovalStatus;
use crate::models::attendance::AttendanceStatus;
use crate::validation::rules::validate_reason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveCategory {
    Leave,
    Sick,
    Permit,
}

impl LeaveCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveCategory::Leave => "leave",
            LeaveCategory::Sick => "sick",
            LeaveCategory::Permit => "permit",
        }
    }

    /// Day-summary status written when a request of this category is
    /// finally approved.
    pub fn summary_status(&self) -> AttendanceStatus {
        match self {
            LeaveCategory::Leave => AttendanceStatus::Leave,
            LeaveCategory::Sick => AttendanceStatus::Sick,
            LeaveCategory::Permit => AttendanceStatus::Permit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveType {
    pub id: String,
    pub name: String,
    pub category: LeaveCategory,
    pub deducts_quota: bool,
    pub requires_file: bool,
    pub min_months_of_service: i32,
    pub default_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-year quota ledger. `remaining` is always derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveBalance {
    pub id: String,
    pub employee_id: String,
    pub leave_type_id: String,
    pub year: i32,
    pub entitlement: i32,
    pub carried_over: i32,
    pub taken: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn remaining(&self) -> i32 {
        self.entitlement + self.carried_over - self.taken
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub leave_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub reason: String,
    pub attachment: Option<String>,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn new(
        tenant_id: String,
        employee_id: String,
        leave_type_id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration_days: i32,
        reason: String,
        attachment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            employee_id,
            leave_type_id,
            start_date,
            end_date,
            duration_days,
            reason,
            attachment,
            status: ApprovalStatus::Pending,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Inclusive day count of a leave window.
pub fn leave_duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeavePayload {
    pub leave_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(custom(function = "validate_reason"))]
    pub reason: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLeavePayload {
    pub leave_type_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
    pub attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub rejection_reason: String,
}

#[derive(Debug, Serialize)]
pub struct LeaveRequestResponse {
    pub id: String,
    pub leave_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub reason: String,
    pub attachment: Option<String>,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        LeaveRequestResponse {
            id: request.id,
            leave_type_id: request.leave_type_id,
            start_date: request.start_date,
            end_date: request.end_date,
            duration_days: request.duration_days,
            reason: request.reason,
            attachment: request.attachment,
            status: request.status,
            rejection_reason: request.rejection_reason,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveBalanceResponse {
    pub leave_type_id: String,
    pub year: i32,
    pub entitlement: i32,
    pub carried_over: i32,
    pub taken: i32,
    pub remaining: i32,
}

impl From<LeaveBalance> for LeaveBalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        let remaining = balance.remaining();
        LeaveBalanceResponse {
            leave_type_id: balance.leave_type_id,
            year: balance.year,
            entitlement: balance.entitlement,
            carried_over: balance.carried_over,
            taken: balance.taken,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_category_serde_and_summary_status() {
        let c: LeaveCategory = serde_json::from_str("\"permit\"").unwrap();
        assert_eq!(c, LeaveCategory::Permit);
        assert_eq!(LeaveCategory::Sick.summary_status(), AttendanceStatus::Sick);
        assert_eq!(LeaveCategory::Leave.summary_status(), AttendanceStatus::Leave);
    }

    #[test]
    fn remaining_is_derived() {
        let now = Utc::now();
        let balance = LeaveBalance {
            id: "b".into(),
            employee_id: "e".into(),
            leave_type_id: "t".into(),
            year: 2026,
            entitlement: 12,
            carried_over: 2,
            taken: 5,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(balance.remaining(), 9);
    }

    #[test]
    fn duration_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 4, 3).unwrap();
        assert_eq!(leave_duration_days(start, end), 3);
        assert_eq!(leave_duration_days(start, start), 1);
    }
}
