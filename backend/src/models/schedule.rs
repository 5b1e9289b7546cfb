//! Recurring schedule patterns and their per-employee bindings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchedulePattern {
    pub id: String,
    pub name: String,
    pub cycle_length_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One slot of a pattern cycle. `shift_id = NULL` is an off day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchedulePatternDetail {
    pub id: String,
    pub schedule_pattern_id: String,
    pub day_index: i32,
    pub shift_id: Option<String>,
}

/// Binds an employee to a pattern from `effective_date` onward. Multiple
/// rows form the assignment history; the latest effective row wins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleAssignment {
    pub id: String,
    pub employee_id: String,
    pub schedule_pattern_id: String,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-date exception. Takes precedence over any assignment; a NULL shift
/// forces the day off.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleOverride {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
