//! Schedule lookup seam for the resolver.
//!
//! The trait exists so resolution precedence can be exercised against an
//! in-memory mock; the Postgres implementation is the production source.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::schedule::{ScheduleAssignment, ScheduleOverride};
use crate::models::shift::Shift;

const SHIFT_COLUMNS: &str = "id, name, is_day_off, is_flexible, start_time, end_time, \
     daily_target_minutes, break_duration_minutes, late_tolerance_minutes, created_at, updated_at";

const OVERRIDE_COLUMNS: &str = "id, employee_id, date, shift_id, created_at, updated_at";

const ASSIGNMENT_COLUMNS: &str =
    "id, employee_id, schedule_pattern_id, effective_date, created_at, updated_at";

/// The assignment that currently governs an employee, with its pattern's
/// cycle length pre-joined.
#[derive(Debug, Clone)]
pub struct ActiveAssignment {
    pub assignment: ScheduleAssignment,
    pub cycle_length_days: i32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Per-date exception for the employee, if any.
    async fn find_override(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ScheduleOverride>, AppError>;

    /// The assignment with the greatest `effective_date <= date`.
    async fn find_active_assignment(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ActiveAssignment>, AppError>;

    /// The shift a pattern rosters at the given cycle slot. `None` covers a
    /// missing detail row and an explicit NULL shift alike (both mean off).
    async fn find_pattern_shift(
        &self,
        pattern_id: &str,
        day_index: i32,
    ) -> Result<Option<Shift>, AppError>;

    async fn find_shift(&self, shift_id: &str) -> Result<Option<Shift>, AppError>;
}

pub struct PgScheduleSource {
    pool: PgPool,
}

impl PgScheduleSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleSource for PgScheduleSource {
    async fn find_override(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ScheduleOverride>, AppError> {
        let query = format!(
            "SELECT {} FROM schedule_overrides WHERE employee_id = $1 AND date = $2",
            OVERRIDE_COLUMNS
        );
        let row = sqlx::query_as::<_, ScheduleOverride>(&query)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_active_assignment(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ActiveAssignment>, AppError> {
        let query = format!(
            "SELECT {}, p.cycle_length_days FROM employee_schedule_assignments a \
             JOIN schedule_patterns p ON p.id = a.schedule_pattern_id \
             WHERE a.employee_id = $1 AND a.effective_date <= $2 \
             ORDER BY a.effective_date DESC LIMIT 1",
            ASSIGNMENT_COLUMNS
                .split(", ")
                .map(|c| format!("a.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| ActiveAssignment {
            assignment: ScheduleAssignment {
                id: r.id,
                employee_id: r.employee_id,
                schedule_pattern_id: r.schedule_pattern_id,
                effective_date: r.effective_date,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            cycle_length_days: r.cycle_length_days,
        }))
    }

    async fn find_pattern_shift(
        &self,
        pattern_id: &str,
        day_index: i32,
    ) -> Result<Option<Shift>, AppError> {
        let query = format!(
            "SELECT {} FROM shifts s \
             JOIN schedule_pattern_details d ON d.shift_id = s.id \
             WHERE d.schedule_pattern_id = $1 AND d.day_index = $2",
            SHIFT_COLUMNS
                .split(", ")
                .map(|c| format!("s.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let shift = sqlx::query_as::<_, Shift>(&query)
            .bind(pattern_id)
            .bind(day_index)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shift)
    }

    async fn find_shift(&self, shift_id: &str) -> Result<Option<Shift>, AppError> {
        let query = format!("SELECT {} FROM shifts WHERE id = $1", SHIFT_COLUMNS);
        let shift = sqlx::query_as::<_, Shift>(&query)
            .bind(shift_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shift)
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: String,
    employee_id: String,
    schedule_pattern_id: String,
    effective_date: NaiveDate,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    cycle_length_days: i32,
}
