use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::shift::{Shift, UpdateShiftPayload};

const SELECT_COLUMNS: &str = "id, name, is_day_off, is_flexible, start_time, end_time, \
     daily_target_minutes, break_duration_minutes, late_tolerance_minutes, created_at, updated_at";

pub async fn find_by_id(db: &PgPool, id: &str) -> Result<Option<Shift>, AppError> {
    let query = format!("SELECT {} FROM shifts WHERE id = $1", SELECT_COLUMNS);
    let shift = sqlx::query_as::<_, Shift>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(shift)
}

pub async fn list_all(db: &PgPool) -> Result<Vec<Shift>, AppError> {
    let query = format!("SELECT {} FROM shifts ORDER BY name", SELECT_COLUMNS);
    let shifts = sqlx::query_as::<_, Shift>(&query).fetch_all(db).await?;
    Ok(shifts)
}

/// A shift is locked once a live assignment's pattern references it or any
/// attendance summary snapshotted it. Locked shifts are immutable so that
/// historical reports stay correct.
pub async fn is_locked(db: &PgPool, shift_id: &str) -> Result<bool, AppError> {
    let assigned: bool = sqlx::query_scalar(
        "SELECT EXISTS ( \
            SELECT 1 FROM schedule_pattern_details d \
            JOIN employee_schedule_assignments a \
              ON a.schedule_pattern_id = d.schedule_pattern_id \
            WHERE d.shift_id = $1)",
    )
    .bind(shift_id)
    .fetch_one(db)
    .await?;

    if assigned {
        return Ok(true);
    }

    let has_history: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM attendance_summaries WHERE shift_id = $1)")
            .bind(shift_id)
            .fetch_one(db)
            .await?;

    Ok(has_history)
}

pub async fn update(db: &PgPool, current: &Shift, payload: &UpdateShiftPayload) -> Result<Shift, AppError> {
    let query = format!(
        "UPDATE shifts SET name = $2, is_day_off = $3, is_flexible = $4, start_time = $5, \
         end_time = $6, daily_target_minutes = $7, break_duration_minutes = $8, \
         late_tolerance_minutes = $9, updated_at = $10 WHERE id = $1 RETURNING {}",
        SELECT_COLUMNS
    );
    let shift = sqlx::query_as::<_, Shift>(&query)
        .bind(&current.id)
        .bind(payload.name.as_ref().unwrap_or(&current.name))
        .bind(payload.is_day_off.unwrap_or(current.is_day_off))
        .bind(payload.is_flexible.unwrap_or(current.is_flexible))
        .bind(payload.start_time.or(current.start_time))
        .bind(payload.end_time.or(current.end_time))
        .bind(payload.daily_target_minutes.or(current.daily_target_minutes))
        .bind(payload.break_duration_minutes.unwrap_or(current.break_duration_minutes))
        .bind(payload.late_tolerance_minutes.unwrap_or(current.late_tolerance_minutes))
        .bind(Utc::now())
        .fetch_one(db)
        .await?;
    Ok(shift)
}

pub async fn delete(db: &PgPool, shift_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM shifts WHERE id = $1")
        .bind(shift_id)
        .execute(db)
        .await?;
    Ok(())
}
