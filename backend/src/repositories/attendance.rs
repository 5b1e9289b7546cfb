//! Attendance summary/session data access.
//!
//! The summary upsert leans on the (tenant_id, employee_id, date) unique key
//! so concurrent first punches collapse to a single row.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::attendance::{AttendanceDetail, AttendanceStatus, AttendanceSummary};

const SUMMARY_COLUMNS: &str = "id, tenant_id, employee_id, date, schedule_id, shift_id, \
     schedule_in, schedule_out, clock_in, clock_out, clock_in_latitude, clock_in_longitude, \
     clock_in_device_id, clock_in_image, clock_out_latitude, clock_out_longitude, \
     clock_out_device_id, clock_out_image, work_location_id, late_minutes, \
     early_leave_minutes, overtime_minutes, status, created_at, updated_at";

const DETAIL_COLUMNS: &str = "id, attendance_summary_id, work_location_id, clock_in_time, \
     clock_in_latitude, clock_in_longitude, clock_in_device_id, clock_in_image, \
     clock_out_time, clock_out_latitude, clock_out_longitude, clock_out_device_id, \
     clock_out_image, created_at, updated_at";

/// Everything a punch stamps onto a summary or session.
#[derive(Debug, Clone)]
pub struct ClockStamp {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub device_id: Option<String>,
    pub image: Option<String>,
}

pub async fn find_summary(
    db: &PgPool,
    employee_id: &str,
    date: NaiveDate,
) -> Result<Option<AttendanceSummary>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance_summaries WHERE employee_id = $1 AND date = $2",
        SUMMARY_COLUMNS
    );
    let summary = sqlx::query_as::<_, AttendanceSummary>(&query)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
    Ok(summary)
}

/// Insert the seeded summary unless the day already has one, then return
/// whichever row won. Loses gracefully to a concurrent first punch.
pub async fn get_or_create_summary(
    db: &PgPool,
    seed: &AttendanceSummary,
) -> Result<AttendanceSummary, AppError> {
    sqlx::query(
        "INSERT INTO attendance_summaries (id, tenant_id, employee_id, date, schedule_id, \
         shift_id, schedule_in, schedule_out, late_minutes, early_leave_minutes, \
         overtime_minutes, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (tenant_id, employee_id, date) DO NOTHING",
    )
    .bind(&seed.id)
    .bind(&seed.tenant_id)
    .bind(&seed.employee_id)
    .bind(seed.date)
    .bind(&seed.schedule_id)
    .bind(&seed.shift_id)
    .bind(seed.schedule_in)
    .bind(seed.schedule_out)
    .bind(seed.late_minutes)
    .bind(seed.early_leave_minutes)
    .bind(seed.overtime_minutes)
    .bind(seed.status.as_str())
    .bind(seed.created_at)
    .bind(seed.updated_at)
    .execute(db)
    .await?;

    find_summary(db, &seed.employee_id, seed.date)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("summary vanished after upsert"))
        })
}

/// Creates an absence record only when the day has no row at all. Returns
/// whether a row was written, so the job stays idempotent.
pub async fn insert_summary_if_absent(
    db: &PgPool,
    seed: &AttendanceSummary,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "INSERT INTO attendance_summaries (id, tenant_id, employee_id, date, schedule_id, \
         shift_id, schedule_in, schedule_out, late_minutes, early_leave_minutes, \
         overtime_minutes, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (tenant_id, employee_id, date) DO NOTHING",
    )
    .bind(&seed.id)
    .bind(&seed.tenant_id)
    .bind(&seed.employee_id)
    .bind(seed.date)
    .bind(&seed.schedule_id)
    .bind(&seed.shift_id)
    .bind(seed.schedule_in)
    .bind(seed.schedule_out)
    .bind(seed.late_minutes)
    .bind(seed.early_leave_minutes)
    .bind(seed.overtime_minutes)
    .bind(seed.status.as_str())
    .bind(seed.created_at)
    .bind(seed.updated_at)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists_for_date(
    db: &PgPool,
    employee_id: &str,
    date: NaiveDate,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM attendance_summaries WHERE employee_id = $1 AND date = $2)",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Most recent open session of a day, if any.
pub async fn find_open_session(
    db: &PgPool,
    summary_id: &str,
) -> Result<Option<AttendanceDetail>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance_details \
         WHERE attendance_summary_id = $1 AND clock_out_time IS NULL \
         ORDER BY clock_in_time DESC LIMIT 1",
        DETAIL_COLUMNS
    );
    let detail = sqlx::query_as::<_, AttendanceDetail>(&query)
        .bind(summary_id)
        .fetch_optional(db)
        .await?;
    Ok(detail)
}

pub async fn count_sessions(db: &PgPool, summary_id: &str) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance_details WHERE attendance_summary_id = $1")
            .bind(summary_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub async fn list_sessions(
    db: &PgPool,
    summary_id: &str,
) -> Result<Vec<AttendanceDetail>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance_details WHERE attendance_summary_id = $1 \
         ORDER BY clock_in_time",
        DETAIL_COLUMNS
    );
    let details = sqlx::query_as::<_, AttendanceDetail>(&query)
        .bind(summary_id)
        .fetch_all(db)
        .await?;
    Ok(details)
}

pub async fn insert_session(db: &PgPool, detail: &AttendanceDetail) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO attendance_details (id, attendance_summary_id, work_location_id, \
         clock_in_time, clock_in_latitude, clock_in_longitude, clock_in_device_id, \
         clock_in_image, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&detail.id)
    .bind(&detail.attendance_summary_id)
    .bind(&detail.work_location_id)
    .bind(detail.clock_in_time)
    .bind(detail.clock_in_latitude)
    .bind(detail.clock_in_longitude)
    .bind(&detail.clock_in_device_id)
    .bind(&detail.clock_in_image)
    .bind(detail.created_at)
    .bind(detail.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// First session of the day stamps the summary's clock-in block and the
/// computed status/lateness.
pub async fn apply_first_clock_in(
    db: &PgPool,
    summary_id: &str,
    status: AttendanceStatus,
    late_minutes: i32,
    work_location_id: Option<&str>,
    stamp: &ClockStamp,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE attendance_summaries SET status = $2, late_minutes = $3, clock_in = $4, \
         clock_in_latitude = $5, clock_in_longitude = $6, clock_in_device_id = $7, \
         clock_in_image = $8, work_location_id = $9, clock_out = NULL, \
         clock_out_latitude = NULL, clock_out_longitude = NULL, clock_out_device_id = NULL, \
         clock_out_image = NULL, updated_at = $10 WHERE id = $1",
    )
    .bind(summary_id)
    .bind(status.as_str())
    .bind(late_minutes)
    .bind(stamp.time)
    .bind(stamp.latitude)
    .bind(stamp.longitude)
    .bind(&stamp.device_id)
    .bind(&stamp.image)
    .bind(work_location_id)
    .bind(Utc::now())
    .execute(db)
    .await?;
    Ok(())
}

/// Later sessions keep the day's status; they only invalidate the stale
/// clock-out block.
pub async fn apply_repeat_clock_in(db: &PgPool, summary_id: &str) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE attendance_summaries SET clock_out = NULL, clock_out_latitude = NULL, \
         clock_out_longitude = NULL, clock_out_device_id = NULL, clock_out_image = NULL, \
         updated_at = $2 WHERE id = $1",
    )
    .bind(summary_id)
    .bind(Utc::now())
    .execute(db)
    .await?;
    Ok(())
}

/// Closes one session and mirrors it onto the summary, atomically.
pub async fn close_session(
    tx: &mut PgTransaction<'_>,
    detail_id: &str,
    summary_id: &str,
    early_leave_minutes: i32,
    stamp: &ClockStamp,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE attendance_details SET clock_out_time = $2, clock_out_latitude = $3, \
         clock_out_longitude = $4, clock_out_device_id = $5, clock_out_image = $6, \
         updated_at = $7 WHERE id = $1",
    )
    .bind(detail_id)
    .bind(stamp.time)
    .bind(stamp.latitude)
    .bind(stamp.longitude)
    .bind(&stamp.device_id)
    .bind(&stamp.image)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;

    // The summary mirrors the latest session, and overtime stays zero until
    // an approved overtime request writes it.
    sqlx::query(
        "UPDATE attendance_summaries SET clock_out = $2, clock_out_latitude = $3, \
         clock_out_longitude = $4, clock_out_device_id = $5, clock_out_image = $6, \
         early_leave_minutes = $7, overtime_minutes = 0, updated_at = $8 WHERE id = $1",
    )
    .bind(summary_id)
    .bind(stamp.time)
    .bind(stamp.latitude)
    .bind(stamp.longitude)
    .bind(&stamp.device_id)
    .bind(&stamp.image)
    .bind(early_leave_minutes)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;
    Ok(())
}

/// Summaries for a date that still show an unfinished day.
pub async fn find_dangling_summaries(
    db: &PgPool,
    date: NaiveDate,
) -> Result<Vec<AttendanceSummary>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance_summaries \
         WHERE date = $1 AND clock_in IS NOT NULL AND clock_out IS NULL ORDER BY id",
        SUMMARY_COLUMNS
    );
    let summaries = sqlx::query_as::<_, AttendanceSummary>(&query)
        .bind(date)
        .fetch_all(db)
        .await?;
    Ok(summaries)
}

/// Force-closes every open session of a summary and stamps the summary,
/// in one transaction.
pub async fn force_close_summary(
    tx: &mut PgTransaction<'_>,
    summary_id: &str,
    force_time: DateTime<Utc>,
    device_id: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE attendance_details SET clock_out_time = $2, clock_out_device_id = $3, \
         updated_at = $4 WHERE attendance_summary_id = $1 AND clock_out_time IS NULL",
    )
    .bind(summary_id)
    .bind(force_time)
    .bind(device_id)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;

    sqlx::query(
        "UPDATE attendance_summaries SET clock_out = $2, clock_out_device_id = $3, \
         updated_at = $4 WHERE id = $1",
    )
    .bind(summary_id)
    .bind(force_time)
    .bind(device_id)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;
    Ok(())
}

/// First date in the window that already holds a real clock-in.
pub async fn first_attended_date_between(
    db: &PgPool,
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Option<NaiveDate>, AppError> {
    let date: Option<NaiveDate> = sqlx::query_scalar(
        "SELECT date FROM attendance_summaries \
         WHERE employee_id = $1 AND date BETWEEN $2 AND $3 AND clock_in IS NOT NULL \
         ORDER BY date LIMIT 1",
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_optional(db)
    .await?;
    Ok(date)
}

/// Writes (or rewrites) one day of an approved leave window. Clocks are
/// cleared and derived minutes zeroed; the schedule snapshot is refreshed.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_leave_day(
    tx: &mut PgTransaction<'_>,
    id: &str,
    tenant_id: &str,
    employee_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    schedule_id: Option<&str>,
    shift_id: Option<&str>,
    schedule_in: Option<NaiveTime>,
    schedule_out: Option<NaiveTime>,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO attendance_summaries (id, tenant_id, employee_id, date, schedule_id, \
         shift_id, schedule_in, schedule_out, late_minutes, early_leave_minutes, \
         overtime_minutes, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, 0, $9, $10, $10) \
         ON CONFLICT (tenant_id, employee_id, date) DO UPDATE SET \
           status = EXCLUDED.status, \
           schedule_id = EXCLUDED.schedule_id, \
           shift_id = EXCLUDED.shift_id, \
           schedule_in = EXCLUDED.schedule_in, \
           schedule_out = EXCLUDED.schedule_out, \
           clock_in = NULL, clock_out = NULL, \
           late_minutes = 0, early_leave_minutes = 0, overtime_minutes = 0, \
           updated_at = EXCLUDED.updated_at",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(employee_id)
    .bind(date)
    .bind(schedule_id)
    .bind(shift_id)
    .bind(schedule_in)
    .bind(schedule_out)
    .bind(status.as_str())
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;
    Ok(())
}

pub async fn update_overtime_minutes(
    tx: &mut PgTransaction<'_>,
    summary_id: &str,
    minutes: i32,
) -> Result<(), AppError> {
    sqlx::query("UPDATE attendance_summaries SET overtime_minutes = $2, updated_at = $3 WHERE id = $1")
        .bind(summary_id)
        .bind(minutes)
        .bind(Utc::now())
        .execute(tx.as_mut())
        .await?;
    Ok(())
}

pub async fn list_between(
    db: &PgPool,
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AttendanceSummary>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance_summaries \
         WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date DESC",
        SUMMARY_COLUMNS
    );
    let summaries = sqlx::query_as::<_, AttendanceSummary>(&query)
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;
    Ok(summaries)
}
