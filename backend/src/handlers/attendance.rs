use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::attendance::{
        AttendanceResponse, AttendanceSummary, ClockInPayload, ClockOutPayload,
        CurrentStatusResponse, HistoryDayResponse, HistoryQuery, SessionResponse,
    },
    models::user::User,
    repositories::{attendance as attendance_repo, shift as shift_repo},
    services::{employee_timezone, punch},
    utils::time,
};

use super::current_employee;

#[derive(Debug, Serialize)]
pub struct PunchResponse {
    pub success: bool,
    pub message: String,
    pub data: AttendanceResponse,
}

pub async fn clock_in(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<ClockInPayload>,
) -> Result<Json<PunchResponse>, AppError> {
    payload.validate()?;
    let employee = current_employee(&pool, &user).await?;

    let result = punch::clock_in(&pool, &config, &employee, &payload, Utc::now()).await?;
    Ok(Json(PunchResponse {
        success: true,
        message: result.message.clone(),
        data: AttendanceResponse::from_summary(result.summary, Some(result.message)),
    }))
}

pub async fn clock_out(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<ClockOutPayload>,
) -> Result<Json<PunchResponse>, AppError> {
    payload.validate()?;
    let employee = current_employee(&pool, &user).await?;

    let result = punch::clock_out(&pool, &config, &employee, &payload, Utc::now()).await?;
    Ok(Json(PunchResponse {
        success: true,
        message: result.message.clone(),
        data: AttendanceResponse::from_summary(result.summary, Some(result.message)),
    }))
}

pub async fn current_status(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<CurrentStatusResponse>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    let tz = employee_timezone(&pool, &employee, &config).await?;
    let today = time::today_local(&tz);
    let label = time::timezone_label(&tz);

    let summary = attendance_repo::find_summary(&pool, &employee.id, today).await?;

    let display = |instant: Option<chrono::DateTime<Utc>>| match instant {
        Some(t) => format!("{} {}", t.with_timezone(&tz).format("%H:%M"), label),
        None => "--:--".to_string(),
    };

    let (status_code, message) = match &summary {
        None => ("not_present", "You have not punched in today."),
        Some(s) if s.clock_in.is_some() && s.clock_out.is_none() => {
            ("checked_in", "Have a good shift. Don't forget to clock out!")
        }
        Some(s) if s.clock_out.is_some() => ("checked_out", "All done. Safe travels!"),
        Some(_) => ("not_present", "You have not punched in today."),
    };

    Ok(Json(CurrentStatusResponse {
        status_code: status_code.to_string(),
        message: message.to_string(),
        employee_name: employee.full_name.clone(),
        clock_in_display: display(summary.as_ref().and_then(|s| s.clock_in)),
        clock_out_display: display(summary.as_ref().and_then(|s| s.clock_out)),
    }))
}

/// Net worked minutes once the shift break is deducted. The break only
/// applies to days with at least four gross hours, and never drives the
/// total negative.
pub fn net_work_minutes(gross_minutes: i64, break_minutes: i64) -> (i64, i64) {
    let deducted = if gross_minutes >= 240 && break_minutes > 0 {
        break_minutes
    } else {
        0
    };
    ((gross_minutes - deducted).max(0), deducted)
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .checked_add_months(Months::new(1))?
        .checked_sub_signed(Duration::days(1))?;
    Some((first, last))
}

pub async fn history(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    let tz = employee_timezone(&pool, &employee, &config).await?;
    let now_local = time::now_in_timezone(&tz);

    let month = params.month.unwrap_or_else(|| now_local.month());
    let year = params.year.unwrap_or_else(|| now_local.year());
    let (first_day, last_day) = month_bounds(year, month)
        .ok_or_else(|| AppError::BadRequest("Invalid year/month provided".to_string()))?;

    let summaries = attendance_repo::list_between(&pool, &employee.id, first_day, last_day).await?;

    let mut days = Vec::with_capacity(summaries.len());
    let mut total_attended = 0usize;
    let mut total_late = 0usize;
    let mut total_minutes = 0i64;
    for summary in summaries {
        let day = build_history_day(&pool, summary).await?;
        if matches!(day.status.as_str(), "present" | "late") {
            total_attended += 1;
        }
        if day.is_late {
            total_late += 1;
        }
        total_minutes += day.work_minutes;
        days.push(day);
    }

    Ok(Json(serde_json::json!({
        "meta": {
            "month": month,
            "year": year,
            "total_attendance": total_attended,
            "total_late": total_late,
            "total_work_hours": total_minutes / 60,
        },
        "data": days,
    })))
}

async fn build_history_day(
    pool: &PgPool,
    summary: AttendanceSummary,
) -> Result<HistoryDayResponse, AppError> {
    let sessions = attendance_repo::list_sessions(pool, &summary.id).await?;

    let shift = match &summary.shift_id {
        Some(shift_id) => shift_repo::find_by_id(pool, shift_id).await?,
        None => None,
    };

    let (work_minutes, break_deducted) = match (summary.clock_in, summary.clock_out) {
        (Some(clock_in), Some(clock_out)) => {
            let gross = (clock_out - clock_in).num_minutes().max(0);
            let break_minutes = shift
                .as_ref()
                .map(|s| s.break_duration_minutes as i64)
                .unwrap_or(0);
            net_work_minutes(gross, break_minutes)
        }
        _ => (0, 0),
    };

    Ok(HistoryDayResponse {
        id: summary.id,
        date: summary.date,
        shift_name: shift.map(|s| s.name),
        status: summary.status,
        late_minutes: summary.late_minutes,
        is_late: summary.late_minutes > 0,
        work_minutes,
        break_deducted,
        sessions: sessions.into_iter().map(SessionResponse::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_is_deducted_only_past_four_gross_hours() {
        assert_eq!(net_work_minutes(480, 60), (420, 60));
        assert_eq!(net_work_minutes(239, 60), (239, 0));
        assert_eq!(net_work_minutes(240, 60), (180, 60));
        assert_eq!(net_work_minutes(480, 0), (480, 0));
    }

    #[test]
    fn net_minutes_never_go_negative() {
        assert_eq!(net_work_minutes(250, 300), (0, 300));
    }

    #[test]
    fn month_bounds_cover_whole_month() {
        let (first, last) = month_bounds(2026, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert!(month_bounds(2026, 13).is_none());
    }
}
