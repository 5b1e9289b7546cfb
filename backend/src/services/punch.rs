//! Clock-in/clock-out orchestration.
//!
//! Sessions are append-only: a day holds one open session at most, and the
//! summary always mirrors the first clock-in and the latest clock-out.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::attendance::{
    AttendanceDetail, AttendanceStatus, AttendanceSummary, ClockInPayload, ClockOutPayload,
};
use crate::models::employee::Employee;
use crate::models::shift::ShiftKind;
use crate::repositories::attendance::{self, ClockStamp};
use crate::repositories::employee as employee_repo;
use crate::repositories::schedule::PgScheduleSource;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::services::schedule_resolver::{resolve_schedule, ScheduleDay};
use crate::services::{employee_timezone, geofence};
use crate::utils::time::{local_instant, scheduled_out_instant};

pub struct PunchResult {
    pub summary: AttendanceSummary,
    pub message: String,
}

/// Status and lateness for the day's first session. Tolerance only gates
/// the `late` verdict; the minutes always count from the scheduled start.
pub fn first_session_status(
    now: DateTime<Utc>,
    date: NaiveDate,
    kind: &ShiftKind,
    tolerance_minutes: i32,
    tz: &Tz,
) -> (AttendanceStatus, i32) {
    if let ShiftKind::Fixed { start, .. } = kind {
        let scheduled_in = local_instant(date, *start, tz);
        let deadline = scheduled_in + Duration::minutes(tolerance_minutes.max(0) as i64);
        if now > deadline {
            let late = (now - scheduled_in).num_minutes().max(0) as i32;
            return (AttendanceStatus::Late, late);
        }
    }
    (AttendanceStatus::Present, 0)
}

/// Early-leave minutes (persisted) and the user-facing message for a
/// clock-out against the day's scheduled end, if it has one.
pub fn closing_assessment(
    now: DateTime<Utc>,
    date: NaiveDate,
    schedule_in: Option<NaiveTime>,
    schedule_out: Option<NaiveTime>,
    tz: &Tz,
) -> (i32, String) {
    let Some(out) = schedule_out else {
        return (0, "Safe travels.".to_string());
    };
    let scheduled = scheduled_out_instant(date, schedule_in, out, tz);
    if now < scheduled {
        let minutes = (scheduled - now).num_minutes() as i32;
        (
            minutes,
            format!("You left {} minutes before schedule.", minutes),
        )
    } else if now > scheduled {
        let minutes = (now - scheduled).num_minutes();
        (
            0,
            format!(
                "You left {} minutes after schedule. Submit an overtime request if instructed.",
                minutes
            ),
        )
    } else {
        (0, "Safe travels.".to_string())
    }
}

pub async fn clock_in(
    db: &PgPool,
    config: &Config,
    employee: &Employee,
    payload: &ClockInPayload,
    now: DateTime<Utc>,
) -> Result<PunchResult, AppError> {
    // Device lock: the first punch binds the device, afterwards only the
    // registered one may punch.
    if let Some(device_id) = &payload.device_id {
        match &employee.registered_device_id {
            None => employee_repo::bind_device(db, &employee.id, device_id).await?,
            Some(registered) if registered != device_id => {
                return Err(AppError::Forbidden(
                    "You are punching from a new device. Contact HR to reset your device \
                     registration."
                        .to_string(),
                ));
            }
            Some(_) => {}
        }
    }

    let tz = employee_timezone(db, employee, config).await?;
    let today = now.with_timezone(&tz).date_naive();

    if let Some(existing) = attendance::find_summary(db, &employee.id, today).await? {
        if existing.status.blocks_punching() {
            return Err(AppError::Forbidden(format!(
                "You are recorded as {} today. Punching is locked.",
                existing.status.label()
            )));
        }
    }

    let source = PgScheduleSource::new(db.clone());
    let resolved = resolve_schedule(&source, &employee.id, today).await?;
    let shift = match resolved.day {
        ScheduleDay::Unscheduled => {
            return Err(AppError::Forbidden(
                "Work schedule is not active or has not been set up.".to_string(),
            ));
        }
        ScheduleDay::Off => {
            return Err(AppError::Forbidden(
                "Today is your scheduled day off.".to_string(),
            ));
        }
        ScheduleDay::Working => resolved.shift.ok_or_else(|| {
            AppError::Forbidden("Invalid shift configuration. Contact HR.".to_string())
        })?,
    };
    let kind = shift.kind().ok_or_else(|| {
        AppError::Forbidden("Invalid shift configuration. Contact HR.".to_string())
    })?;

    let work_location_id =
        geofence::locate(db, employee, payload.latitude, payload.longitude).await?;

    let (schedule_in, schedule_out) = match kind {
        ShiftKind::Fixed { start, end } => (Some(start), Some(end)),
        _ => (None, None),
    };
    let mut seed = AttendanceSummary::new_for_punch(
        employee.tenant_id.clone(),
        employee.id.clone(),
        today,
        now,
    );
    seed.schedule_id = resolved.schedule_id.clone();
    seed.shift_id = Some(shift.id.clone());
    seed.schedule_in = schedule_in;
    seed.schedule_out = schedule_out;

    let summary = attendance::get_or_create_summary(db, &seed).await?;

    // A concurrent approval may have blocked the day between the first
    // check and the upsert.
    if summary.status.blocks_punching() {
        return Err(AppError::Forbidden(format!(
            "You are recorded as {} today. Punching is locked.",
            summary.status.label()
        )));
    }

    if attendance::find_open_session(db, &summary.id).await?.is_some() {
        return Err(AppError::BadRequest(
            "You still have an active session. Clock out first.".to_string(),
        ));
    }

    let session_count = attendance::count_sessions(db, &summary.id).await?;
    if !employee.is_flexible_location && session_count > 0 {
        return Err(AppError::BadRequest(
            "Fixed-location employees are allowed a single attendance session per day."
                .to_string(),
        ));
    }

    let is_first_session = session_count == 0;

    let detail = AttendanceDetail {
        id: Uuid::new_v4().to_string(),
        attendance_summary_id: summary.id.clone(),
        work_location_id: work_location_id.clone(),
        clock_in_time: now,
        clock_in_latitude: Some(payload.latitude),
        clock_in_longitude: Some(payload.longitude),
        clock_in_device_id: payload.device_id.clone(),
        clock_in_image: payload.image.clone(),
        clock_out_time: None,
        clock_out_latitude: None,
        clock_out_longitude: None,
        clock_out_device_id: None,
        clock_out_image: None,
        created_at: now,
        updated_at: now,
    };
    attendance::insert_session(db, &detail).await?;

    if is_first_session {
        let (status, late_minutes) =
            first_session_status(now, today, &kind, shift.late_tolerance_minutes, &tz);
        let stamp = ClockStamp {
            time: now,
            latitude: payload.latitude,
            longitude: payload.longitude,
            device_id: payload.device_id.clone(),
            image: payload.image.clone(),
        };
        attendance::apply_first_clock_in(
            db,
            &summary.id,
            status,
            late_minutes,
            work_location_id.as_deref(),
            &stamp,
        )
        .await?;
    } else {
        attendance::apply_repeat_clock_in(db, &summary.id).await?;
    }

    let summary = attendance::find_summary(db, &employee.id, today)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("summary vanished mid punch"))
        })?;

    Ok(PunchResult {
        summary,
        message: "Clock-in successful (new session started).".to_string(),
    })
}

pub async fn clock_out(
    db: &PgPool,
    config: &Config,
    employee: &Employee,
    payload: &ClockOutPayload,
    now: DateTime<Utc>,
) -> Result<PunchResult, AppError> {
    let tz = employee_timezone(db, employee, config).await?;
    let today = now.with_timezone(&tz).date_naive();

    let summary = attendance::find_summary(db, &employee.id, today)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("You have not clocked in today.".to_string())
        })?;

    if summary.status.blocks_punching() {
        return Err(AppError::Forbidden(format!(
            "You are recorded as {} today. Punching is locked.",
            summary.status.label()
        )));
    }

    let open_session = attendance::find_open_session(db, &summary.id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(
                "No active session. You may have already clocked out.".to_string(),
            )
        })?;

    let (early_leave_minutes, assessment) =
        closing_assessment(now, summary.date, summary.schedule_in, summary.schedule_out, &tz);

    let stamp = ClockStamp {
        time: now,
        latitude: payload.latitude,
        longitude: payload.longitude,
        device_id: payload.device_id.clone(),
        image: payload.image.clone(),
    };

    let mut tx = begin_transaction(db).await?;
    attendance::close_session(&mut tx, &open_session.id, &summary.id, early_leave_minutes, &stamp)
        .await?;
    commit_transaction(tx).await?;

    let summary = attendance::find_summary(db, &employee.id, today)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("summary vanished mid punch"))
        })?;

    Ok(PunchResult {
        summary,
        message: format!("Clock-out successful. {}", assessment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Jakarta;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn jakarta(y: i32, mo: u32, day: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Jakarta
            .with_ymd_and_hms(y, mo, day, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn on_time_clock_in_is_present() {
        let kind = ShiftKind::Fixed {
            start: t(9, 0),
            end: t(17, 0),
        };
        let now = jakarta(2026, 3, 2, 8, 55);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 10, &Jakarta);
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(late, 0);
    }

    #[test]
    fn arrival_within_tolerance_is_not_late() {
        let kind = ShiftKind::Fixed {
            start: t(9, 0),
            end: t(17, 0),
        };
        // Exactly at the tolerance deadline.
        let now = jakarta(2026, 3, 2, 9, 10);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 10, &Jakarta);
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(late, 0);
    }

    #[test]
    fn late_minutes_count_from_schedule_start_not_tolerance() {
        let kind = ShiftKind::Fixed {
            start: t(9, 0),
            end: t(17, 0),
        };
        let now = jakarta(2026, 3, 2, 9, 25);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 10, &Jakarta);
        assert_eq!(status, AttendanceStatus::Late);
        assert_eq!(late, 25);
    }

    #[test]
    fn night_shift_clock_in_after_start_is_late() {
        let kind = ShiftKind::Fixed {
            start: t(22, 0),
            end: t(6, 0),
        };
        let now = jakarta(2026, 3, 2, 22, 10);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 5, &Jakarta);
        assert_eq!(status, AttendanceStatus::Late);
        assert_eq!(late, 10);
    }

    #[test]
    fn flexible_shift_never_records_lateness() {
        let kind = ShiftKind::Flexible { target_minutes: 480 };
        let now = jakarta(2026, 3, 2, 14, 0);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 0, &Jakarta);
        assert_eq!(status, AttendanceStatus::Present);
        assert_eq!(late, 0);
    }

    #[test]
    fn flexible_round_trip_has_zero_derived_minutes() {
        // No schedule times at all: no lateness, no early leave.
        let kind = ShiftKind::Flexible { target_minutes: 480 };
        let now = jakarta(2026, 3, 2, 9, 0);
        let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 0, &Jakarta);
        assert_eq!((status, late), (AttendanceStatus::Present, 0));

        let (early, _) = closing_assessment(now, d(2026, 3, 2), None, None, &Jakarta);
        assert_eq!(early, 0);
    }

    #[test]
    fn leaving_before_schedule_records_early_minutes() {
        let now = jakarta(2026, 3, 2, 16, 30);
        let (early, message) =
            closing_assessment(now, d(2026, 3, 2), Some(t(9, 0)), Some(t(17, 0)), &Jakarta);
        assert_eq!(early, 30);
        assert!(message.contains("30 minutes before"));
    }

    #[test]
    fn leaving_after_schedule_keeps_overtime_at_zero() {
        let now = jakarta(2026, 3, 2, 18, 0);
        let (early, message) =
            closing_assessment(now, d(2026, 3, 2), Some(t(9, 0)), Some(t(17, 0)), &Jakarta);
        assert_eq!(early, 0);
        assert!(message.contains("overtime request"));
    }

    #[test]
    fn night_shift_clock_out_compares_against_next_day() {
        // Scheduled 22:00 - 06:00; leaving at 05:00 the next morning is one
        // hour early, not twenty-three hours late.
        let now = jakarta(2026, 3, 3, 5, 0);
        let (early, _) =
            closing_assessment(now, d(2026, 3, 2), Some(t(22, 0)), Some(t(6, 0)), &Jakarta);
        assert_eq!(early, 60);
    }
}
