//! End-of-day reconciliation: force-closing dangling sessions and marking
//! unexplained absences. Both jobs are idempotent and treat bad schedule
//! data as skip-and-log, never as fatal.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::attendance::{AttendanceStatus, AttendanceSummary};
use crate::models::shift::ShiftKind;
use crate::repositories::attendance;
use crate::repositories::employee as employee_repo;
use crate::repositories::schedule::PgScheduleSource;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::services::employee_timezone;
use crate::services::schedule_resolver::{resolve_schedule, ScheduleDay};
use crate::utils::time::{crosses_midnight, local_instant, scheduled_out_instant};

/// Device id stamped on records the system closed on the employee's behalf.
pub const SYSTEM_DEVICE_ID: &str = "SYSTEM_AUTO_LOG";

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(t) => t,
    None => unreachable!(),
};

#[derive(Debug, Default)]
pub struct AutoClockOutReport {
    pub forced: usize,
    pub skipped_night: usize,
    pub skipped_not_due: usize,
}

/// Instant a dangling day should be force-closed at: the scheduled end
/// (shifted a day for night shifts), or end-of-day when the schedule has no
/// fixed end.
pub fn force_close_instant(
    date: NaiveDate,
    schedule_in: Option<NaiveTime>,
    schedule_out: Option<NaiveTime>,
    tz: &Tz,
) -> DateTime<Utc> {
    match schedule_out {
        Some(out) => scheduled_out_instant(date, schedule_in, out, tz),
        None => local_instant(date, END_OF_DAY, tz),
    }
}

/// A summary still open on its own calendar day is left alone only while
/// its night shift may legitimately still be running.
pub fn closes_on_own_day(schedule_in: Option<NaiveTime>, schedule_out: Option<NaiveTime>) -> bool {
    match (schedule_in, schedule_out) {
        (Some(start), Some(end)) => !crosses_midnight(start, end),
        _ => true,
    }
}

async fn timezone_for_summary(
    db: &PgPool,
    config: &Config,
    summary: &AttendanceSummary,
) -> Result<Tz, AppError> {
    match employee_repo::find_by_id(db, &summary.employee_id).await? {
        Some(employee) => employee_timezone(db, &employee, config).await,
        None => Ok(config.time_zone),
    }
}

async fn force_close(
    db: &PgPool,
    summary: &AttendanceSummary,
    force_time: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut tx = begin_transaction(db).await?;
    attendance::force_close_summary(&mut tx, &summary.id, force_time, SYSTEM_DEVICE_ID).await?;
    commit_transaction(tx).await?;
    tracing::info!(
        summary_id = %summary.id,
        employee_id = %summary.employee_id,
        date = %summary.date,
        force_time = %force_time,
        "force-closed dangling session"
    );
    Ok(())
}

/// Closes yesterday's leftovers unconditionally once their scheduled end has
/// passed, and today's leftovers unless the shift legitimately runs past
/// midnight.
pub async fn auto_clock_out(
    db: &PgPool,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<AutoClockOutReport, AppError> {
    let today = now.with_timezone(&config.time_zone).date_naive();
    let yesterday = today - Duration::days(1);
    let mut report = AutoClockOutReport::default();

    for summary in attendance::find_dangling_summaries(db, yesterday).await? {
        let tz = timezone_for_summary(db, config, &summary).await?;
        let force_time = force_close_instant(summary.date, summary.schedule_in, summary.schedule_out, &tz);
        // A night shift that started yesterday may still be inside its
        // window this morning; only close once the end has passed.
        if now < force_time {
            report.skipped_not_due += 1;
            tracing::info!(
                summary_id = %summary.id,
                employee_id = %summary.employee_id,
                "skipped: scheduled end not reached yet"
            );
            continue;
        }
        force_close(db, &summary, force_time).await?;
        report.forced += 1;
    }

    for summary in attendance::find_dangling_summaries(db, today).await? {
        if !closes_on_own_day(summary.schedule_in, summary.schedule_out) {
            report.skipped_night += 1;
            tracing::info!(
                summary_id = %summary.id,
                employee_id = %summary.employee_id,
                "skipped: night shift still in progress"
            );
            continue;
        }
        let tz = timezone_for_summary(db, config, &summary).await?;
        let force_time = force_close_instant(summary.date, summary.schedule_in, summary.schedule_out, &tz);
        force_close(db, &summary, force_time).await?;
        report.forced += 1;
    }

    Ok(report)
}

/// Creates `alpha` summaries for working days with no record at all.
/// Existing rows (present, sick, leave, ...) are never touched.
pub async fn auto_alpha(db: &PgPool, config: &Config, date: NaiveDate) -> Result<usize, AppError> {
    let source = PgScheduleSource::new(db.clone());
    let mut created = 0;

    for employee in employee_repo::list_reconciliation_candidates(db).await? {
        if attendance::exists_for_date(db, &employee.id, date).await? {
            continue;
        }

        let resolved = match resolve_schedule(&source, &employee.id, date).await {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(
                    employee_id = %employee.id,
                    error = %err,
                    "skipping employee: schedule resolution failed"
                );
                continue;
            }
        };

        if resolved.day != ScheduleDay::Working {
            continue;
        }
        let Some(shift) = resolved.shift.as_ref() else {
            continue;
        };
        let (schedule_in, schedule_out) = match shift.kind() {
            Some(ShiftKind::Fixed { start, end }) => (Some(start), Some(end)),
            Some(_) => (None, None),
            None => {
                tracing::warn!(
                    employee_id = %employee.id,
                    shift_id = %shift.id,
                    "skipping employee: invalid shift configuration"
                );
                continue;
            }
        };

        let now = Utc::now();
        let seed = AttendanceSummary {
            id: Uuid::new_v4().to_string(),
            tenant_id: employee.tenant_id.clone(),
            employee_id: employee.id.clone(),
            date,
            schedule_id: resolved.schedule_id.clone(),
            shift_id: Some(shift.id.clone()),
            schedule_in,
            schedule_out,
            clock_in: None,
            clock_out: None,
            clock_in_latitude: None,
            clock_in_longitude: None,
            clock_in_device_id: None,
            clock_in_image: None,
            clock_out_latitude: None,
            clock_out_longitude: None,
            clock_out_device_id: None,
            clock_out_image: None,
            work_location_id: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            overtime_minutes: 0,
            status: AttendanceStatus::Alpha,
            created_at: now,
            updated_at: now,
        };

        if attendance::insert_summary_if_absent(db, &seed).await? {
            created += 1;
            tracing::info!(
                employee_id = %employee.id,
                date = %date,
                "marked absent without notice"
            );
        }
    }

    Ok(created)
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

    #[test]
    fn day_shifts_close_on_their_own_day() {
        assert!(closes_on_own_day(Some(t(9, 0)), Some(t(17, 0))));
        assert!(closes_on_own_day(None, None));
        assert!(closes_on_own_day(None, Some(t(17, 0))));
    }

    #[test]
    fn night_shifts_wait_for_the_next_run() {
        assert!(!closes_on_own_day(Some(t(22, 0)), Some(t(6, 0))));
    }

    #[test]
    fn force_close_uses_schedule_end_when_known() {
        let instant = force_close_instant(d(2026, 3, 2), Some(t(9, 0)), Some(t(17, 0)), &Jakarta);
        assert_eq!(
            instant,
            Jakarta
                .with_ymd_and_hms(2026, 3, 2, 17, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn force_close_of_night_shift_lands_on_next_day() {
        let instant = force_close_instant(d(2026, 3, 2), Some(t(22, 0)), Some(t(6, 0)), &Jakarta);
        assert_eq!(
            instant,
            Jakarta
                .with_ymd_and_hms(2026, 3, 3, 6, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn force_close_falls_back_to_end_of_day() {
        let instant = force_close_instant(d(2026, 3, 2), None, None, &Jakarta);
        assert_eq!(
            instant,
            Jakarta
                .with_ymd_and_hms(2026, 3, 2, 23, 59, 59)
                .unwrap()
                .with_timezone(&Utc)
        );
    }
}
