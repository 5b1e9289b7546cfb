//! Force-close eligibility and instants for the end-of-day jobs.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Jakarta;

use presensi_backend::services::reconciliation::{
    closes_on_own_day, force_close_instant, SYSTEM_DEVICE_ID,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn jakarta(y: i32, mo: u32, day: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Jakarta
        .with_ymd_and_hms(y, mo, day, h, mi, s)
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn todays_day_shift_is_eligible_for_closing_tonight() {
    assert!(closes_on_own_day(Some(t(9, 0)), Some(t(17, 0))));
    // Flexible and snapshot-less days fall back to end-of-day closing too.
    assert!(closes_on_own_day(None, None));
}

#[test]
fn todays_night_shift_is_left_running() {
    // 22:00-06:00 started today legitimately runs past midnight; tonight's
    // run must not touch it.
    assert!(!closes_on_own_day(Some(t(22, 0)), Some(t(6, 0))));
}

#[test]
fn yesterdays_night_shift_closes_only_after_its_morning_end() {
    // Session opened yesterday 22:00, scheduled out 06:00 this morning.
    let force_at = force_close_instant(d(2026, 3, 2), Some(t(22, 0)), Some(t(6, 0)), &Jakarta);
    assert_eq!(force_at, jakarta(2026, 3, 3, 6, 0, 0));

    // A run at 05:00 is before the cutoff: the job leaves the session open.
    let early_run = jakarta(2026, 3, 3, 5, 0, 0);
    assert!(early_run < force_at);

    // The usual pre-midnight run is well past the cutoff and closes it.
    let nightly_run = jakarta(2026, 3, 3, 23, 55, 0);
    assert!(nightly_run >= force_at);
}

#[test]
fn fallback_close_time_is_end_of_day_local() {
    let force_at = force_close_instant(d(2026, 3, 2), None, None, &Jakarta);
    assert_eq!(force_at, jakarta(2026, 3, 2, 23, 59, 59));
}

#[test]
fn day_shift_closes_at_its_scheduled_end() {
    let force_at = force_close_instant(d(2026, 3, 2), Some(t(9, 0)), Some(t(17, 0)), &Jakarta);
    assert_eq!(force_at, jakarta(2026, 3, 2, 17, 0, 0));
}

#[test]
fn system_closures_are_attributable() {
    assert_eq!(SYSTEM_DEVICE_ID, "SYSTEM_AUTO_LOG");
}
