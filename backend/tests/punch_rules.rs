//! Punch-derived facts: lateness, early leave, and night-shift boundaries.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Jakarta;

use presensi_backend::models::attendance::AttendanceStatus;
use presensi_backend::models::shift::ShiftKind;
use presensi_backend::services::punch::{closing_assessment, first_session_status};
use presensi_backend::utils::time::{crosses_midnight, scheduled_out_instant};

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
fn flexible_round_trip_yields_no_derived_minutes() {
    // Flexible shift: no fixed clock times, so a punch-in/punch-out at the
    // same instant computes zero lateness and zero early leave.
    let kind = ShiftKind::Flexible { target_minutes: 480 };
    let now = jakarta(2026, 3, 2, 9, 0);

    let (status, late) = first_session_status(now, d(2026, 3, 2), &kind, 0, &Jakarta);
    assert_eq!(status, AttendanceStatus::Present);
    assert_eq!(late, 0);

    let (early, _) = closing_assessment(now, d(2026, 3, 2), None, None, &Jakarta);
    assert_eq!(early, 0);
}

#[test]
fn tolerance_gates_the_late_status_but_not_the_minutes() {
    let kind = ShiftKind::Fixed {
        start: t(22, 0),
        end: t(6, 0),
    };

    // 22:10 with 5 minutes tolerance: late, counted from 22:00.
    let (status, late) =
        first_session_status(jakarta(2026, 3, 2, 22, 10), d(2026, 3, 2), &kind, 5, &Jakarta);
    assert_eq!(status, AttendanceStatus::Late);
    assert_eq!(late, 10);

    // 22:04 with the same tolerance: inside the grace window.
    let (status, late) =
        first_session_status(jakarta(2026, 3, 2, 22, 4), d(2026, 3, 2), &kind, 5, &Jakarta);
    assert_eq!(status, AttendanceStatus::Present);
    assert_eq!(late, 0);
}

#[test]
fn night_shift_scheduled_end_is_on_the_next_day() {
    assert!(crosses_midnight(t(22, 0), t(6, 0)));

    let end = scheduled_out_instant(d(2026, 3, 2), Some(t(22, 0)), t(6, 0), &Jakarta);
    assert_eq!(end, jakarta(2026, 3, 3, 6, 0));

    // Leaving at 05:00 the next morning is sixty minutes early, not a day
    // of lateness.
    let (early, message) = closing_assessment(
        jakarta(2026, 3, 3, 5, 0),
        d(2026, 3, 2),
        Some(t(22, 0)),
        Some(t(6, 0)),
        &Jakarta,
    );
    assert_eq!(early, 60);
    assert!(message.contains("60 minutes before"));
}

#[test]
fn staying_past_schedule_never_writes_overtime_from_the_punch() {
    let (early, message) = closing_assessment(
        jakarta(2026, 3, 2, 19, 0),
        d(2026, 3, 2),
        Some(t(9, 0)),
        Some(t(17, 0)),
        &Jakarta,
    );
    // Early-leave stays zero; the message points at the overtime request
    // flow instead of granting anything.
    assert_eq!(early, 0);
    assert!(message.contains("overtime request"));
}

#[test]
fn exact_on_schedule_departure_is_clean() {
    let (early, message) = closing_assessment(
        jakarta(2026, 3, 2, 17, 0),
        d(2026, 3, 2),
        Some(t(9, 0)),
        Some(t(17, 0)),
        &Jakarta,
    );
    assert_eq!(early, 0);
    assert_eq!(message, "Safe travels.");
}
