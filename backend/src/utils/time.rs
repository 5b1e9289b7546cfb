use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    now_in_timezone(tz).date_naive()
}

/// Parses an IANA timezone name, falling back when unset or invalid.
pub fn parse_timezone(name: Option<&str>, fallback: Tz) -> Tz {
    name.and_then(|n| n.parse().ok()).unwrap_or(fallback)
}

/// Short display label for the common Indonesian zones.
pub fn timezone_label(tz: &Tz) -> &str {
    match tz.name() {
        "Asia/Jakarta" => "WIB",
        "Asia/Makassar" => "WITA",
        "Asia/Jayapura" => "WIT",
        name => name,
    }
}

/// Resolves a wall-clock time on a calendar date to a UTC instant.
///
/// DST ambiguity takes the earlier offset; a nonexistent local time (spring
/// gap) is pushed forward one hour.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

/// True when the scheduled end falls before the scheduled start, i.e. the
/// shift crosses midnight.
pub fn crosses_midnight(schedule_in: NaiveTime, schedule_out: NaiveTime) -> bool {
    schedule_out < schedule_in
}

/// UTC instant at which a schedule ends for the given summary date.
///
/// For a night shift the end belongs to the following calendar day.
pub fn scheduled_out_instant(
    date: NaiveDate,
    schedule_in: Option<NaiveTime>,
    schedule_out: NaiveTime,
    tz: &Tz,
) -> DateTime<Utc> {
    let end_date = match schedule_in {
        Some(start) if crosses_midnight(start, schedule_out) => date + Duration::days(1),
        _ => date,
    };
    local_instant(end_date, schedule_out, tz)
}

/// UTC instant at which a schedule starts for the given summary date.
pub fn scheduled_in_instant(date: NaiveDate, schedule_in: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    local_instant(date, schedule_in, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Jakarta;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn local_instant_applies_offset() {
        // Jakarta is UTC+7 year-round.
        let instant = local_instant(d(2026, 3, 2), t(9, 0), &Jakarta);
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 3, 2, 2, 0, 0).unwrap());
    }

    #[test]
    fn crosses_midnight_detects_night_shift() {
        assert!(crosses_midnight(t(22, 0), t(6, 0)));
        assert!(!crosses_midnight(t(9, 0), t(17, 0)));
        assert!(!crosses_midnight(t(9, 0), t(9, 0)));
    }

    #[test]
    fn scheduled_out_shifts_to_next_day_for_night_shift() {
        let out = scheduled_out_instant(d(2026, 3, 2), Some(t(22, 0)), t(6, 0), &Jakarta);
        // 06:00 on March 3rd Jakarta time.
        assert_eq!(out, Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap());
    }

    #[test]
    fn scheduled_out_stays_same_day_for_day_shift() {
        let out = scheduled_out_instant(d(2026, 3, 2), Some(t(9, 0)), t(17, 0), &Jakarta);
        assert_eq!(out, Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn parse_timezone_falls_back_on_garbage() {
        assert_eq!(parse_timezone(Some("Asia/Makassar"), Jakarta), chrono_tz::Asia::Makassar);
        assert_eq!(parse_timezone(Some("Not/AZone"), Jakarta), Jakarta);
        assert_eq!(parse_timezone(None, Jakarta), Jakarta);
    }

    #[test]
    fn timezone_labels_for_indonesian_zones() {
        assert_eq!(timezone_label(&Jakarta), "WIB");
        assert_eq!(timezone_label(&chrono_tz::Asia::Jayapura), "WIT");
        assert_eq!(timezone_label(&chrono_tz::Asia::Tokyo), "Asia/Tokyo");
    }
}
