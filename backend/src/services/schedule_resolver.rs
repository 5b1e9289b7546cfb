//! Layered schedule resolution: per-date override, then the rostered
//! recurring pattern, else unscheduled.

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::shift::{Shift, ShiftKind};
use crate::repositories::schedule::ScheduleSource;

/// How a calendar date classifies for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDay {
    Working,
    Off,
    /// No assignment covers the date at all. Distinct from `Off`: punches
    /// fail with a configuration error instead of the day counting as
    /// absence.
    Unscheduled,
}

#[derive(Debug, Clone)]
pub struct ResolvedSchedule {
    /// Governing pattern id, exposed for the summary snapshot even when the
    /// date is off.
    pub schedule_id: Option<String>,
    pub shift: Option<Shift>,
    pub day: ScheduleDay,
}

impl ResolvedSchedule {
    pub fn is_working_day(&self) -> bool {
        self.day == ScheduleDay::Working
    }
}

/// Position of `date` inside a repeating cycle anchored at `effective_date`.
/// `None` when the date precedes the anchor or the cycle length is invalid.
pub fn cycle_day_index(
    effective_date: NaiveDate,
    date: NaiveDate,
    cycle_length_days: i32,
) -> Option<i32> {
    if cycle_length_days <= 0 {
        return None;
    }
    let elapsed = (date - effective_date).num_days();
    if elapsed < 0 {
        return None;
    }
    Some((elapsed % cycle_length_days as i64) as i32)
}

fn classify(shift: Shift) -> (Option<Shift>, ScheduleDay) {
    match shift.kind() {
        Some(ShiftKind::DayOff) | None => (Some(shift), ScheduleDay::Off),
        Some(_) => (Some(shift), ScheduleDay::Working),
    }
}

pub async fn resolve_schedule(
    source: &dyn ScheduleSource,
    employee_id: &str,
    date: NaiveDate,
) -> Result<ResolvedSchedule, AppError> {
    // The pattern id is wanted for the snapshot regardless of whether an
    // override ends up deciding the day.
    let assignment = source.find_active_assignment(employee_id, date).await?;
    let schedule_id = assignment
        .as_ref()
        .map(|a| a.assignment.schedule_pattern_id.clone());

    if let Some(override_row) = source.find_override(employee_id, date).await? {
        return Ok(match override_row.shift_id {
            None => ResolvedSchedule {
                schedule_id,
                shift: None,
                day: ScheduleDay::Off,
            },
            Some(shift_id) => match source.find_shift(&shift_id).await? {
                // Dangling reference counts as a forced day off.
                None => ResolvedSchedule {
                    schedule_id,
                    shift: None,
                    day: ScheduleDay::Off,
                },
                Some(shift) => {
                    let (shift, day) = classify(shift);
                    ResolvedSchedule {
                        schedule_id,
                        shift,
                        day,
                    }
                }
            },
        });
    }

    let Some(active) = assignment else {
        return Ok(ResolvedSchedule {
            schedule_id: None,
            shift: None,
            day: ScheduleDay::Unscheduled,
        });
    };

    let day_index = cycle_day_index(
        active.assignment.effective_date,
        date,
        active.cycle_length_days,
    );
    let shift = match day_index {
        Some(index) => {
            source
                .find_pattern_shift(&active.assignment.schedule_pattern_id, index)
                .await?
        }
        None => None,
    };

    Ok(match shift {
        None => ResolvedSchedule {
            schedule_id,
            shift: None,
            day: ScheduleDay::Off,
        },
        Some(shift) => {
            let (shift, day) = classify(shift);
            ResolvedSchedule {
                schedule_id,
                shift,
                day,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::{ScheduleAssignment, ScheduleOverride};
    use crate::repositories::schedule::{ActiveAssignment, MockScheduleSource};
    use chrono::{NaiveTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_shift(id: &str) -> Shift {
        let now = Utc::now();
        Shift {
            id: id.into(),
            name: "Morning".into(),
            is_day_off: false,
            is_flexible: false,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            daily_target_minutes: None,
            break_duration_minutes: 60,
            late_tolerance_minutes: 10,
            created_at: now,
            updated_at: now,
        }
    }

    fn day_off_shift(id: &str) -> Shift {
        let mut shift = fixed_shift(id);
        shift.is_day_off = true;
        shift.start_time = None;
        shift.end_time = None;
        shift
    }

    fn override_row(employee_id: &str, d: NaiveDate, shift_id: Option<&str>) -> ScheduleOverride {
        let now = Utc::now();
        ScheduleOverride {
            id: "ov-1".into(),
            employee_id: employee_id.into(),
            date: d,
            shift_id: shift_id.map(Into::into),
            created_at: now,
            updated_at: now,
        }
    }

    fn active_assignment(pattern_id: &str, effective: NaiveDate, cycle: i32) -> ActiveAssignment {
        let now = Utc::now();
        ActiveAssignment {
            assignment: ScheduleAssignment {
                id: "as-1".into(),
                employee_id: "emp-1".into(),
                schedule_pattern_id: pattern_id.into(),
                effective_date: effective,
                created_at: now,
                updated_at: now,
            },
            cycle_length_days: cycle,
        }
    }

    #[test]
    fn cycle_index_wraps_weekly() {
        let anchor = date(2026, 3, 2); // a Monday
        assert_eq!(cycle_day_index(anchor, anchor, 7), Some(0));
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 8), 7), Some(6));
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 9), 7), Some(0));
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 20), 7), Some(4));
    }

    #[test]
    fn cycle_index_rejects_dates_before_anchor_and_bad_lengths() {
        let anchor = date(2026, 3, 2);
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 1), 7), None);
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 5), 0), None);
        assert_eq!(cycle_day_index(anchor, date(2026, 3, 5), -3), None);
    }

    #[tokio::test]
    async fn override_without_shift_forces_day_off_despite_pattern() {
        let target = date(2026, 3, 4);
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(move |_, _| Ok(Some(active_assignment("pat-1", date(2026, 3, 2), 7))));
        source
            .expect_find_override()
            .returning(move |_, _| Ok(Some(override_row("emp-1", target, None))));

        let resolved = resolve_schedule(&source, "emp-1", target).await.unwrap();
        assert_eq!(resolved.day, ScheduleDay::Off);
        // Pattern id still surfaces for the audit snapshot.
        assert_eq!(resolved.schedule_id.as_deref(), Some("pat-1"));
    }

    #[tokio::test]
    async fn override_shift_wins_over_pattern() {
        let target = date(2026, 3, 4);
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(move |_, _| Ok(Some(active_assignment("pat-1", date(2026, 3, 2), 7))));
        source
            .expect_find_override()
            .returning(move |_, _| Ok(Some(override_row("emp-1", target, Some("shift-ov")))));
        source
            .expect_find_shift()
            .returning(|_| Ok(Some(fixed_shift("shift-ov"))));

        let resolved = resolve_schedule(&source, "emp-1", target).await.unwrap();
        assert!(resolved.is_working_day());
        assert_eq!(resolved.shift.unwrap().id, "shift-ov");
    }

    #[tokio::test]
    async fn no_assignment_is_unscheduled_not_off() {
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(|_, _| Ok(None));
        source.expect_find_override().returning(|_, _| Ok(None));

        let resolved = resolve_schedule(&source, "emp-1", date(2026, 3, 4))
            .await
            .unwrap();
        assert_eq!(resolved.day, ScheduleDay::Unscheduled);
        assert!(resolved.schedule_id.is_none());
    }

    #[tokio::test]
    async fn pattern_gap_resolves_to_day_off() {
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(move |_, _| Ok(Some(active_assignment("pat-1", date(2026, 3, 2), 7))));
        source.expect_find_override().returning(|_, _| Ok(None));
        source.expect_find_pattern_shift().returning(|_, _| Ok(None));

        let resolved = resolve_schedule(&source, "emp-1", date(2026, 3, 4))
            .await
            .unwrap();
        assert_eq!(resolved.day, ScheduleDay::Off);
        assert_eq!(resolved.schedule_id.as_deref(), Some("pat-1"));
    }

    #[tokio::test]
    async fn pattern_day_off_shift_is_off() {
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(move |_, _| Ok(Some(active_assignment("pat-1", date(2026, 3, 2), 7))));
        source.expect_find_override().returning(|_, _| Ok(None));
        source
            .expect_find_pattern_shift()
            .returning(|_, _| Ok(Some(day_off_shift("shift-off"))));

        let resolved = resolve_schedule(&source, "emp-1", date(2026, 3, 4))
            .await
            .unwrap();
        assert_eq!(resolved.day, ScheduleDay::Off);
    }

    #[tokio::test]
    async fn pattern_shift_resolves_by_cycle_position() {
        let mut source = MockScheduleSource::new();
        source
            .expect_find_active_assignment()
            .returning(move |_, _| Ok(Some(active_assignment("pat-1", date(2026, 3, 2), 7))));
        source.expect_find_override().returning(|_, _| Ok(None));
        source
            .expect_find_pattern_shift()
            .withf(|pattern_id, day_index| pattern_id == "pat-1" && *day_index == 2)
            .returning(|_, _| Ok(Some(fixed_shift("shift-wed"))));

        // March 4th 2026 is two days past the anchor.
        let resolved = resolve_schedule(&source, "emp-1", date(2026, 3, 4))
            .await
            .unwrap();
        assert!(resolved.is_working_day());
        assert_eq!(resolved.shift.unwrap().id, "shift-wed");
    }
}
