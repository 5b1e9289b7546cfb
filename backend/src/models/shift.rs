//! Shift templates and their tagged-variant view.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw shift row. The nullable column combination is only ever interpreted
/// through [`Shift::kind`]; downstream logic switches on the variant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shift {
    pub id: String,
    pub name: String,
    pub is_day_off: bool,
    pub is_flexible: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub daily_target_minutes: Option<i32>,
    pub break_duration_minutes: i32,
    pub late_tolerance_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured interpretation of a shift row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    DayOff,
    Flexible { target_minutes: i32 },
    Fixed { start: NaiveTime, end: NaiveTime },
}

impl ShiftKind {
    /// A fixed shift whose end wall-time precedes its start crosses midnight.
    pub fn is_night(&self) -> bool {
        matches!(self, ShiftKind::Fixed { start, end } if end < start)
    }
}

impl Shift {
    /// Classifies the row; `None` means the column combination is invalid
    /// (e.g. a fixed shift missing its times) and must be treated as a
    /// configuration error, never defaulted.
    pub fn kind(&self) -> Option<ShiftKind> {
        if self.is_day_off {
            return Some(ShiftKind::DayOff);
        }
        if self.is_flexible {
            return self
                .daily_target_minutes
                .map(|target_minutes| ShiftKind::Flexible { target_minutes });
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(ShiftKind::Fixed { start, end }),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self.kind() {
            Some(ShiftKind::DayOff) => format!("{} (OFF)", self.name),
            Some(ShiftKind::Flexible { target_minutes }) => {
                format!("{} ({} minutes)", self.name, target_minutes)
            }
            Some(ShiftKind::Fixed { start, end }) => format!(
                "{} ({} - {})",
                self.name,
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateShiftPayload {
    pub name: Option<String>,
    pub is_day_off: Option<bool>,
    pub is_flexible: Option<bool>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub daily_target_minutes: Option<i32>,
    pub break_duration_minutes: Option<i32>,
    pub late_tolerance_minutes: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_shift() -> Shift {
        let now = Utc::now();
        Shift {
            id: "shift-1".into(),
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

    #[test]
    fn fixed_shift_kind() {
        let shift = base_shift();
        assert_eq!(
            shift.kind(),
            Some(ShiftKind::Fixed {
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            })
        );
        assert!(!shift.kind().unwrap().is_night());
    }

    #[test]
    fn night_shift_is_detected_from_wall_times() {
        let mut shift = base_shift();
        shift.start_time = NaiveTime::from_hms_opt(22, 0, 0);
        shift.end_time = NaiveTime::from_hms_opt(6, 0, 0);
        assert!(shift.kind().unwrap().is_night());
    }

    #[test]
    fn day_off_wins_over_other_flags() {
        let mut shift = base_shift();
        shift.is_day_off = true;
        shift.is_flexible = true;
        assert_eq!(shift.kind(), Some(ShiftKind::DayOff));
    }

    #[test]
    fn flexible_without_target_is_invalid() {
        let mut shift = base_shift();
        shift.is_flexible = true;
        shift.daily_target_minutes = None;
        assert_eq!(shift.kind(), None);

        shift.daily_target_minutes = Some(480);
        assert_eq!(shift.kind(), Some(ShiftKind::Flexible { target_minutes: 480 }));
    }

    #[test]
    fn fixed_without_times_is_invalid() {
        let mut shift = base_shift();
        shift.end_time = None;
        assert_eq!(shift.kind(), None);
    }
}
