use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One row per (tenant, employee, date). Carries the resolved schedule
/// snapshot plus the first clock-in / latest clock-out of the day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceSummary {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub schedule_id: Option<String>,
    pub shift_id: Option<String>,
    pub schedule_in: Option<NaiveTime>,
    pub schedule_out: Option<NaiveTime>,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub clock_in_latitude: Option<f64>,
    pub clock_in_longitude: Option<f64>,
    pub clock_in_device_id: Option<String>,
    pub clock_in_image: Option<String>,
    pub clock_out_latitude: Option<f64>,
    pub clock_out_longitude: Option<f64>,
    pub clock_out_device_id: Option<String>,
    pub clock_out_image: Option<String>,
    pub work_location_id: Option<String>,
    pub late_minutes: i32,
    pub early_leave_minutes: i32,
    pub overtime_minutes: i32,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One clock-in/clock-out pair within a day. Open while
/// `clock_out_time IS NULL`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceDetail {
    pub id: String,
    pub attendance_summary_id: String,
    pub work_location_id: Option<String>,
    pub clock_in_time: DateTime<Utc>,
    pub clock_in_latitude: Option<f64>,
    pub clock_in_longitude: Option<f64>,
    pub clock_in_device_id: Option<String>,
    pub clock_in_image: Option<String>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub clock_out_latitude: Option<f64>,
    pub clock_out_longitude: Option<f64>,
    pub clock_out_device_id: Option<String>,
    pub clock_out_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceDetail {
    pub fn is_open(&self) -> bool {
        self.clock_out_time.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Alpha,
    Sick,
    Permit,
    Leave,
    Off,
    Holiday,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Alpha => "alpha",
            AttendanceStatus::Sick => "sick",
            AttendanceStatus::Permit => "permit",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::Off => "off",
            AttendanceStatus::Holiday => "holiday",
        }
    }

    /// HR-set statuses that lock out self-service punching for the day.
    pub fn blocks_punching(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Leave
                | AttendanceStatus::Sick
                | AttendanceStatus::Permit
                | AttendanceStatus::Holiday
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Alpha => "Absent Without Notice",
            AttendanceStatus::Sick => "Sick",
            AttendanceStatus::Permit => "Permit",
            AttendanceStatus::Leave => "On Leave",
            AttendanceStatus::Off => "Day Off",
            AttendanceStatus::Holiday => "Public Holiday",
        }
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Alpha
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClockInPayload {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub device_id: Option<String>,
    /// Storage reference for the punch photo, uploaded out of band.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClockOutPayload {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub device_id: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub schedule_in: Option<NaiveTime>,
    pub schedule_out: Option<NaiveTime>,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub late_minutes: i32,
    pub early_leave_minutes: i32,
    pub overtime_minutes: i32,
    pub message: Option<String>,
}

impl AttendanceResponse {
    pub fn from_summary(summary: AttendanceSummary, message: Option<String>) -> Self {
        AttendanceResponse {
            id: summary.id,
            date: summary.date,
            status: summary.status,
            schedule_in: summary.schedule_in,
            schedule_out: summary.schedule_out,
            clock_in: summary.clock_in,
            clock_out: summary.clock_out,
            late_minutes: summary.late_minutes,
            early_leave_minutes: summary.early_leave_minutes,
            overtime_minutes: summary.overtime_minutes,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub work_location_id: Option<String>,
    pub clock_in_device_id: Option<String>,
    pub clock_out_device_id: Option<String>,
}

impl From<AttendanceDetail> for SessionResponse {
    fn from(detail: AttendanceDetail) -> Self {
        SessionResponse {
            id: detail.id,
            clock_in_time: detail.clock_in_time,
            clock_out_time: detail.clock_out_time,
            work_location_id: detail.work_location_id,
            clock_in_device_id: detail.clock_in_device_id,
            clock_out_device_id: detail.clock_out_device_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentStatusResponse {
    pub status_code: String,
    pub message: String,
    pub employee_name: String,
    pub clock_in_display: String,
    pub clock_out_display: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDayResponse {
    pub id: String,
    pub date: NaiveDate,
    pub shift_name: Option<String>,
    pub status: AttendanceStatus,
    pub late_minutes: i32,
    pub is_late: bool,
    pub work_minutes: i64,
    pub break_deducted: i64,
    pub sessions: Vec<SessionResponse>,
}

impl AttendanceSummary {
    pub fn new_for_punch(
        tenant_id: String,
        employee_id: String,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            employee_id,
            date,
            schedule_id: None,
            shift_id: None,
            schedule_in: None,
            schedule_out: None,
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
        }
    }

    pub fn has_recorded_attendance(&self) -> bool {
        self.clock_in.is_some()
    }
}
