//! Leave and overtime approval chains.
//!
//! Quota is booked exactly once, at submission, under a row lock. Editing
//! refunds the old booking and books the new window; cancellation and
//! rejection refund; HR finalization only confirms the booking and applies
//! the day-summary side effects.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::approval_status::ApprovalStatus;
use crate::models::attendance::AttendanceStatus;
use crate::models::employee::Employee;
use crate::models::leave::{
    leave_duration_days, CreateLeavePayload, LeaveRequest, UpdateLeavePayload,
};
use crate::models::overtime::{CreateOvertimePayload, OvertimeRequest};
use crate::models::shift::ShiftKind;
use crate::repositories::attendance;
use crate::repositories::employee as employee_repo;
use crate::repositories::leave as leave_repo;
use crate::repositories::overtime as overtime_repo;
use crate::repositories::schedule::PgScheduleSource;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::services::schedule_resolver::resolve_schedule;
use crate::services::employee_timezone;
use crate::utils::time::{scheduled_out_instant, today_local};

// ---------------------------------------------------------------------------
// Transition guards
// ---------------------------------------------------------------------------

pub fn may_approve_as_supervisor(
    actor: &Employee,
    requester: &Employee,
    status: ApprovalStatus,
) -> bool {
    status.is_pending() && requester.supervisor_id.as_deref() == Some(actor.id.as_str())
}

/// Managers act after the supervisor, or straight from `pending` when the
/// requester has nobody above them but the manager.
pub fn may_approve_as_manager(
    actor: &Employee,
    requester: &Employee,
    status: ApprovalStatus,
) -> bool {
    let is_manager = requester.manager_id.as_deref() == Some(actor.id.as_str());
    if !is_manager {
        return false;
    }
    match status {
        ApprovalStatus::ApprovedBySupervisor => true,
        ApprovalStatus::Pending => requester.supervisor_id.is_none(),
        _ => false,
    }
}

pub fn may_finalize_as_hr(actor: &Employee, status: ApprovalStatus) -> bool {
    actor.is_hr && status.hr_may_finalize()
}

pub fn may_reject(actor: &Employee, requester: &Employee, status: ApprovalStatus) -> bool {
    if status.is_terminal() {
        return false;
    }
    actor.is_hr
        || requester.supervisor_id.as_deref() == Some(actor.id.as_str())
        || requester.manager_id.as_deref() == Some(actor.id.as_str())
}

/// Whole months of service between two dates.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}

/// Overtime granted at final approval: the actual minutes past the
/// scheduled end, clamped to what was requested. `None` when the employee
/// did not actually stay past schedule.
pub fn overtime_minutes_granted(
    date: NaiveDate,
    schedule_in: Option<NaiveTime>,
    schedule_out: NaiveTime,
    clock_out: DateTime<Utc>,
    requested_minutes: i32,
    tz: &Tz,
) -> Option<i32> {
    let scheduled = scheduled_out_instant(date, schedule_in, schedule_out, tz);
    if clock_out <= scheduled {
        return None;
    }
    let actual = (clock_out - scheduled).num_minutes() as i32;
    Some(actual.min(requested_minutes))
}

fn forbidden_stage() -> AppError {
    AppError::Forbidden(
        "You are not authorized to act on this request at its current stage.".to_string(),
    )
}

// ---------------------------------------------------------------------------
// Leave requests
// ---------------------------------------------------------------------------

async fn check_leave_window(
    db: &PgPool,
    employee: &Employee,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_request: Option<&str>,
) -> Result<i32, AppError> {
    if start_date > end_date {
        return Err(AppError::BadRequest(
            "start_date must be on or before end_date".to_string(),
        ));
    }
    let duration = leave_duration_days(start_date, end_date) as i32;

    if leave_repo::overlap_exists(db, &employee.id, start_date, end_date, exclude_request).await? {
        return Err(AppError::BadRequest(
            "You already have a leave request within this date range.".to_string(),
        ));
    }

    if let Some(date) =
        attendance::first_attended_date_between(db, &employee.id, start_date, end_date).await?
    {
        return Err(AppError::BadRequest(format!(
            "Request rejected. You already have recorded attendance on {}.",
            date
        )));
    }

    Ok(duration)
}

pub async fn submit_leave(
    db: &PgPool,
    config: &Config,
    employee: &Employee,
    payload: &CreateLeavePayload,
) -> Result<LeaveRequest, AppError> {
    let leave_type = leave_repo::find_type(db, &payload.leave_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    if leave_type.requires_file && payload.attachment.is_none() {
        return Err(AppError::BadRequest(
            "This leave type requires an attachment.".to_string(),
        ));
    }

    if leave_type.min_months_of_service > 0 {
        let join_date = employee.join_date.ok_or_else(|| {
            AppError::BadRequest("Join date has not been set by HR.".to_string())
        })?;
        let served = months_between(join_date, today_local(&config.time_zone));
        if served < leave_type.min_months_of_service {
            return Err(AppError::BadRequest(format!(
                "Not enough months of service. Minimum: {} months.",
                leave_type.min_months_of_service
            )));
        }
    }

    let duration =
        check_leave_window(db, employee, payload.start_date, payload.end_date, None).await?;

    let request = LeaveRequest::new(
        employee.tenant_id.clone(),
        employee.id.clone(),
        leave_type.id.clone(),
        payload.start_date,
        payload.end_date,
        duration,
        payload.reason.clone(),
        payload.attachment.clone(),
    );

    let mut tx = begin_transaction(db).await?;
    if leave_type.deducts_quota {
        let year = payload.start_date.year();
        let balance =
            leave_repo::find_balance_for_update(&mut tx, &employee.id, &leave_type.id, year)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Leave balance for {} is not available. Contact HR.",
                        year
                    ))
                })?;
        if balance.remaining() < duration {
            return Err(AppError::BadRequest(format!(
                "Insufficient leave balance. Remaining: {}, requested: {}.",
                balance.remaining(),
                duration
            )));
        }
        leave_repo::add_taken(&mut tx, &balance.id, duration).await?;
    }
    leave_repo::insert_request(&mut tx, &request).await?;
    commit_transaction(tx).await?;

    Ok(request)
}

pub async fn update_leave(
    db: &PgPool,
    employee: &Employee,
    request_id: &str,
    payload: &UpdateLeavePayload,
) -> Result<LeaveRequest, AppError> {
    let request = leave_repo::find_request_for_employee(db, request_id, &employee.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))?;

    if !request.status.is_pending() {
        return Err(AppError::Conflict(
            "Only pending requests can be edited.".to_string(),
        ));
    }

    let old_type = leave_repo::find_type(db, &request.leave_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    let new_type_id = payload
        .leave_type_id
        .clone()
        .unwrap_or_else(|| request.leave_type_id.clone());
    let new_type = leave_repo::find_type(db, &new_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    let start_date = payload.start_date.unwrap_or(request.start_date);
    let end_date = payload.end_date.unwrap_or(request.end_date);
    let reason = payload.reason.clone().unwrap_or_else(|| request.reason.clone());
    let attachment = payload.attachment.clone().or_else(|| request.attachment.clone());

    if new_type.requires_file && attachment.is_none() {
        return Err(AppError::BadRequest(
            "This leave type requires an attachment.".to_string(),
        ));
    }

    let duration =
        check_leave_window(db, employee, start_date, end_date, Some(&request.id)).await?;

    let mut tx = begin_transaction(db).await?;

    // Give the old booking back before booking the new window, so moving a
    // request within the same balance never double-counts.
    if old_type.deducts_quota {
        let year = request.start_date.year();
        if let Some(balance) =
            leave_repo::find_balance_for_update(&mut tx, &employee.id, &old_type.id, year).await?
        {
            leave_repo::add_taken(&mut tx, &balance.id, -request.duration_days).await?;
        }
    }

    if new_type.deducts_quota {
        let year = start_date.year();
        let balance =
            leave_repo::find_balance_for_update(&mut tx, &employee.id, &new_type.id, year)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Leave balance for {} is not available. Contact HR.",
                        year
                    ))
                })?;
        if balance.remaining() < duration {
            return Err(AppError::BadRequest(format!(
                "Insufficient leave balance for the new window. Remaining: {}, requested: {}.",
                balance.remaining(),
                duration
            )));
        }
        leave_repo::add_taken(&mut tx, &balance.id, duration).await?;
    }

    leave_repo::update_request_window(
        &mut tx,
        &request.id,
        &new_type.id,
        start_date,
        end_date,
        duration,
        &reason,
        attachment.as_deref(),
    )
    .await?;
    commit_transaction(tx).await?;

    leave_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))
}

pub async fn cancel_leave(
    db: &PgPool,
    employee: &Employee,
    request_id: &str,
) -> Result<(), AppError> {
    let request = leave_repo::find_request_for_employee(db, request_id, &employee.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))?;

    if !request.status.is_pending() {
        return Err(AppError::Conflict(
            "Only pending requests can be cancelled.".to_string(),
        ));
    }

    let leave_type = leave_repo::find_type(db, &request.leave_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    let mut tx = begin_transaction(db).await?;
    if leave_type.deducts_quota {
        let year = request.start_date.year();
        if let Some(balance) =
            leave_repo::find_balance_for_update(&mut tx, &employee.id, &leave_type.id, year)
                .await?
        {
            leave_repo::add_taken(&mut tx, &balance.id, -request.duration_days).await?;
        }
    }
    leave_repo::set_status(&mut tx, &request.id, ApprovalStatus::Cancelled, None, None, None)
        .await?;
    commit_transaction(tx).await?;
    Ok(())
}

async fn load_leave_request_and_requester(
    db: &PgPool,
    request_id: &str,
) -> Result<(LeaveRequest, Employee), AppError> {
    let request = leave_repo::find_request(db, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))?;
    let requester = employee_repo::find_by_id(db, &request.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Requesting employee not found.".to_string()))?;
    Ok((request, requester))
}

pub async fn approve_leave_as_supervisor(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<LeaveRequest, AppError> {
    let (request, requester) = load_leave_request_and_requester(db, request_id).await?;
    if !may_approve_as_supervisor(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }
    let mut tx = begin_transaction(db).await?;
    leave_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedBySupervisor,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;
    commit_transaction(tx).await?;
    leave_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))
}

pub async fn approve_leave_as_manager(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<LeaveRequest, AppError> {
    let (request, requester) = load_leave_request_and_requester(db, request_id).await?;
    if !may_approve_as_manager(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }
    let mut tx = begin_transaction(db).await?;
    leave_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedByManager,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;
    commit_transaction(tx).await?;
    leave_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))
}

/// Final approval. Confirms the booking under lock, refuses windows that
/// collide with real attendance, and writes one day summary per covered
/// date, all inside a single transaction.
pub async fn finalize_leave(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<LeaveRequest, AppError> {
    let (request, requester) = load_leave_request_and_requester(db, request_id).await?;
    if !may_finalize_as_hr(actor, request.status) {
        return Err(forbidden_stage());
    }

    let leave_type = leave_repo::find_type(db, &request.leave_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    let mut tx = begin_transaction(db).await?;

    if leave_type.deducts_quota {
        let year = request.start_date.year();
        let balance =
            leave_repo::find_balance_for_update(&mut tx, &requester.id, &leave_type.id, year)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(
                        "Leave balance row is missing; approval aborted.".to_string(),
                    )
                })?;
        // The days were booked at submission; a negative remainder means the
        // ledger was changed underneath us.
        if balance.remaining() < 0 {
            return Err(AppError::Conflict(
                "Leave balance is inconsistent; approval aborted.".to_string(),
            ));
        }
    }

    if let Some(date) = attendance::first_attended_date_between(
        db,
        &requester.id,
        request.start_date,
        request.end_date,
    )
    .await?
    {
        return Err(AppError::Conflict(format!(
            "Employee already has recorded attendance on {}; resolve the conflict first.",
            date
        )));
    }

    let source = PgScheduleSource::new(db.clone());
    let status = leave_type.category.summary_status();
    let mut date = request.start_date;
    while date <= request.end_date {
        let resolved = resolve_schedule(&source, &requester.id, date).await?;
        let (schedule_in, schedule_out) = match resolved.shift.as_ref().and_then(|s| s.kind()) {
            Some(ShiftKind::Fixed { start, end }) => (Some(start), Some(end)),
            _ => (None, None),
        };
        attendance::upsert_leave_day(
            &mut tx,
            &Uuid::new_v4().to_string(),
            &request.tenant_id,
            &requester.id,
            date,
            status,
            resolved.schedule_id.as_deref(),
            resolved.shift.as_ref().map(|s| s.id.as_str()),
            schedule_in,
            schedule_out,
        )
        .await?;
        date += Duration::days(1);
    }

    leave_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedByHr,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;
    commit_transaction(tx).await?;

    leave_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))
}

pub async fn reject_leave(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
    rejection_reason: &str,
) -> Result<LeaveRequest, AppError> {
    let (request, requester) = load_leave_request_and_requester(db, request_id).await?;
    if !may_reject(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }

    let leave_type = leave_repo::find_type(db, &request.leave_type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown leave type.".to_string()))?;

    let mut tx = begin_transaction(db).await?;
    // A rejected request no longer occupies its booked days.
    if leave_type.deducts_quota && request.status.holds_booking() {
        let year = request.start_date.year();
        if let Some(balance) =
            leave_repo::find_balance_for_update(&mut tx, &requester.id, &leave_type.id, year)
                .await?
        {
            leave_repo::add_taken(&mut tx, &balance.id, -request.duration_days).await?;
        }
    }
    leave_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::Rejected,
        Some(actor_user_id),
        Some(Utc::now()),
        Some(rejection_reason),
    )
    .await?;
    commit_transaction(tx).await?;

    leave_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found.".to_string()))
}

// ---------------------------------------------------------------------------
// Overtime requests
// ---------------------------------------------------------------------------

pub async fn submit_overtime(
    db: &PgPool,
    config: &Config,
    employee: &Employee,
    payload: &CreateOvertimePayload,
) -> Result<OvertimeRequest, AppError> {
    if overtime_repo::conflict_exists(db, &employee.id, payload.date, None).await? {
        return Err(AppError::BadRequest(
            "You already have an overtime request for this date.".to_string(),
        ));
    }

    let summary = attendance::find_summary(db, &employee.id, payload.date)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(
                "No attendance record found. Clock in before requesting overtime.".to_string(),
            )
        })?;

    if matches!(
        summary.status,
        AttendanceStatus::Leave
            | AttendanceStatus::Sick
            | AttendanceStatus::Permit
            | AttendanceStatus::Alpha
    ) {
        return Err(AppError::BadRequest(
            "Overtime cannot be requested while on leave, sick, permit, or absent.".to_string(),
        ));
    }

    if summary.clock_in.is_none() && summary.clock_out.is_none() {
        return Err(AppError::BadRequest(
            "Attendance times have not been recorded yet.".to_string(),
        ));
    }

    if let (Some(schedule_out), Some(clock_out)) = (summary.schedule_out, summary.clock_out) {
        let tz = employee_timezone(db, employee, config).await?;
        match overtime_minutes_granted(
            summary.date,
            summary.schedule_in,
            schedule_out,
            clock_out,
            i32::MAX,
            &tz,
        ) {
            None => {
                return Err(AppError::BadRequest(
                    "According to attendance data you left on time or early; overtime cannot \
                     be requested."
                        .to_string(),
                ));
            }
            Some(actual_excess) => {
                if payload.duration_minutes > actual_excess {
                    return Err(AppError::BadRequest(format!(
                        "Requested duration ({} minutes) exceeds your actual excess ({} minutes).",
                        payload.duration_minutes, actual_excess
                    )));
                }
            }
        }
    }

    let request = OvertimeRequest::new(
        employee.tenant_id.clone(),
        employee.id.clone(),
        payload.date,
        payload.duration_minutes,
        payload.reason.clone(),
    );
    overtime_repo::insert_request(db, &request).await?;
    Ok(request)
}

pub async fn cancel_overtime(
    db: &PgPool,
    employee: &Employee,
    request_id: &str,
) -> Result<(), AppError> {
    let request = overtime_repo::find_request_for_employee(db, request_id, &employee.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))?;

    if !request.status.is_pending() {
        return Err(AppError::Conflict(
            "Only pending requests can be cancelled.".to_string(),
        ));
    }

    let mut tx = begin_transaction(db).await?;
    overtime_repo::set_status(&mut tx, &request.id, ApprovalStatus::Cancelled, None, None, None)
        .await?;
    commit_transaction(tx).await?;
    Ok(())
}

async fn load_overtime_request_and_requester(
    db: &PgPool,
    request_id: &str,
) -> Result<(OvertimeRequest, Employee), AppError> {
    let request = overtime_repo::find_request(db, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))?;
    let requester = employee_repo::find_by_id(db, &request.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Requesting employee not found.".to_string()))?;
    Ok((request, requester))
}

pub async fn approve_overtime_as_supervisor(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<OvertimeRequest, AppError> {
    let (request, requester) = load_overtime_request_and_requester(db, request_id).await?;
    if !may_approve_as_supervisor(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }
    let mut tx = begin_transaction(db).await?;
    overtime_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedBySupervisor,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;
    commit_transaction(tx).await?;
    overtime_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))
}

pub async fn approve_overtime_as_manager(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<OvertimeRequest, AppError> {
    let (request, requester) = load_overtime_request_and_requester(db, request_id).await?;
    if !may_approve_as_manager(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }
    let mut tx = begin_transaction(db).await?;
    overtime_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedByManager,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;
    commit_transaction(tx).await?;
    overtime_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))
}

/// Final approval recomputes the granted minutes from the day's actual
/// times and never writes more than was requested.
pub async fn finalize_overtime(
    db: &PgPool,
    config: &Config,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
) -> Result<OvertimeRequest, AppError> {
    let (request, requester) = load_overtime_request_and_requester(db, request_id).await?;
    if !may_finalize_as_hr(actor, request.status) {
        return Err(forbidden_stage());
    }

    let mut tx = begin_transaction(db).await?;
    overtime_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::ApprovedByHr,
        Some(actor_user_id),
        Some(Utc::now()),
        None,
    )
    .await?;

    if let Some(summary) = attendance::find_summary(db, &requester.id, request.date).await? {
        if let (Some(schedule_out), Some(clock_out)) = (summary.schedule_out, summary.clock_out) {
            let tz = employee_timezone(db, &requester, config).await?;
            if let Some(granted) = overtime_minutes_granted(
                summary.date,
                summary.schedule_in,
                schedule_out,
                clock_out,
                request.duration_minutes,
                &tz,
            ) {
                attendance::update_overtime_minutes(&mut tx, &summary.id, granted).await?;
            }
        }
    }
    commit_transaction(tx).await?;

    overtime_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))
}

pub async fn reject_overtime(
    db: &PgPool,
    actor: &Employee,
    actor_user_id: &str,
    request_id: &str,
    rejection_reason: &str,
) -> Result<OvertimeRequest, AppError> {
    let (request, requester) = load_overtime_request_and_requester(db, request_id).await?;
    if !may_reject(actor, &requester, request.status) {
        return Err(forbidden_stage());
    }
    let mut tx = begin_transaction(db).await?;
    overtime_repo::set_status(
        &mut tx,
        &request.id,
        ApprovalStatus::Rejected,
        Some(actor_user_id),
        Some(Utc::now()),
        Some(rejection_reason),
    )
    .await?;
    commit_transaction(tx).await?;
    overtime_repo::find_request(db, &request.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Overtime request not found.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::EmploymentStatus;
    use chrono::TimeZone;
    use chrono_tz::Asia::Jakarta;

    fn employee(id: &str) -> Employee {
        let now = Utc::now();
        Employee {
            id: id.into(),
            tenant_id: "tenant-1".into(),
            user_id: Some(format!("user-{}", id)),
            full_name: format!("Employee {}", id),
            employment_status: EmploymentStatus::Active,
            work_location_id: None,
            is_flexible_location: false,
            registered_device_id: None,
            attendance_required: true,
            supervisor_id: None,
            manager_id: None,
            is_hr: false,
            join_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn supervisor_guard_requires_direct_report_and_pending() {
        let supervisor = employee("spv");
        let mut requester = employee("emp");
        requester.supervisor_id = Some("spv".into());

        assert!(may_approve_as_supervisor(
            &supervisor,
            &requester,
            ApprovalStatus::Pending
        ));
        assert!(!may_approve_as_supervisor(
            &supervisor,
            &requester,
            ApprovalStatus::ApprovedBySupervisor
        ));

        let stranger = employee("other");
        assert!(!may_approve_as_supervisor(
            &stranger,
            &requester,
            ApprovalStatus::Pending
        ));
    }

    #[test]
    fn manager_guard_follows_supervisor_or_bypasses_missing_one() {
        let manager = employee("mgr");
        let mut requester = employee("emp");
        requester.manager_id = Some("mgr".into());
        requester.supervisor_id = Some("spv".into());

        assert!(may_approve_as_manager(
            &manager,
            &requester,
            ApprovalStatus::ApprovedBySupervisor
        ));
        // Supervisor exists, so no shortcut from pending.
        assert!(!may_approve_as_manager(
            &manager,
            &requester,
            ApprovalStatus::Pending
        ));

        requester.supervisor_id = None;
        assert!(may_approve_as_manager(
            &manager,
            &requester,
            ApprovalStatus::Pending
        ));
    }

    #[test]
    fn hr_guard_bypasses_the_chain_but_not_terminal_states() {
        let mut hr = employee("hr");
        hr.is_hr = true;

        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::ApprovedBySupervisor,
            ApprovalStatus::ApprovedByManager,
        ] {
            assert!(may_finalize_as_hr(&hr, status), "{:?}", status);
        }
        assert!(!may_finalize_as_hr(&hr, ApprovalStatus::Rejected));
        assert!(!may_finalize_as_hr(&hr, ApprovalStatus::ApprovedByHr));

        let not_hr = employee("emp");
        assert!(!may_finalize_as_hr(&not_hr, ApprovalStatus::Pending));
    }

    #[test]
    fn rejection_allowed_for_chain_members_until_terminal() {
        let mut requester = employee("emp");
        requester.supervisor_id = Some("spv".into());
        requester.manager_id = Some("mgr".into());

        let supervisor = employee("spv");
        let manager = employee("mgr");
        let mut hr = employee("hr");
        hr.is_hr = true;
        let stranger = employee("other");

        assert!(may_reject(&supervisor, &requester, ApprovalStatus::ApprovedByManager));
        assert!(may_reject(&manager, &requester, ApprovalStatus::Pending));
        assert!(may_reject(&hr, &requester, ApprovalStatus::ApprovedBySupervisor));
        assert!(!may_reject(&stranger, &requester, ApprovalStatus::Pending));
        assert!(!may_reject(&hr, &requester, ApprovalStatus::ApprovedByHr));
        assert!(!may_reject(&hr, &requester, ApprovalStatus::Cancelled));
    }

    #[test]
    fn months_between_counts_whole_months() {
        let join = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(months_between(join, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()), 6);
        assert_eq!(months_between(join, NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()), 5);
        assert_eq!(months_between(join, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()), 0);
        assert_eq!(months_between(join, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()), 0);
    }

    #[test]
    fn overtime_grant_is_clamped_to_request() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let schedule_in = NaiveTime::from_hms_opt(9, 0, 0);
        let schedule_out = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        // Left 90 minutes after schedule.
        let clock_out = Jakarta
            .with_ymd_and_hms(2026, 3, 2, 18, 30, 0)
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            overtime_minutes_granted(date, schedule_in, schedule_out, clock_out, 60, &Jakarta),
            Some(60)
        );
        assert_eq!(
            overtime_minutes_granted(date, schedule_in, schedule_out, clock_out, 120, &Jakarta),
            Some(90)
        );
    }

    #[test]
    fn overtime_grant_requires_actually_staying_late() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let schedule_out = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let clock_out = Jakarta
            .with_ymd_and_hms(2026, 3, 2, 16, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            overtime_minutes_granted(
                date,
                NaiveTime::from_hms_opt(9, 0, 0),
                schedule_out,
                clock_out,
                60,
                &Jakarta
            ),
            None
        );
    }

    #[test]
    fn night_shift_overtime_measures_past_next_day_end() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let schedule_in = NaiveTime::from_hms_opt(22, 0, 0);
        let schedule_out = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        // Scheduled end is 06:00 on March 3rd; leaving 07:00 is 60 minutes over.
        let clock_out = Jakarta
            .with_ymd_and_hms(2026, 3, 3, 7, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            overtime_minutes_granted(date, schedule_in, schedule_out, clock_out, 90, &Jakarta),
            Some(60)
        );
    }
}
