//! Approval-chain guards and overtime clamping through the public API.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Jakarta;

use presensi_backend::models::approval_status::ApprovalStatus;
use presensi_backend::models::employee::{Employee, EmploymentStatus};
use presensi_backend::models::leave::{leave_duration_days, LeaveBalance};
use presensi_backend::services::approval::{
    may_approve_as_manager, may_approve_as_supervisor, may_finalize_as_hr, may_reject,
    overtime_minutes_granted,
};

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
fn chain_walks_supervisor_then_manager_then_hr() {
    let supervisor = employee("spv");
    let manager = employee("mgr");
    let mut hr = employee("hr");
    hr.is_hr = true;

    let mut requester = employee("emp");
    requester.supervisor_id = Some("spv".into());
    requester.manager_id = Some("mgr".into());

    // Stage 1: only the direct supervisor may act on pending.
    assert!(may_approve_as_supervisor(&supervisor, &requester, ApprovalStatus::Pending));
    assert!(!may_approve_as_manager(&manager, &requester, ApprovalStatus::Pending));

    // Stage 2: the manager acts after the supervisor.
    assert!(may_approve_as_manager(
        &manager,
        &requester,
        ApprovalStatus::ApprovedBySupervisor
    ));
    assert!(!may_approve_as_supervisor(
        &supervisor,
        &requester,
        ApprovalStatus::ApprovedBySupervisor
    ));

    // Stage 3: HR finalizes from any chain state.
    assert!(may_finalize_as_hr(&hr, ApprovalStatus::ApprovedByManager));
    assert!(may_finalize_as_hr(&hr, ApprovalStatus::Pending));
    assert!(!may_finalize_as_hr(&hr, ApprovalStatus::ApprovedByHr));
}

#[test]
fn manager_bypass_applies_only_without_a_supervisor() {
    let manager = employee("mgr");
    let mut requester = employee("emp");
    requester.manager_id = Some("mgr".into());

    requester.supervisor_id = None;
    assert!(may_approve_as_manager(&manager, &requester, ApprovalStatus::Pending));

    requester.supervisor_id = Some("spv".into());
    assert!(!may_approve_as_manager(&manager, &requester, ApprovalStatus::Pending));
}

#[test]
fn only_chain_members_or_hr_reject_and_never_after_terminal() {
    let mut requester = employee("emp");
    requester.supervisor_id = Some("spv".into());
    requester.manager_id = Some("mgr".into());

    let supervisor = employee("spv");
    let stranger = employee("other");
    let mut hr = employee("hr");
    hr.is_hr = true;

    assert!(may_reject(&supervisor, &requester, ApprovalStatus::Pending));
    assert!(may_reject(&hr, &requester, ApprovalStatus::ApprovedByManager));
    assert!(!may_reject(&stranger, &requester, ApprovalStatus::Pending));

    for terminal in [
        ApprovalStatus::ApprovedByHr,
        ApprovalStatus::Rejected,
        ApprovalStatus::Cancelled,
    ] {
        assert!(!may_reject(&hr, &requester, terminal), "{:?}", terminal);
    }
}

#[test]
fn balance_arithmetic_matches_the_quota_examples() {
    let now = Utc::now();
    let mut balance = LeaveBalance {
        id: "bal".into(),
        employee_id: "emp".into(),
        leave_type_id: "annual".into(),
        year: 2026,
        entitlement: 2,
        carried_over: 0,
        taken: 0,
        created_at: now,
        updated_at: now,
    };

    let start = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 5, 6).unwrap();
    // A three-day request cannot be booked against two remaining days.
    assert!(balance.remaining() < leave_duration_days(start, end) as i32);

    // A two-day booking drains the balance to zero...
    balance.taken += 2;
    assert_eq!(balance.remaining(), 0);
    // ...and the cancellation refund restores it in full.
    balance.taken -= 2;
    assert_eq!(balance.remaining(), 2);
}

#[test]
fn approved_overtime_is_never_more_than_requested() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let schedule_in = NaiveTime::from_hms_opt(9, 0, 0);
    let schedule_out = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    let clock_out = Jakarta
        .with_ymd_and_hms(2026, 3, 2, 19, 0, 0)
        .unwrap()
        .with_timezone(&Utc);

    // Stayed 120 minutes; asked for 45; granted 45.
    assert_eq!(
        overtime_minutes_granted(date, schedule_in, schedule_out, clock_out, 45, &Jakarta),
        Some(45)
    );
    // Asked for 180; granted only the actual 120.
    assert_eq!(
        overtime_minutes_granted(date, schedule_in, schedule_out, clock_out, 180, &Jakarta),
        Some(120)
    );
}

#[test]
fn overtime_denied_when_the_employee_left_on_time() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let schedule_out = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    let clock_out = Jakarta
        .with_ymd_and_hms(2026, 3, 2, 17, 0, 0)
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
