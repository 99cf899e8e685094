//! Shared test support for core integration tests

pub mod repositories;

use chrono::{DateTime, Utc};
use timetrail_domain::{Employee, OrgScope, TimeLog, TimeLogSource, TimeLogType, TimeSlot};
use uuid::Uuid;

/// A fixed tenant/organization scope for tests.
pub fn test_scope() -> OrgScope {
    OrgScope::new(
        Uuid::parse_str("00000000-0000-0000-0000-00000000aaaa").expect("valid uuid"),
        Uuid::parse_str("00000000-0000-0000-0000-00000000bbbb").expect("valid uuid"),
    )
}

/// Build an employee with tracking enabled inside `scope`.
pub fn test_employee(scope: OrgScope) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        tenant_id: scope.tenant_id,
        organization_id: scope.organization_id,
        is_tracking_enabled: true,
        is_online: false,
        is_tracking_time: false,
    }
}

/// Build a closed log for an employee covering `[started_at, stopped_at]`.
pub fn completed_log(
    employee: &Employee,
    started_at: DateTime<Utc>,
    stopped_at: DateTime<Utc>,
) -> TimeLog {
    TimeLog {
        id: Uuid::new_v4(),
        tenant_id: employee.tenant_id,
        organization_id: employee.organization_id,
        employee_id: employee.id,
        started_at,
        stopped_at,
        duration_secs: (stopped_at - started_at).num_seconds(),
        is_running: false,
        source: TimeLogSource::WebTimer,
        log_type: TimeLogType::Tracked,
        project_id: None,
        task_id: None,
        organization_contact_id: None,
        organization_team_id: None,
        description: None,
        is_billable: false,
        time_slots: Vec::new(),
    }
}

/// Build a running log for an employee started at `started_at`.
pub fn running_log(employee: &Employee, started_at: DateTime<Utc>) -> TimeLog {
    let mut log = completed_log(employee, started_at, started_at);
    log.is_running = true;
    log.duration_secs = 0;
    log
}

/// Attach time slots to a log.
pub fn with_slots(mut log: TimeLog, slots: Vec<TimeSlot>) -> TimeLog {
    log.time_slots = slots;
    log
}
