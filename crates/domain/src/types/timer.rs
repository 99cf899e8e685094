//! Timer operation requests and derived status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_log::{TimeLog, TimeLogSource, TimeLogType};
use super::OrgScope;

/// Input for starting a timer.
///
/// The employee is always resolved from the caller's identity (`user_id`)
/// within the scope; the request never names an employee directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub user_id: Uuid,
    pub scope: OrgScope,
    /// Defaults to now, normalized to UTC.
    pub started_at: Option<DateTime<Utc>>,
    pub source: Option<TimeLogSource>,
    pub log_type: Option<TimeLogType>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub organization_contact_id: Option<Uuid>,
    pub organization_team_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_billable: Option<bool>,
}

impl StartTimerRequest {
    /// Minimal request carrying only the caller identity and scope.
    pub fn new(user_id: Uuid, scope: OrgScope) -> Self {
        Self {
            user_id,
            scope,
            started_at: None,
            source: None,
            log_type: None,
            project_id: None,
            task_id: None,
            organization_contact_id: None,
            organization_team_id: None,
            description: None,
            is_billable: None,
        }
    }
}

/// Input for stopping the running timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTimerRequest {
    pub user_id: Uuid,
    pub scope: OrgScope,
    /// Caller-reported start of the range being stopped, used only for
    /// request-level date validation.
    pub started_at: Option<DateTime<Utc>>,
    /// Defaults to now.
    pub stopped_at: Option<DateTime<Utc>>,
    pub source: Option<TimeLogSource>,
    /// Set by clients that record their own manual time slots.
    pub manual_time_slot: bool,
}

impl StopTimerRequest {
    /// Minimal request carrying only the caller identity and scope.
    pub fn new(user_id: Uuid, scope: OrgScope) -> Self {
        Self {
            user_id,
            scope,
            started_at: None,
            stopped_at: None,
            source: None,
            manual_time_slot: false,
        }
    }
}

/// Input for the single-employee timer status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatusRequest {
    pub user_id: Uuid,
    pub scope: OrgScope,
    /// Only honored when `has_elevated_permission` is set; otherwise the
    /// caller's own employee record is used.
    pub employee_id: Option<Uuid>,
    pub has_elevated_permission: bool,
    pub source: Option<TimeLogSource>,
    /// Defaults to the start of the current UTC calendar day.
    pub today_start: Option<DateTime<Utc>>,
    /// Defaults to the end of the current UTC calendar day.
    pub today_end: Option<DateTime<Utc>>,
}

impl TimerStatusRequest {
    /// Status query for the caller's own employee over the default window.
    pub fn new(user_id: Uuid, scope: OrgScope) -> Self {
        Self {
            user_id,
            scope,
            employee_id: None,
            has_elevated_permission: false,
            source: None,
            today_start: None,
            today_end: None,
        }
    }
}

/// Input for the batched worked-status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkedStatusRequest {
    pub user_id: Uuid,
    pub scope: OrgScope,
    /// Without elevated permission this list is ignored and the caller's own
    /// employee id is used.
    pub employee_ids: Vec<Uuid>,
    pub has_elevated_permission: bool,
    pub source: Option<TimeLogSource>,
    pub organization_team_id: Option<Uuid>,
}

/// Coarse classification of an employee's most recent log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkedStatus {
    Running,
    Paused,
    Idle,
}

/// Derived timer status. Computed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatus {
    pub duration_secs: i64,
    pub running: bool,
    pub last_log: Option<TimeLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worked_status: Option<WorkedStatus>,
}

/// Best-effort side effect that failed after the primary operation already
/// succeeded. Advisory only; never rolls back the stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum AdvisoryFailure {
    ConflictResolution(String),
    EventPublish(String),
}

/// Result of a stop operation: the closed log plus any advisory failures
/// from secondary bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopOutcome {
    pub log: TimeLog,
    pub advisories: Vec<AdvisoryFailure>,
}
