//! Port interfaces for the timer engine
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrail_domain::{
    Employee, OrgScope, Result, TimeLog, TimeLogPatch, TimeLogSource, TimerEvent,
};
use uuid::Uuid;

/// Trait for resolving employees and maintaining their work-status flags.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Resolve the employee record for a user within a scope.
    async fn find_by_user(&self, user_id: Uuid, scope: OrgScope) -> Result<Option<Employee>>;

    /// Resolve an employee by id within a scope.
    async fn find_by_id(&self, employee_id: Uuid, scope: OrgScope) -> Result<Option<Employee>>;

    /// Update the `is_online`/`is_tracking_time` flags for an employee.
    ///
    /// These flags are owned by the employee record; the timer engine only
    /// writes them as a side effect of start/stop.
    async fn update_work_status(
        &self,
        employee_id: Uuid,
        is_online: bool,
        is_tracking_time: bool,
    ) -> Result<()>;
}

/// Trait for persisting time logs.
#[async_trait]
pub trait TimeLogStore: Send + Sync {
    /// The single running log for an employee, including its time slots.
    async fn find_running(&self, employee_id: Uuid, scope: OrgScope) -> Result<Option<TimeLog>>;

    /// Every running log for an employee, newest first.
    ///
    /// Under normal operation this returns zero or one entries; more than
    /// one means stray logs from a crashed session survived.
    async fn find_all_running(&self, employee_id: Uuid, scope: OrgScope) -> Result<Vec<TimeLog>>;

    /// Every running log of the given source, across all scopes.
    ///
    /// Used by the periodic checkpoint scheduler.
    async fn find_running_by_source(&self, source: TimeLogSource) -> Result<Vec<TimeLog>>;

    /// Completed logs whose interval intersects `[start, end)`.
    async fn find_completed_in_range(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source: Option<TimeLogSource>,
    ) -> Result<Vec<TimeLog>>;

    /// The most recent log per employee (running or not), one entry per
    /// employee that has any log.
    async fn find_last_per_employee(
        &self,
        employee_ids: &[Uuid],
        scope: OrgScope,
        source: Option<TimeLogSource>,
        organization_team_id: Option<Uuid>,
    ) -> Result<Vec<TimeLog>>;

    /// Persist a new time log.
    async fn create(&self, log: TimeLog) -> Result<TimeLog>;

    /// Apply a partial update and return the updated log.
    async fn update(&self, id: Uuid, patch: TimeLogPatch) -> Result<TimeLog>;
}

/// Trait for querying and trimming overlapping time logs.
#[async_trait]
pub trait ConflictQuery: Send + Sync {
    /// Other logs for the employee whose interval overlaps `[start, end]`,
    /// excluding `exclude_id`.
    async fn find_overlapping(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Uuid,
    ) -> Result<Vec<TimeLog>>;

    /// Remove the time slots of a log that fall inside `[start, end]`.
    ///
    /// Returns the number of slots removed. `force` removes slots that
    /// merely touch the range boundary as well.
    async fn trim_time_slots(
        &self,
        time_log_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        force: bool,
    ) -> Result<usize>;
}

/// Trait for publishing timer domain events.
///
/// Publication is fire-and-forget: callers log failures and move on, so
/// implementations should not block on slow subscribers.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish an event to external subscribers.
    async fn publish(&self, event: TimerEvent) -> Result<()>;
}
