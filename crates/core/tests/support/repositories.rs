//! Mock port implementations for testing
//!
//! Provides in-memory mocks for all timer engine ports, enabling
//! deterministic unit tests without database dependencies.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use timetrail_core::{ConflictQuery, EmployeeDirectory, EventSink, TimeLogStore};
use timetrail_domain::{
    Employee, OrgScope, Result as DomainResult, TimeLog, TimeLogPatch, TimeLogSource, TimerEvent,
    TimetrailError,
};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory mock for `TimeLogStore` and `ConflictQuery`.
///
/// Stores logs behind a mutex and mirrors the store's query semantics
/// closely enough for engine tests.
#[derive(Default)]
pub struct InMemoryTimeLogStore {
    logs: Mutex<Vec<TimeLog>>,
}

impl InMemoryTimeLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing log.
    pub fn seed(&self, log: TimeLog) {
        lock(&self.logs).push(log);
    }

    /// Snapshot of every stored log.
    pub fn all(&self) -> Vec<TimeLog> {
        lock(&self.logs).clone()
    }

    /// Fetch a log by id.
    pub fn get(&self, id: Uuid) -> Option<TimeLog> {
        lock(&self.logs).iter().find(|log| log.id == id).cloned()
    }

    /// Number of running logs for an employee, across the whole store.
    pub fn running_count(&self, employee_id: Uuid) -> usize {
        lock(&self.logs)
            .iter()
            .filter(|log| log.employee_id == employee_id && log.is_running)
            .count()
    }

    fn in_scope(log: &TimeLog, scope: OrgScope) -> bool {
        log.tenant_id == scope.tenant_id && log.organization_id == scope.organization_id
    }
}

#[async_trait]
impl TimeLogStore for InMemoryTimeLogStore {
    async fn find_running(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<TimeLog>> {
        Ok(lock(&self.logs)
            .iter()
            .filter(|log| {
                log.employee_id == employee_id && Self::in_scope(log, scope) && log.is_running
            })
            .max_by_key(|log| log.started_at)
            .cloned())
    }

    async fn find_all_running(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Vec<TimeLog>> {
        let mut running: Vec<TimeLog> = lock(&self.logs)
            .iter()
            .filter(|log| {
                log.employee_id == employee_id && Self::in_scope(log, scope) && log.is_running
            })
            .cloned()
            .collect();
        running.sort_by_key(|log| std::cmp::Reverse(log.started_at));
        Ok(running)
    }

    async fn find_running_by_source(&self, source: TimeLogSource) -> DomainResult<Vec<TimeLog>> {
        Ok(lock(&self.logs)
            .iter()
            .filter(|log| log.is_running && log.source == source)
            .cloned()
            .collect())
    }

    async fn find_completed_in_range(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source: Option<TimeLogSource>,
    ) -> DomainResult<Vec<TimeLog>> {
        Ok(lock(&self.logs)
            .iter()
            .filter(|log| {
                log.employee_id == employee_id
                    && Self::in_scope(log, scope)
                    && !log.is_running
                    && log.started_at < end
                    && log.stopped_at >= start
                    && source.map_or(true, |wanted| log.source == wanted)
            })
            .cloned()
            .collect())
    }

    async fn find_last_per_employee(
        &self,
        employee_ids: &[Uuid],
        scope: OrgScope,
        source: Option<TimeLogSource>,
        organization_team_id: Option<Uuid>,
    ) -> DomainResult<Vec<TimeLog>> {
        let logs = lock(&self.logs);
        let mut latest: Vec<TimeLog> = Vec::new();
        for employee_id in employee_ids {
            let last = logs
                .iter()
                .filter(|log| {
                    log.employee_id == *employee_id
                        && Self::in_scope(log, scope)
                        && source.map_or(true, |wanted| log.source == wanted)
                        && organization_team_id
                            .map_or(true, |team| log.organization_team_id == Some(team))
                })
                .max_by_key(|log| log.started_at);
            if let Some(log) = last {
                latest.push(log.clone());
            }
        }
        Ok(latest)
    }

    async fn create(&self, log: TimeLog) -> DomainResult<TimeLog> {
        lock(&self.logs).push(log.clone());
        Ok(log)
    }

    async fn update(&self, id: Uuid, patch: TimeLogPatch) -> DomainResult<TimeLog> {
        let mut logs = lock(&self.logs);
        let log = logs
            .iter_mut()
            .find(|log| log.id == id)
            .ok_or_else(|| TimetrailError::Database(format!("time log {id} not found")))?;
        if let Some(stopped_at) = patch.stopped_at {
            log.stopped_at = stopped_at;
        }
        if let Some(is_running) = patch.is_running {
            log.is_running = is_running;
        }
        if let Some(duration_secs) = patch.duration_secs {
            log.duration_secs = duration_secs;
        }
        Ok(log.clone())
    }
}

#[async_trait]
impl ConflictQuery for InMemoryTimeLogStore {
    async fn find_overlapping(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Uuid,
    ) -> DomainResult<Vec<TimeLog>> {
        Ok(lock(&self.logs)
            .iter()
            .filter(|log| {
                log.id != exclude_id
                    && log.employee_id == employee_id
                    && Self::in_scope(log, scope)
                    && log.started_at <= end
                    && log.stopped_at >= start
            })
            .cloned()
            .collect())
    }

    async fn trim_time_slots(
        &self,
        time_log_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        force: bool,
    ) -> DomainResult<usize> {
        let mut logs = lock(&self.logs);
        let log = logs
            .iter_mut()
            .find(|log| log.id == time_log_id)
            .ok_or_else(|| TimetrailError::Database(format!("time log {time_log_id} not found")))?;
        let before = log.time_slots.len();
        // A non-forced trim only removes slots strictly inside the interval,
        // leaving boundary slots in place.
        if force {
            log.time_slots.retain(|slot| slot.started_at < start || slot.started_at > end);
        } else {
            log.time_slots.retain(|slot| slot.started_at <= start || slot.started_at >= end);
        }
        Ok(before - log.time_slots.len())
    }
}

/// `ConflictQuery` that always fails, for advisory-failure tests.
pub struct FailingConflictQuery;

#[async_trait]
impl ConflictQuery for FailingConflictQuery {
    async fn find_overlapping(
        &self,
        _employee_id: Uuid,
        _scope: OrgScope,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _exclude_id: Uuid,
    ) -> DomainResult<Vec<TimeLog>> {
        Err(TimetrailError::Database("conflict store unavailable".into()))
    }

    async fn trim_time_slots(
        &self,
        _time_log_id: Uuid,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _force: bool,
    ) -> DomainResult<usize> {
        Err(TimetrailError::Database("conflict store unavailable".into()))
    }
}

/// In-memory mock for `EmployeeDirectory`.
#[derive(Default)]
pub struct InMemoryEmployeeDirectory {
    employees: Mutex<Vec<Employee>>,
}

impl InMemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with an employee.
    pub fn seed(&self, employee: Employee) {
        lock(&self.employees).push(employee);
    }

    /// Fetch an employee by id.
    pub fn get(&self, employee_id: Uuid) -> Option<Employee> {
        lock(&self.employees).iter().find(|e| e.id == employee_id).cloned()
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find_by_user(
        &self,
        user_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<Employee>> {
        Ok(lock(&self.employees)
            .iter()
            .find(|e| e.user_id == user_id && e.tenant_id == scope.tenant_id)
            .cloned())
    }

    async fn find_by_id(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<Employee>> {
        Ok(lock(&self.employees)
            .iter()
            .find(|e| e.id == employee_id && e.tenant_id == scope.tenant_id)
            .cloned())
    }

    async fn update_work_status(
        &self,
        employee_id: Uuid,
        is_online: bool,
        is_tracking_time: bool,
    ) -> DomainResult<()> {
        let mut employees = lock(&self.employees);
        let employee = employees
            .iter_mut()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| TimetrailError::Database(format!("employee {employee_id} not found")))?;
        employee.is_online = is_online;
        employee.is_tracking_time = is_tracking_time;
        Ok(())
    }
}

/// `EventSink` that records every published event.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TimerEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of published events.
    pub fn published(&self) -> Vec<TimerEvent> {
        lock(&self.events).clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, event: TimerEvent) -> DomainResult<()> {
        lock(&self.events).push(event);
        Ok(())
    }
}

/// `EventSink` that always fails, for advisory-failure tests.
pub struct FailingEventSink;

#[async_trait]
impl EventSink for FailingEventSink {
    async fn publish(&self, _event: TimerEvent) -> DomainResult<()> {
        Err(TimetrailError::Internal("event bus down".into()))
    }
}

/// Convenience bundle wiring an engine against the in-memory ports.
pub struct TestHarness {
    pub store: Arc<InMemoryTimeLogStore>,
    pub directory: Arc<InMemoryEmployeeDirectory>,
    pub events: Arc<RecordingEventSink>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryTimeLogStore::new()),
            directory: Arc::new(InMemoryEmployeeDirectory::new()),
            events: Arc::new(RecordingEventSink::new()),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
