//! Timer engine - core business logic
//!
//! Orchestrates start/stop/toggle/status over the port traits. The central
//! correctness property is that a given employee scope has at most one
//! running log at any instant; a per-employee async mutex is held across
//! every read-then-write sequence so concurrent starts cannot both observe
//! "no running log" and each create one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use timetrail_domain::{
    seconds_between, utc_day_bounds, AdvisoryFailure, Employee, OrgScope, Result,
    StartTimerRequest, StopOutcome, StopTimerRequest, TimeLog, TimeLogPatch, TimeLogSource,
    TimerConfig, TimerEvent, TimerStatus, TimerStatusRequest, TimetrailError, WorkedStatusRequest,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::conflicts::ConflictResolver;
use super::ports::{EmployeeDirectory, EventSink, TimeLogStore};
use super::status::classify_worked_status;
use super::stopped_at::resolve_stopped_at;

type EmployeeLocks = Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>;

/// Timer engine service.
pub struct TimerEngine {
    store: Arc<dyn TimeLogStore>,
    directory: Arc<dyn EmployeeDirectory>,
    conflicts: ConflictResolver,
    events: Arc<dyn EventSink>,
    config: TimerConfig,
    /// One async mutex per employee, held across stop-then-create sequences.
    locks: EmployeeLocks,
}

impl TimerEngine {
    /// Create a new timer engine over the given ports.
    pub fn new(
        store: Arc<dyn TimeLogStore>,
        directory: Arc<dyn EmployeeDirectory>,
        conflicts: ConflictResolver,
        events: Arc<dyn EventSink>,
        config: TimerConfig,
    ) -> Self {
        Self { store, directory, conflicts, events, config, locks: Mutex::new(HashMap::new()) }
    }

    /// Start a new timer for the calling user's employee.
    ///
    /// Any stray running logs are closed first, so starting while a timer is
    /// already running is an implicit stop+start rather than a rejection.
    pub async fn start_timer(&self, request: StartTimerRequest) -> Result<TimeLog> {
        let now = Utc::now();
        let started_at = request.started_at.unwrap_or(now);

        let employee = self.resolve_caller(request.user_id, request.scope).await?;
        ensure_tracking_enabled(&employee)?;

        let lock = self.employee_lock(employee.id);
        let _guard = lock.lock().await;

        // Safety net against orphaned running logs from crashed sessions or
        // missed stop calls.
        self.stop_previous_running_timers(&employee, now).await;

        let log = TimeLog {
            id: Uuid::new_v4(),
            tenant_id: employee.tenant_id,
            organization_id: employee.organization_id,
            employee_id: employee.id,
            started_at,
            stopped_at: started_at,
            duration_secs: 0,
            is_running: true,
            source: request.source.unwrap_or_default(),
            log_type: request.log_type.unwrap_or_default(),
            project_id: request.project_id,
            task_id: request.task_id,
            organization_contact_id: request.organization_contact_id,
            organization_team_id: request.organization_team_id,
            description: request.description,
            is_billable: request.is_billable.unwrap_or(false),
            time_slots: Vec::new(),
        };
        let log = self.store.create(log).await?;

        self.directory.update_work_status(employee.id, true, true).await?;

        info!(
            time_log_id = %log.id,
            employee_id = %employee.id,
            started_at = %log.started_at,
            source = log.source.as_str(),
            "Timer started"
        );

        self.publish(TimerEvent::TimerStarted { log: log.clone() }).await;

        Ok(log)
    }

    /// Stop the calling user's running timer.
    ///
    /// Stopping is not idempotent by design: a second stop without an
    /// intervening start fails with `NoRunningTimer` so clients can detect
    /// that they desynchronized. Conflict resolution and event publication
    /// are best-effort; their failures come back as advisories on the
    /// outcome instead of failing the stop.
    pub async fn stop_timer(&self, request: StopTimerRequest) -> Result<StopOutcome> {
        validate_date_range(request.started_at, request.stopped_at)?;

        let employee = self.resolve_caller(request.user_id, request.scope).await?;
        ensure_tracking_enabled(&employee)?;

        let lock = self.employee_lock(employee.id);
        let _guard = lock.lock().await;

        let last_log = self
            .store
            .find_running(employee.id, employee.scope())
            .await?
            .ok_or_else(|| {
                warn!(employee_id = %employee.id, "Stop requested with no running timer");
                TimetrailError::NoRunningTimer(
                    "no running log found; the timer was already stopped".into(),
                )
            })?;

        let now = Utc::now();
        let stopped_at = resolve_stopped_at(request.stopped_at, request.source, &last_log, now);
        debug!(time_log_id = %last_log.id, %stopped_at, "Resolved stop instant");

        // Never write an inverted interval; clear the running flag only and
        // leave the previous checkpoint as the stop time.
        let patch = if stopped_at < last_log.started_at {
            warn!(
                time_log_id = %last_log.id,
                %stopped_at,
                started_at = %last_log.started_at,
                "Computed stop precedes start; skipping stopped_at update"
            );
            TimeLogPatch {
                is_running: Some(false),
                stopped_at: None,
                duration_secs: Some(
                    seconds_between(last_log.started_at, last_log.stopped_at).max(0),
                ),
            }
        } else {
            TimeLogPatch::close(last_log.started_at, stopped_at)
        };

        let log = self.store.update(last_log.id, patch).await?;

        self.directory.update_work_status(employee.id, false, false).await?;

        // Defensive: close any running log that appeared concurrently.
        self.stop_previous_running_timers(&employee, now).await;

        // Clients that record their own time slots keep slots sitting exactly
        // on the closed interval's boundary; everyone else gets a forced trim.
        let mut advisories = Vec::new();
        if let Err(err) = self.conflicts.resolve(&log, !request.manual_time_slot).await {
            warn!(time_log_id = %log.id, error = %err, "Conflict resolution failed");
            advisories.push(AdvisoryFailure::ConflictResolution(err.to_string()));
        }

        info!(
            time_log_id = %log.id,
            employee_id = %employee.id,
            stopped_at = %log.stopped_at,
            duration_secs = log.duration_secs,
            "Timer stopped"
        );

        if let Some(advisory) = self.try_publish(TimerEvent::TimerStopped { log: log.clone() }).await
        {
            advisories.push(advisory);
        }

        Ok(StopOutcome { log, advisories })
    }

    /// Toggle the timer: start when idle, stop when running.
    ///
    /// Pure dispatch. The request's `started_at` instant doubles as the stop
    /// time when toggling a running timer off.
    pub async fn toggle(&self, request: StartTimerRequest) -> Result<TimeLog> {
        let employee = self.resolve_caller(request.user_id, request.scope).await?;
        let running = self.store.find_running(employee.id, employee.scope()).await?;

        match running {
            None => self.start_timer(request).await,
            Some(_) => {
                let stop = StopTimerRequest {
                    user_id: request.user_id,
                    scope: request.scope,
                    started_at: None,
                    stopped_at: request.started_at,
                    source: request.source,
                    manual_time_slot: false,
                };
                self.stop_timer(stop).await.map(|outcome| outcome.log)
            }
        }
    }

    /// Timer status for a single employee over a time window.
    ///
    /// The duration is the sum of completed logs in the window plus the
    /// elapsed time of the running log, if any. The window defaults to the
    /// current UTC calendar day. `employee_id` is honored only for callers
    /// with elevated permission; everyone else gets their own status.
    pub async fn timer_status(&self, request: TimerStatusRequest) -> Result<TimerStatus> {
        let employee = match (request.has_elevated_permission, request.employee_id) {
            (true, Some(employee_id)) => self
                .directory
                .find_by_id(employee_id, request.scope)
                .await?
                .ok_or_else(|| {
                    TimetrailError::EmployeeNotFound(format!("employee {employee_id} not found"))
                })?,
            _ => self.resolve_caller(request.user_id, request.scope).await?,
        };

        let now = Utc::now();
        let (default_start, default_end) = utc_day_bounds(now);
        let start = request.today_start.unwrap_or(default_start);
        let end = request.today_end.unwrap_or(default_end);

        let completed = self
            .store
            .find_completed_in_range(employee.id, employee.scope(), start, end, request.source)
            .await?;
        let mut duration_secs: i64 = completed.iter().map(|log| log.duration_secs).sum();

        let running = self
            .store
            .find_running(employee.id, employee.scope())
            .await?
            .filter(|log| request.source.is_none() || request.source == Some(log.source));

        let (running_flag, last_log) = match running {
            Some(log) => {
                duration_secs += log.elapsed_secs(now).max(0);
                (true, Some(log))
            }
            None => {
                let last = completed.into_iter().max_by_key(|log| log.started_at);
                (false, last)
            }
        };

        Ok(TimerStatus { duration_secs, running: running_flag, last_log, worked_status: None })
    }

    /// Batched worked-status classification for a list of employees.
    ///
    /// Without elevated permission the list is ignored and only the caller's
    /// own employee is reported. Employees without any log are omitted.
    pub async fn worked_status(&self, request: WorkedStatusRequest) -> Result<Vec<TimerStatus>> {
        let employee_ids = if request.has_elevated_permission {
            request.employee_ids.clone()
        } else {
            let employee = self.resolve_caller(request.user_id, request.scope).await?;
            vec![employee.id]
        };

        let last_logs = self
            .store
            .find_last_per_employee(
                &employee_ids,
                request.scope,
                request.source,
                request.organization_team_id,
            )
            .await?;

        let now = Utc::now();
        let statuses = last_logs
            .into_iter()
            .map(|log| TimerStatus {
                duration_secs: log.duration_secs,
                running: log.is_running,
                worked_status: Some(classify_worked_status(&log, now)),
                last_log: Some(log),
            })
            .collect();

        Ok(statuses)
    }

    /// Advance a running web timer's `stopped_at` checkpoint when the last
    /// one is older than the configured timeframe.
    ///
    /// Bounds data loss to one timeframe if the tracking client disappears
    /// mid-session. The log is re-read before the write so a checkpoint is
    /// never applied to a log that was stopped in the meantime.
    pub async fn check_for_periodic_save(&self, last_log: &TimeLog) -> Result<Option<TimeLog>> {
        if !self.config.periodic_save_enabled
            || !last_log.is_running
            || last_log.source != TimeLogSource::WebTimer
        {
            return Ok(None);
        }

        // Signed comparison: a checkpoint ahead of `now` (client-supplied
        // future start) is never rewound.
        let now = Utc::now();
        if last_log.checkpoint_age_secs(now) <= self.config.periodic_save_timeframe_secs {
            return Ok(None);
        }

        let lock = self.employee_lock(last_log.employee_id);
        let _guard = lock.lock().await;

        // The log may have been stopped since the caller read it.
        let current = self.store.find_running(last_log.employee_id, last_log.scope()).await?;
        let Some(current) = current.filter(|log| log.id == last_log.id && log.is_running) else {
            debug!(time_log_id = %last_log.id, "Skipping checkpoint; log no longer running");
            return Ok(None);
        };

        let updated = self.store.update(current.id, TimeLogPatch::checkpoint(now)).await?;
        debug!(
            time_log_id = %updated.id,
            checkpoint = %now,
            "Advanced periodic checkpoint"
        );

        self.publish(TimerEvent::TimerStatusUpdated { employee_id: updated.employee_id }).await;

        Ok(Some(updated))
    }

    /// Close every running log for the employee, crediting elapsed time up
    /// to `now`. Idempotent; failures are logged and never propagated.
    async fn stop_previous_running_timers(&self, employee: &Employee, now: DateTime<Utc>) {
        let logs = match self.store.find_all_running(employee.id, employee.scope()).await {
            Ok(logs) => logs,
            Err(err) => {
                warn!(employee_id = %employee.id, error = %err, "Failed to query running logs");
                return;
            }
        };

        if logs.is_empty() {
            return;
        }

        debug!(employee_id = %employee.id, count = logs.len(), "Stopping previous running timers");
        for log in logs {
            // Checkpoints are monotonically non-decreasing; never move the
            // stop time backwards.
            let stopped_at = now.max(log.stopped_at);
            let patch = TimeLogPatch::close(log.started_at, stopped_at);
            if let Err(err) = self.store.update(log.id, patch).await {
                warn!(time_log_id = %log.id, error = %err, "Failed to close stray running log");
            }
        }
    }

    /// Resolve the calling user to an employee record within the scope.
    async fn resolve_caller(&self, user_id: Uuid, scope: OrgScope) -> Result<Employee> {
        self.directory.find_by_user(user_id, scope).await?.ok_or_else(|| {
            TimetrailError::EmployeeNotFound(format!("no employee record for user {user_id}"))
        })
    }

    /// Per-employee serialization primitive.
    fn employee_lock(&self, employee_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(employee_id).or_default())
    }

    /// Publish an event, logging failures.
    async fn publish(&self, event: TimerEvent) {
        if let Some(AdvisoryFailure::EventPublish(detail)) = self.try_publish(event).await {
            debug!(detail, "Dropped timer event");
        }
    }

    /// Publish an event, converting a failure into an advisory.
    async fn try_publish(&self, event: TimerEvent) -> Option<AdvisoryFailure> {
        let employee_id = event.employee_id();
        match self.events.publish(event).await {
            Ok(()) => None,
            Err(err) => {
                warn!(%employee_id, error = %err, "Failed to publish timer event");
                Some(AdvisoryFailure::EventPublish(err.to_string()))
            }
        }
    }
}

/// Fail with `InvalidDateRange` when both ends of a caller-supplied range
/// are present and inverted.
fn validate_date_range(
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
) -> Result<()> {
    if let (Some(start), Some(stop)) = (started_at, stopped_at) {
        if stop < start {
            return Err(TimetrailError::InvalidDateRange(format!(
                "stop time {stop} precedes start time {start}"
            )));
        }
    }
    Ok(())
}

/// Fail with `TrackingDisabled` when the employee's tracking capability is
/// administratively off.
fn ensure_tracking_enabled(employee: &Employee) -> Result<()> {
    if !employee.is_tracking_enabled {
        return Err(TimetrailError::TrackingDisabled(format!(
            "time tracking is disabled for employee {}",
            employee.id
        )));
    }
    Ok(())
}
