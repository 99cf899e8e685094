//! Periodic checkpoint scheduler for running web timers.
//!
//! Scans the store for running web-timer logs at a fixed interval and asks
//! the engine to advance their `stopped_at` checkpoint. This bounds the data
//! lost when a tracking client disappears without stopping its timer.
//!
//! Lifecycle rules: join handles are tracked, cancellation is explicit, and
//! stopping awaits the background task with a timeout.

use std::sync::Arc;
use std::time::Duration;

use timetrail_core::{TimeLogStore, TimerEngine};
use timetrail_domain::TimeLogSource;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the checkpoint scheduler
#[derive(Debug, Clone)]
pub struct CheckpointSchedulerConfig {
    /// Scan interval
    pub interval: Duration,
    /// Timeout for awaiting the background task on stop
    pub join_timeout: Duration,
}

impl Default for CheckpointSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(60), join_timeout: Duration::from_secs(5) }
    }
}

/// Checkpoint scheduler with explicit lifecycle management.
pub struct CheckpointScheduler {
    engine: Arc<TimerEngine>,
    store: Arc<dyn TimeLogStore>,
    config: CheckpointSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl CheckpointScheduler {
    /// Create a new checkpoint scheduler.
    pub fn new(
        engine: Arc<TimerEngine>,
        store: Arc<dyn TimeLogStore>,
        config: CheckpointSchedulerConfig,
    ) -> Self {
        Self {
            engine,
            store,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler, spawning the background scan loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is already running.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting checkpoint scheduler");

        // A fresh token supports restart after stop.
        self.cancellation_token = CancellationToken::new();

        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::scan_loop(engine, store, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Checkpoint scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is not running.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping checkpoint scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Checkpoint scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background scan loop.
    async fn scan_loop(
        engine: Arc<TimerEngine>,
        store: Arc<dyn TimeLogStore>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Checkpoint scan loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    Self::scan_once(&engine, &store).await;
                }
            }
        }
    }

    /// Checkpoint every running web timer once, logging failures per log.
    async fn scan_once(engine: &TimerEngine, store: &Arc<dyn TimeLogStore>) {
        let running = match store.find_running_by_source(TimeLogSource::WebTimer).await {
            Ok(running) => running,
            Err(err) => {
                warn!(error = %err, "Failed to query running web timers");
                return;
            }
        };

        if running.is_empty() {
            debug!("No running web timers to checkpoint");
            return;
        }

        debug!(count = running.len(), "Scanning running web timers");
        for log in running {
            match engine.check_for_periodic_save(&log).await {
                Ok(Some(updated)) => {
                    debug!(
                        time_log_id = %updated.id,
                        stopped_at = %updated.stopped_at,
                        "Checkpoint advanced"
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(time_log_id = %log.id, error = %err, "Checkpoint failed");
                }
            }
        }
    }
}

impl Drop for CheckpointScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CheckpointScheduler dropped while running; cancelling tasks");
            self.cancellation_token.cancel();
        }
    }
}
