//! Conflict resolution for overlapping time logs
//!
//! After a stop, other logs for the same employee may overlap the closed
//! interval (e.g. a desktop and a web timer both recorded the same stretch
//! of work). Only the time slots inside the overlap are trimmed, never the
//! whole log. Resolution is best-effort cleanup: callers catch and log
//! failures rather than failing the stop.

use std::sync::Arc;

use timetrail_domain::{seconds_between, Result, TimeLog, TimetrailError};
use tracing::{debug, warn};

use super::ports::ConflictQuery;

/// Detects and trims overlapping time intervals after a stop.
pub struct ConflictResolver {
    query: Arc<dyn ConflictQuery>,
}

impl ConflictResolver {
    /// Create a resolver over the given conflict query port.
    pub fn new(query: Arc<dyn ConflictQuery>) -> Self {
        Self { query }
    }

    /// Trim the time slots of every log overlapping `closed`'s interval.
    ///
    /// Returns the total number of slots removed across all conflicting
    /// logs. Fails with `InvalidDateRange` when the closed log's interval
    /// is inverted, since an inverted range would match nothing meaningful.
    pub async fn resolve(&self, closed: &TimeLog, force: bool) -> Result<usize> {
        if seconds_between(closed.started_at, closed.stopped_at) < 0 {
            return Err(TimetrailError::InvalidDateRange(format!(
                "cannot resolve conflicts for inverted interval {} -> {}",
                closed.started_at, closed.stopped_at
            )));
        }

        let conflicts = self
            .query
            .find_overlapping(
                closed.employee_id,
                closed.scope(),
                closed.started_at,
                closed.stopped_at,
                closed.id,
            )
            .await?;

        if conflicts.is_empty() {
            debug!(time_log_id = %closed.id, "No conflicting time logs");
            return Ok(0);
        }

        warn!(
            time_log_id = %closed.id,
            employee_id = %closed.employee_id,
            count = conflicts.len(),
            "Trimming conflicting time logs"
        );

        let mut trimmed = 0;
        for conflict in &conflicts {
            trimmed += self
                .query
                .trim_time_slots(conflict.id, closed.started_at, closed.stopped_at, force)
                .await?;
        }

        debug!(time_log_id = %closed.id, trimmed, "Conflict resolution finished");
        Ok(trimmed)
    }
}
