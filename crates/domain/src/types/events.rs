//! Domain events published by the timer engine
//!
//! Events are fire-and-forget notifications for external consumers
//! (dashboards, audit logs). Publication failures never affect the
//! outcome of the timer operation that produced them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_log::TimeLog;

/// Event emitted by the timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    TimerStarted { log: TimeLog },
    TimerStopped { log: TimeLog },
    TimerStatusUpdated { employee_id: Uuid },
}

impl TimerEvent {
    /// The employee the event concerns.
    pub fn employee_id(&self) -> Uuid {
        match self {
            Self::TimerStarted { log } | Self::TimerStopped { log } => log.employee_id,
            Self::TimerStatusUpdated { employee_id } => *employee_id,
        }
    }
}
