//! Domain types and models

pub mod employee;
pub mod events;
pub mod time_log;
pub mod timer;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export for convenience
pub use employee::Employee;
pub use events::TimerEvent;
pub use time_log::{TimeLog, TimeLogPatch, TimeLogSource, TimeLogType, TimeSlot};
pub use timer::{
    AdvisoryFailure, StartTimerRequest, StopOutcome, StopTimerRequest, TimerStatus,
    TimerStatusRequest, WorkedStatus, WorkedStatusRequest,
};

/// Tenant/organization scope every timer operation runs under.
///
/// Isolation between scopes is enforced by the store; the engine only
/// threads the scope through every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgScope {
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
}

impl OrgScope {
    pub fn new(tenant_id: Uuid, organization_id: Uuid) -> Self {
        Self { tenant_id, organization_id }
    }
}
