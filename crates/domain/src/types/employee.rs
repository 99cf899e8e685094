//! Employee projection consumed by the timer engine
//!
//! The employee record is owned elsewhere; the engine only reads the
//! tracking capability flags and writes back `is_online`/`is_tracking_time`
//! as a side effect of start/stop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrgScope;

/// Employee record as seen by the timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    /// Administrative capability gate. When false every timer operation for
    /// this employee fails with `TrackingDisabled`.
    pub is_tracking_enabled: bool,
    pub is_online: bool,
    pub is_tracking_time: bool,
}

impl Employee {
    /// The tenant/organization scope this employee belongs to.
    pub fn scope(&self) -> OrgScope {
        OrgScope::new(self.tenant_id, self.organization_id)
    }
}
