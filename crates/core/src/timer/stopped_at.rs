//! Stop-time policy
//!
//! Computes the authoritative stop instant for a stop request. Desktop
//! clients report activity through discrete time slots; a stop request
//! arriving long after the last slot likely reflects a delayed or batched
//! client call rather than genuine elapsed work, so credited time is capped
//! at the last verified activity.

use chrono::{DateTime, Duration, Utc};
use timetrail_domain::constants::{ABANDONED_SESSION_CREDIT_SECS, DESKTOP_STALE_STOP_GAP_SECS};
use timetrail_domain::{seconds_between, TimeLog, TimeLogSource};

/// Resolve the final `stopped_at` for a stop request.
///
/// Defaults to the requested value (or `now`). For desktop-sourced requests:
///
/// - With a last time slot: if the requested stop is more than ten minutes
///   after the slot started, trust the slot and stop at
///   `slot.started_at + slot.duration`.
/// - Without any slots: if the log started more than ten minutes ago, treat
///   the session as abandoned almost immediately and credit ten seconds.
pub fn resolve_stopped_at(
    requested: Option<DateTime<Utc>>,
    source: Option<TimeLogSource>,
    last_log: &TimeLog,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let mut stopped_at = requested.unwrap_or(now);

    if source != Some(TimeLogSource::Desktop) {
        return stopped_at;
    }

    if let Some(last_slot) = last_log.last_time_slot() {
        if seconds_between(last_slot.started_at, stopped_at) > DESKTOP_STALE_STOP_GAP_SECS {
            stopped_at = last_slot.ends_at();
        }
    } else if seconds_between(last_log.started_at, now) > DESKTOP_STALE_STOP_GAP_SECS {
        stopped_at = last_log.started_at + Duration::seconds(ABANDONED_SESSION_CREDIT_SECS);
    }

    stopped_at
}
