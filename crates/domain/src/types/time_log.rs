//! Time log entity and its sub-entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrgScope;
use crate::utils::time::seconds_between;

/// Originating client type for a time log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLogSource {
    WebTimer,
    Desktop,
    Mobile,
    BrowserExtension,
}

impl Default for TimeLogSource {
    fn default() -> Self {
        Self::WebTimer
    }
}

impl TimeLogSource {
    /// Stable string form used for persistence and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebTimer => "web_timer",
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::BrowserExtension => "browser_extension",
        }
    }

    /// Parse the persisted string form back into the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "web_timer" => Some(Self::WebTimer),
            "desktop" => Some(Self::Desktop),
            "mobile" => Some(Self::Mobile),
            "browser_extension" => Some(Self::BrowserExtension),
            _ => None,
        }
    }
}

/// Kind of tracked interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLogType {
    Tracked,
    Manual,
    Idle,
}

impl Default for TimeLogType {
    fn default() -> Self {
        Self::Tracked
    }
}

impl TimeLogType {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tracked => "tracked",
            Self::Manual => "manual",
            Self::Idle => "idle",
        }
    }

    /// Parse the persisted string form back into the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tracked" => Some(Self::Tracked),
            "manual" => Some(Self::Manual),
            "idle" => Some(Self::Idle),
            _ => None,
        }
    }
}

/// Fine-grained activity sample within a time log's interval, reported by
/// richer clients (desktop app, browser extension).
///
/// Insertion order is irrelevant; consumers sort by `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
}

impl TimeSlot {
    pub fn new(started_at: DateTime<Utc>, duration_secs: i64) -> Self {
        Self { started_at, duration_secs }
    }

    /// The instant the sample's covered activity ends.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + chrono::Duration::seconds(self.duration_secs)
    }
}

/// One interval of (attempted) tracked work for an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub employee_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Always present. Equals `started_at` at creation; while running it
    /// tracks the latest checkpoint and is monotonically non-decreasing.
    pub stopped_at: DateTime<Utc>,
    /// Cached duration in seconds; authoritative only once the log is closed.
    pub duration_secs: i64,
    pub is_running: bool,
    pub source: TimeLogSource,
    pub log_type: TimeLogType,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub organization_contact_id: Option<Uuid>,
    pub organization_team_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_billable: bool,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

impl TimeLog {
    /// The tenant/organization scope this log belongs to.
    pub fn scope(&self) -> OrgScope {
        OrgScope::new(self.tenant_id, self.organization_id)
    }

    /// Seconds elapsed since the log started, relative to `now`.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        seconds_between(self.started_at, now)
    }

    /// Seconds since the last recorded `stopped_at` checkpoint.
    pub fn checkpoint_age_secs(&self, now: DateTime<Utc>) -> i64 {
        seconds_between(self.stopped_at, now)
    }

    /// The time slot with the latest `started_at`, if any.
    ///
    /// Ties are broken arbitrarily; slots are keyed by start instant.
    pub fn last_time_slot(&self) -> Option<&TimeSlot> {
        self.time_slots.iter().max_by_key(|slot| slot.started_at)
    }
}

/// Partial update applied to an existing time log through the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeLogPatch {
    pub stopped_at: Option<DateTime<Utc>>,
    pub is_running: Option<bool>,
    pub duration_secs: Option<i64>,
}

impl TimeLogPatch {
    /// Patch that closes a log at `stopped_at`, caching the final duration.
    pub fn close(started_at: DateTime<Utc>, stopped_at: DateTime<Utc>) -> Self {
        Self {
            stopped_at: Some(stopped_at),
            is_running: Some(false),
            duration_secs: Some(seconds_between(started_at, stopped_at).max(0)),
        }
    }

    /// Patch that advances the running checkpoint without closing the log.
    pub fn checkpoint(stopped_at: DateTime<Utc>) -> Self {
        Self { stopped_at: Some(stopped_at), is_running: None, duration_secs: None }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_log() -> TimeLog {
        let started_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().expect("valid ts");
        TimeLog {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            started_at,
            stopped_at: started_at,
            duration_secs: 0,
            is_running: true,
            source: TimeLogSource::Desktop,
            log_type: TimeLogType::Tracked,
            project_id: None,
            task_id: None,
            organization_contact_id: None,
            organization_team_id: None,
            description: None,
            is_billable: false,
            time_slots: Vec::new(),
        }
    }

    #[test]
    fn last_time_slot_picks_latest_start_regardless_of_insertion_order() {
        let mut log = sample_log();
        let earlier = log.started_at + chrono::Duration::minutes(10);
        let later = log.started_at + chrono::Duration::minutes(20);
        log.time_slots = vec![TimeSlot::new(later, 600), TimeSlot::new(earlier, 600)];

        let last = log.last_time_slot().expect("slot present");
        assert_eq!(last.started_at, later);
    }

    #[test]
    fn close_patch_caches_duration() {
        let log = sample_log();
        let stopped_at = log.started_at + chrono::Duration::minutes(30);
        let patch = TimeLogPatch::close(log.started_at, stopped_at);

        assert_eq!(patch.duration_secs, Some(1800));
        assert_eq!(patch.is_running, Some(false));
    }

    #[test]
    fn source_round_trips_through_string_form() {
        for source in [
            TimeLogSource::WebTimer,
            TimeLogSource::Desktop,
            TimeLogSource::Mobile,
            TimeLogSource::BrowserExtension,
        ] {
            assert_eq!(TimeLogSource::parse(source.as_str()), Some(source));
        }
        assert_eq!(TimeLogSource::parse("fax_machine"), None);
    }
}
