//! Worked-status classification

use chrono::{DateTime, Utc};
use timetrail_domain::constants::IDLE_AFTER_SECS;
use timetrail_domain::{seconds_between, TimeLog, WorkedStatus};

/// Classify an employee's most recent log.
///
/// `running` while the log is open; once stopped, `idle` when the stop is
/// more than one day in the past and `paused` otherwise.
pub fn classify_worked_status(log: &TimeLog, now: DateTime<Utc>) -> WorkedStatus {
    if log.is_running {
        WorkedStatus::Running
    } else if seconds_between(log.stopped_at, now) > IDLE_AFTER_SECS {
        WorkedStatus::Idle
    } else {
        WorkedStatus::Paused
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use timetrail_domain::{TimeLogSource, TimeLogType};
    use uuid::Uuid;

    use super::*;

    fn stopped_log(stopped_at: DateTime<Utc>) -> TimeLog {
        TimeLog {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            started_at: stopped_at - Duration::hours(1),
            stopped_at,
            duration_secs: 3600,
            is_running: false,
            source: TimeLogSource::WebTimer,
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
    fn running_log_is_running() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).single().expect("valid ts");
        let mut log = stopped_log(now);
        log.is_running = true;

        assert_eq!(classify_worked_status(&log, now), WorkedStatus::Running);
    }

    #[test]
    fn log_stopped_twenty_five_hours_ago_is_idle() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).single().expect("valid ts");
        let log = stopped_log(now - Duration::hours(25));

        assert_eq!(classify_worked_status(&log, now), WorkedStatus::Idle);
    }

    #[test]
    fn log_stopped_one_hour_ago_is_paused() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).single().expect("valid ts");
        let log = stopped_log(now - Duration::hours(1));

        assert_eq!(classify_worked_status(&log, now), WorkedStatus::Paused);
    }
}
