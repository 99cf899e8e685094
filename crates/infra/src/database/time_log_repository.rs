//! SQLite-backed implementation of the time log store and conflict query.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use timetrail_core::{ConflictQuery, TimeLogStore};
use timetrail_domain::{
    OrgScope, Result as DomainResult, TimeLog, TimeLogPatch, TimeLogSource, TimeLogType, TimeSlot,
    TimetrailError,
};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::InfraError;

const LOG_COLUMNS: &str = "id, tenant_id, organization_id, employee_id, started_at, stopped_at, \
                           duration_secs, is_running, source, log_type, project_id, task_id, \
                           organization_contact_id, organization_team_id, description, is_billable";

/// SQLite implementation of `TimeLogStore` and `ConflictQuery`.
pub struct SqliteTimeLogStore {
    db: Arc<DbManager>,
}

impl SqliteTimeLogStore {
    /// Create a new repository over the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeLogStore for SqliteTimeLogStore {
    async fn find_running(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<TimeLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE employee_id = ?1 AND tenant_id = ?2 AND organization_id = ?3
                   AND is_running = 1
                 ORDER BY started_at DESC
                 LIMIT 1"
            );
            let result = conn.query_row(
                &sql,
                params![
                    employee_id.to_string(),
                    scope.tenant_id.to_string(),
                    scope.organization_id.to_string()
                ],
                map_time_log_row,
            );
            match result {
                Ok(log) => Ok(Some(attach_slots(&conn, log)?)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(InfraError::from(err).into()),
            }
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn find_all_running(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE employee_id = ?1 AND tenant_id = ?2 AND organization_id = ?3
                   AND is_running = 1
                 ORDER BY started_at DESC"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let logs = stmt
                .query_map(
                    params![
                        employee_id.to_string(),
                        scope.tenant_id.to_string(),
                        scope.organization_id.to_string()
                    ],
                    map_time_log_row,
                )
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;
            attach_slots_all(&conn, logs)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn find_running_by_source(&self, source: TimeLogSource) -> DomainResult<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE is_running = 1 AND source = ?1
                 ORDER BY started_at ASC"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let logs = stmt
                .query_map(params![source.as_str()], map_time_log_row)
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;
            attach_slots_all(&conn, logs)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn find_completed_in_range(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source: Option<TimeLogSource>,
    ) -> DomainResult<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE employee_id = ?1 AND tenant_id = ?2 AND organization_id = ?3
                   AND is_running = 0
                   AND started_at < ?4 AND stopped_at >= ?5
                   AND (?6 IS NULL OR source = ?6)
                 ORDER BY started_at ASC"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let logs = stmt
                .query_map(
                    params![
                        employee_id.to_string(),
                        scope.tenant_id.to_string(),
                        scope.organization_id.to_string(),
                        end,
                        start,
                        source.map(|s| s.as_str())
                    ],
                    map_time_log_row,
                )
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;
            attach_slots_all(&conn, logs)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn find_last_per_employee(
        &self,
        employee_ids: &[Uuid],
        scope: OrgScope,
        source: Option<TimeLogSource>,
        organization_team_id: Option<Uuid>,
    ) -> DomainResult<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);
        let employee_ids = employee_ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE employee_id = ?1 AND tenant_id = ?2 AND organization_id = ?3
                   AND (?4 IS NULL OR source = ?4)
                   AND (?5 IS NULL OR organization_team_id = ?5)
                 ORDER BY started_at DESC
                 LIMIT 1"
            );
            let mut latest = Vec::new();
            for employee_id in employee_ids {
                let result = conn.query_row(
                    &sql,
                    params![
                        employee_id.to_string(),
                        scope.tenant_id.to_string(),
                        scope.organization_id.to_string(),
                        source.map(|s| s.as_str()),
                        organization_team_id.map(|id| id.to_string())
                    ],
                    map_time_log_row,
                );
                match result {
                    Ok(log) => latest.push(attach_slots(&conn, log)?),
                    Err(rusqlite::Error::QueryReturnedNoRows) => {}
                    Err(err) => return Err(InfraError::from(err).into()),
                }
            }
            Ok(latest)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn create(&self, log: TimeLog) -> DomainResult<TimeLog> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<TimeLog> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(InfraError::from)?;
            tx.execute(
                "INSERT INTO time_logs (
                    id, tenant_id, organization_id, employee_id, started_at, stopped_at,
                    duration_secs, is_running, source, log_type, project_id, task_id,
                    organization_contact_id, organization_team_id, description, is_billable
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    log.id.to_string(),
                    log.tenant_id.to_string(),
                    log.organization_id.to_string(),
                    log.employee_id.to_string(),
                    log.started_at,
                    log.stopped_at,
                    log.duration_secs,
                    log.is_running,
                    log.source.as_str(),
                    log.log_type.as_str(),
                    log.project_id.map(|id| id.to_string()),
                    log.task_id.map(|id| id.to_string()),
                    log.organization_contact_id.map(|id| id.to_string()),
                    log.organization_team_id.map(|id| id.to_string()),
                    log.description.as_deref(),
                    log.is_billable,
                ],
            )
            .map_err(InfraError::from)?;

            for slot in &log.time_slots {
                tx.execute(
                    "INSERT INTO time_slots (time_log_id, started_at, duration_secs)
                     VALUES (?1, ?2, ?3)",
                    params![log.id.to_string(), slot.started_at, slot.duration_secs],
                )
                .map_err(InfraError::from)?;
            }

            tx.commit().map_err(InfraError::from)?;
            Ok(log)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn update(&self, id: Uuid, patch: TimeLogPatch) -> DomainResult<TimeLog> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<TimeLog> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE time_logs SET
                        stopped_at = COALESCE(?2, stopped_at),
                        is_running = COALESCE(?3, is_running),
                        duration_secs = COALESCE(?4, duration_secs)
                     WHERE id = ?1",
                    params![id.to_string(), patch.stopped_at, patch.is_running, patch.duration_secs],
                )
                .map_err(InfraError::from)?;
            if changed == 0 {
                return Err(TimetrailError::Database(format!("time log {id} not found")));
            }

            let sql = format!("SELECT {LOG_COLUMNS} FROM time_logs WHERE id = ?1");
            let log = conn
                .query_row(&sql, params![id.to_string()], map_time_log_row)
                .map_err(InfraError::from)?;
            attach_slots(&conn, log)
        })
        .await
        .map_err(InfraError::from)?
    }
}

#[async_trait]
impl ConflictQuery for SqliteTimeLogStore {
    async fn find_overlapping(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Uuid,
    ) -> DomainResult<Vec<TimeLog>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeLog>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {LOG_COLUMNS} FROM time_logs
                 WHERE id != ?1
                   AND employee_id = ?2 AND tenant_id = ?3 AND organization_id = ?4
                   AND started_at <= ?5 AND stopped_at >= ?6
                 ORDER BY started_at ASC"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let logs = stmt
                .query_map(
                    params![
                        exclude_id.to_string(),
                        employee_id.to_string(),
                        scope.tenant_id.to_string(),
                        scope.organization_id.to_string(),
                        end,
                        start
                    ],
                    map_time_log_row,
                )
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;
            attach_slots_all(&conn, logs)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn trim_time_slots(
        &self,
        time_log_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        force: bool,
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            // Forced trims delete slots touching the range boundary as well.
            let sql = if force {
                "DELETE FROM time_slots
                 WHERE time_log_id = ?1 AND started_at >= ?2 AND started_at <= ?3"
            } else {
                "DELETE FROM time_slots
                 WHERE time_log_id = ?1 AND started_at > ?2 AND started_at < ?3"
            };
            let removed = conn
                .execute(sql, params![time_log_id.to_string(), start, end])
                .map_err(InfraError::from)?;
            Ok(removed)
        })
        .await
        .map_err(InfraError::from)?
    }
}

/* -------------------------------------------------------------------------- */
/* Row mapping */
/* -------------------------------------------------------------------------- */

fn map_time_log_row(row: &Row<'_>) -> rusqlite::Result<TimeLog> {
    Ok(TimeLog {
        id: uuid_column(row, 0)?,
        tenant_id: uuid_column(row, 1)?,
        organization_id: uuid_column(row, 2)?,
        employee_id: uuid_column(row, 3)?,
        started_at: row.get(4)?,
        stopped_at: row.get(5)?,
        duration_secs: row.get(6)?,
        is_running: row.get(7)?,
        source: source_column(row, 8)?,
        log_type: log_type_column(row, 9)?,
        project_id: optional_uuid_column(row, 10)?,
        task_id: optional_uuid_column(row, 11)?,
        organization_contact_id: optional_uuid_column(row, 12)?,
        organization_team_id: optional_uuid_column(row, 13)?,
        description: row.get(14)?,
        is_billable: row.get(15)?,
        time_slots: Vec::new(),
    })
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let value: String = row.get(idx)?;
    Uuid::parse_str(&value).map_err(|err| conversion_failure(idx, Box::new(err)))
}

fn optional_uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|value| {
            Uuid::parse_str(&value).map_err(|err| conversion_failure(idx, Box::new(err)))
        })
        .transpose()
}

fn source_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimeLogSource> {
    let value: String = row.get(idx)?;
    TimeLogSource::parse(&value)
        .ok_or_else(|| conversion_failure(idx, format!("unknown source '{value}'").into()))
}

fn log_type_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimeLogType> {
    let value: String = row.get(idx)?;
    TimeLogType::parse(&value)
        .ok_or_else(|| conversion_failure(idx, format!("unknown log type '{value}'").into()))
}

fn conversion_failure(
    idx: usize,
    err: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err)
}

fn load_slots(conn: &Connection, time_log_id: Uuid) -> DomainResult<Vec<TimeSlot>> {
    let mut stmt = conn
        .prepare(
            "SELECT started_at, duration_secs FROM time_slots
             WHERE time_log_id = ?1
             ORDER BY started_at ASC",
        )
        .map_err(InfraError::from)?;
    let slots = stmt
        .query_map(params![time_log_id.to_string()], |row| {
            Ok(TimeSlot { started_at: row.get(0)?, duration_secs: row.get(1)? })
        })
        .map_err(InfraError::from)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(InfraError::from)?;
    Ok(slots)
}

fn attach_slots(conn: &Connection, mut log: TimeLog) -> DomainResult<TimeLog> {
    log.time_slots = load_slots(conn, log.id)?;
    Ok(log)
}

fn attach_slots_all(conn: &Connection, logs: Vec<TimeLog>) -> DomainResult<Vec<TimeLog>> {
    logs.into_iter().map(|log| attach_slots(conn, log)).collect()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
