//! SQLite-backed implementation of the employee directory.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};
use timetrail_core::EmployeeDirectory;
use timetrail_domain::{Employee, OrgScope, Result as DomainResult, TimetrailError};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::InfraError;

const EMPLOYEE_COLUMNS: &str = "id, user_id, tenant_id, organization_id, is_tracking_enabled, \
                                is_online, is_tracking_time";

/// SQLite implementation of `EmployeeDirectory`.
pub struct SqliteEmployeeDirectory {
    db: Arc<DbManager>,
}

impl SqliteEmployeeDirectory {
    /// Create a new directory over the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert an employee record. Used by provisioning flows and tests.
    pub async fn insert(&self, employee: Employee) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO employees (
                    id, user_id, tenant_id, organization_id,
                    is_tracking_enabled, is_online, is_tracking_time
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    employee.id.to_string(),
                    employee.user_id.to_string(),
                    employee.tenant_id.to_string(),
                    employee.organization_id.to_string(),
                    employee.is_tracking_enabled,
                    employee.is_online,
                    employee.is_tracking_time,
                ],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
        .map_err(InfraError::from)?
    }
}

#[async_trait]
impl EmployeeDirectory for SqliteEmployeeDirectory {
    async fn find_by_user(
        &self,
        user_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<Employee>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Employee>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees
                 WHERE user_id = ?1 AND tenant_id = ?2 AND organization_id = ?3"
            );
            let result = conn.query_row(
                &sql,
                params![
                    user_id.to_string(),
                    scope.tenant_id.to_string(),
                    scope.organization_id.to_string()
                ],
                map_employee_row,
            );
            match result {
                Ok(employee) => Ok(Some(employee)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(InfraError::from(err).into()),
            }
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn find_by_id(
        &self,
        employee_id: Uuid,
        scope: OrgScope,
    ) -> DomainResult<Option<Employee>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Employee>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees
                 WHERE id = ?1 AND tenant_id = ?2 AND organization_id = ?3"
            );
            let result = conn.query_row(
                &sql,
                params![
                    employee_id.to_string(),
                    scope.tenant_id.to_string(),
                    scope.organization_id.to_string()
                ],
                map_employee_row,
            );
            match result {
                Ok(employee) => Ok(Some(employee)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(InfraError::from(err).into()),
            }
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn update_work_status(
        &self,
        employee_id: Uuid,
        is_online: bool,
        is_tracking_time: bool,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE employees SET is_online = ?2, is_tracking_time = ?3 WHERE id = ?1",
                    params![employee_id.to_string(), is_online, is_tracking_time],
                )
                .map_err(InfraError::from)?;
            if changed == 0 {
                return Err(TimetrailError::Database(format!(
                    "employee {employee_id} not found"
                )));
            }
            Ok(())
        })
        .await
        .map_err(InfraError::from)?
    }
}

fn map_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        tenant_id: uuid_column(row, 2)?,
        organization_id: uuid_column(row, 3)?,
        is_tracking_enabled: row.get(4)?,
        is_online: row.get(5)?,
        is_tracking_time: row.get(6)?,
    })
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let value: String = row.get(idx)?;
    Uuid::parse_str(&value).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(err),
        )
    })
}
