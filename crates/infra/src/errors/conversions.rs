//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use timetrail_domain::TimetrailError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TimetrailError);

impl From<InfraError> for TimetrailError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TimetrailError> for InfraError {
    fn from(value: TimetrailError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTimetrailError {
    fn into_timetrail(self) -> TimetrailError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TimetrailError */
/* -------------------------------------------------------------------------- */

impl IntoTimetrailError for SqlError {
    fn into_timetrail(self) -> TimetrailError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        TimetrailError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        TimetrailError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        TimetrailError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        TimetrailError::Database("foreign key constraint violation".into())
                    }
                    _ => TimetrailError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                TimetrailError::Database("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                TimetrailError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TimetrailError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                TimetrailError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                TimetrailError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => TimetrailError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => TimetrailError::Database("invalid SQL query".into()),
            other => TimetrailError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_timetrail())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → TimetrailError */
/* -------------------------------------------------------------------------- */

impl IntoTimetrailError for PoolError {
    fn into_timetrail(self) -> TimetrailError {
        TimetrailError::Database(format!("pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(value.into_timetrail())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → TimetrailError */
/* -------------------------------------------------------------------------- */

impl IntoTimetrailError for JoinError {
    fn into_timetrail(self) -> TimetrailError {
        TimetrailError::Internal(format!("task join error: {self}"))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        Self(value.into_timetrail())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
