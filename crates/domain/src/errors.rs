//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Timetrail
///
/// The first four variants are caller errors that an HTTP layer should map
/// to distinct, non-5xx responses. `Database` and `Internal` are the only
/// retry-opaque infrastructure failures.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TimetrailError {
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Time tracking is disabled: {0}")]
    TrackingDisabled(String),

    #[error("No running timer: {0}")]
    NoRunningTimer(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TimetrailError {
    /// Whether the error is caused by the caller (as opposed to the system).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::EmployeeNotFound(_)
                | Self::TrackingDisabled(_)
                | Self::NoRunningTimer(_)
                | Self::InvalidDateRange(_)
        )
    }
}

/// Result type alias for Timetrail operations
pub type Result<T> = std::result::Result<T, TimetrailError>;
