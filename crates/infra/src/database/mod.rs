//! Database implementations

pub mod employee_repository;
pub mod manager;
pub mod time_log_repository;

pub use employee_repository::SqliteEmployeeDirectory;
pub use manager::{DbConnection, DbManager};
pub use time_log_repository::SqliteTimeLogStore;
