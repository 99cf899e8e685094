//! # Timetrail Infrastructure
//!
//! Infrastructure implementations of the timer engine ports.
//!
//! This crate contains:
//! - SQLite-backed repositories (time logs, employees)
//! - The periodic checkpoint scheduler
//! - Broadcast-based event fan-out
//!
//! ## Architecture
//! - Implements traits defined in `timetrail-core`
//! - Contains all "impure" code (I/O, background tasks)

pub mod database;
pub mod errors;
pub mod events;
pub mod scheduling;

pub use database::{DbManager, SqliteEmployeeDirectory, SqliteTimeLogStore};
pub use errors::InfraError;
pub use events::BroadcastEventSink;
pub use scheduling::{CheckpointScheduler, CheckpointSchedulerConfig};
