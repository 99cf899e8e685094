//! Scheduling infrastructure for background timer maintenance
//!
//! Schedulers follow explicit lifecycle management: start/stop methods,
//! tracked join handles, and cancellation token support.

pub mod checkpoint_scheduler;
pub mod error;

pub use checkpoint_scheduler::{CheckpointScheduler, CheckpointSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
