//! # Timetrail Domain
//!
//! Business domain types and models for the Timetrail timer engine.
//!
//! This crate contains:
//! - Domain data types (TimeLog, TimeSlot, Employee, TimerStatus)
//! - Domain error types and Result definitions
//! - Timer configuration structures
//! - Domain constants and time helpers
//!
//! ## Architecture
//! - No dependencies on other Timetrail crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export time helpers
pub use utils::time::{seconds_between, utc_day_bounds};
