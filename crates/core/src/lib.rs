//! # Timetrail Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The timer engine and its behavioral contracts
//! - Port/adapter interfaces (traits)
//! - The stop-time policy and conflict resolution algorithms
//!
//! ## Architecture Principles
//! - Only depends on `timetrail-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod timer;

// Re-export specific items to avoid ambiguity
pub use timer::conflicts::ConflictResolver;
pub use timer::ports::{ConflictQuery, EmployeeDirectory, EventSink, TimeLogStore};
pub use timer::status::classify_worked_status;
pub use timer::stopped_at::resolve_stopped_at;
pub use timer::TimerEngine;
