//! Timer engine
//!
//! Start/stop/toggle/status orchestration plus the supporting algorithms:
//! the stop-time policy, overlap conflict resolution, and worked-status
//! classification.

pub mod conflicts;
pub mod ports;
pub mod service;
pub mod status;
pub mod stopped_at;

pub use service::TimerEngine;
