//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Periodic checkpoint configuration
pub const DEFAULT_PERIODIC_SAVE_TIMEFRAME_SECS: i64 = 600;

// Stop-time policy (desktop clients)
pub const DESKTOP_STALE_STOP_GAP_SECS: i64 = 600;
pub const ABANDONED_SESSION_CREDIT_SECS: i64 = 10;

// Worked-status classification
pub const IDLE_AFTER_SECS: i64 = 86_400;
