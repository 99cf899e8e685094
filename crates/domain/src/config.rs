//! Timer engine configuration
//!
//! Configuration is an explicit immutable value threaded into the engine's
//! constructor. There is no ambient, environment-driven global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PERIODIC_SAVE_TIMEFRAME_SECS;

/// Configuration for the timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Whether running web timers get their `stopped_at` checkpoint advanced
    /// on a schedule.
    pub periodic_save_enabled: bool,
    /// Minimum age of the last checkpoint before it is advanced, in seconds.
    pub periodic_save_timeframe_secs: i64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            periodic_save_enabled: true,
            periodic_save_timeframe_secs: DEFAULT_PERIODIC_SAVE_TIMEFRAME_SECS,
        }
    }
}

impl TimerConfig {
    /// The checkpoint timeframe as a [`Duration`].
    pub fn periodic_save_timeframe(&self) -> Duration {
        Duration::from_secs(self.periodic_save_timeframe_secs.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeframe_is_ten_minutes() {
        let config = TimerConfig::default();
        assert!(config.periodic_save_enabled);
        assert_eq!(config.periodic_save_timeframe(), Duration::from_secs(600));
    }
}
