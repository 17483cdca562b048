//! Refresh pipeline configuration.

use std::time::Duration;

/// Configuration parameters for the board refresh loop.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// How often the selected board is re-fetched.
    pub refresh_interval: Duration,

    /// Maximum number of services kept from a board.
    pub max_services: usize,
}

impl TrackerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(refresh_interval: Duration, max_services: usize) -> Self {
        Self {
            refresh_interval,
            max_services,
        }
    }

    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            max_services: 20,
        }
    }
}
