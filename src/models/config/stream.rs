use crate::models::charts::CHART_WINDOW;
use serde::Deserialize;
use std::time::Duration;

/// Settings for the live WebSocket feeds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Interval between storage polls on each open connection
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Re-check the token expiry on every tick instead of only at connect time
    pub recheck_expiry: bool,
    /// Maximum number of points in a chart frame
    pub chart_window: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            recheck_expiry: true,
            chart_window: CHART_WINDOW,
        }
    }
}
