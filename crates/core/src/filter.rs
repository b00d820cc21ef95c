//! Watch-list and threshold configuration.

use serde::{Deserialize, Serialize};

/// User-configured watch list and notification thresholds.
///
/// Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchFilter {
    /// Coin identifiers to watch. A scraped row matches when its coin cell
    /// contains one of these.
    pub coins: Vec<String>,
    /// Notify when percent-change rises to or above this value.
    pub high: f64,
    /// Notify when percent-change falls to or below this value.
    pub low: f64,
    /// Minimum percent-point swing vs. the last recorded value that forces a
    /// notification. `None` or a non-positive value disables the rule.
    pub amplitude: Option<f64>,
    /// Minimum seconds between notifications for the same coin; doubles as
    /// the heartbeat re-notification period.
    pub renotify_secs: i64,
}

impl Default for WatchFilter {
    fn default() -> Self {
        Self {
            coins: Vec::new(),
            high: 3.0,
            low: -2.0,
            amplitude: Some(1.0),
            renotify_secs: 3600,
        }
    }
}

impl WatchFilter {
    /// True when a scraped coin cell matches the watch list.
    pub fn watches(&self, coin_cell: &str) -> bool {
        self.coins.iter().any(|c| coin_cell.contains(c.as_str()))
    }

    /// Amplitude threshold, if the rule is enabled.
    pub fn amplitude_threshold(&self) -> Option<f64> {
        self.amplitude.filter(|a| *a > 0.0)
    }
}
