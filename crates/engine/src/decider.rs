//! Notification decision logic.

use crate::CoinState;
use coinwatch_core::{parse_percent, Observation, WatchFilter};

/// How the decider evaluates an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeciderMode {
    /// Per-coin throttling with heartbeat re-notification and amplitude
    /// tracking. The default.
    #[default]
    PerCoin,
    /// Reduced mode: single shared throttle window, threshold checks only.
    ThresholdOnly,
}

/// Outcome of a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub notify: bool,
    /// Parsed percent-change; 0.0 when the field did not parse.
    pub percent: f64,
}

impl Verdict {
    fn no(percent: f64) -> Self {
        Self {
            notify: false,
            percent,
        }
    }

    fn yes(percent: f64) -> Self {
        Self {
            notify: true,
            percent,
        }
    }
}

/// Pure decision function mapping an observation plus prior state to a
/// notify/no-notify verdict. The caller persists any state updates.
#[derive(Debug, Clone)]
pub struct Decider {
    filter: WatchFilter,
    mode: DeciderMode,
}

impl Decider {
    pub fn new(filter: WatchFilter, mode: DeciderMode) -> Self {
        Self { filter, mode }
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    pub fn mode(&self) -> DeciderMode {
        self.mode
    }

    /// Decide whether `observation` warrants a notification.
    ///
    /// `state` is the record for this coin (per-coin mode) or the shared
    /// record (threshold-only mode); `now` is unix seconds. A percent that
    /// fails to parse never notifies.
    pub fn decide(&self, observation: &Observation, state: &CoinState, now: i64) -> Verdict {
        let percent = match parse_percent(&observation.percent) {
            Ok(percent) => percent,
            Err(_) => return Verdict::no(0.0),
        };

        match self.mode {
            DeciderMode::PerCoin => self.decide_per_coin(percent, state, now),
            DeciderMode::ThresholdOnly => self.decide_threshold_only(percent, state, now),
        }
    }

    /// Rule order is priority order: heartbeat, thresholds, amplitude.
    fn decide_per_coin(&self, percent: f64, state: &CoinState, now: i64) -> Verdict {
        // Heartbeat: never notified, or the re-notify window has elapsed.
        // Fires regardless of price movement.
        if state.last_notify == 0 || now - state.last_notify >= self.filter.renotify_secs {
            return Verdict::yes(percent);
        }

        if percent >= self.filter.high || percent <= self.filter.low {
            return Verdict::yes(percent);
        }

        if let Some(amplitude) = self.filter.amplitude_threshold() {
            if (percent - state.last_percent).abs() >= amplitude {
                return Verdict::yes(percent);
            }
        }

        Verdict::no(percent)
    }

    /// Reduced mode: the shared window throttles, thresholds decide.
    fn decide_threshold_only(&self, percent: f64, state: &CoinState, now: i64) -> Verdict {
        let window_open =
            state.last_notify == 0 || now - state.last_notify >= self.filter.renotify_secs;
        let breached = percent >= self.filter.high || percent <= self.filter.low;
        Verdict {
            notify: window_open && breached,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000;

    fn filter() -> WatchFilter {
        WatchFilter {
            coins: vec!["CMT".to_string()],
            high: 5.0,
            low: -2.0,
            amplitude: Some(1.0),
            renotify_secs: 2,
        }
    }

    fn decider() -> Decider {
        Decider::new(filter(), DeciderMode::PerCoin)
    }

    fn observation(percent: &str) -> Observation {
        Observation::new("Bittrex", "CMT", "3.2", percent)
    }

    fn notified(last_notify: i64, last_percent: f64) -> CoinState {
        CoinState {
            last_notify,
            last_percent,
        }
    }

    #[test]
    fn test_first_observation_always_notifies() {
        // Never notified -> heartbeat fires regardless of the percent value.
        for percent in ["0.0%", "5.2%", "-7.0%", "0.3%"] {
            let verdict = decider().decide(&observation(percent), &CoinState::default(), NOW);
            assert!(verdict.notify, "percent {percent} should notify");
        }
    }

    #[test]
    fn test_high_threshold_inclusive() {
        let verdict = decider().decide(&observation("7.2%"), &notified(NOW, 5.2), NOW);
        assert!(verdict.notify);
        assert_eq!(verdict.percent, 7.2);

        // Exactly at the threshold still notifies.
        let verdict = decider().decide(&observation("5.0%"), &notified(NOW, 5.0), NOW);
        assert!(verdict.notify);
    }

    #[test]
    fn test_low_threshold_inclusive() {
        let verdict = decider().decide(&observation("-2.0%"), &notified(NOW, -1.9), NOW);
        assert!(verdict.notify);
    }

    #[test]
    fn test_amplitude_swing_notifies() {
        // 3.2 is inside [low, high] but |3.2 - 7.2| = 4.0 >= amplitude 1.0.
        let verdict = decider().decide(&observation("3.2%"), &notified(NOW, 7.2), NOW);
        assert!(verdict.notify);
        assert_eq!(verdict.percent, 3.2);
    }

    #[test]
    fn test_heartbeat_after_window_elapses() {
        // In range, within amplitude, but the re-notify window has passed.
        let state = notified(NOW - 3, 0.5);
        let verdict = decider().decide(&observation("0.5%"), &state, NOW);
        assert!(verdict.notify);
    }

    #[test]
    fn test_quiet_market_is_suppressed() {
        // Recent notify, inside thresholds, within amplitude.
        let verdict = decider().decide(&observation("0.5%"), &notified(NOW, 0.6), NOW);
        assert!(!verdict.notify);
        assert_eq!(verdict.percent, 0.5);
    }

    #[test]
    fn test_parse_failure_never_notifies() {
        // Even a state that would heartbeat cannot notify on garbage input.
        let verdict = decider().decide(&observation("--"), &CoinState::default(), NOW);
        assert!(!verdict.notify);
        assert_eq!(verdict.percent, 0.0);
    }

    #[test]
    fn test_amplitude_disabled_suppresses_swing() {
        let mut filter = filter();
        filter.amplitude = None;
        let decider = Decider::new(filter, DeciderMode::PerCoin);

        let verdict = decider.decide(&observation("3.2%"), &notified(NOW, 7.2), NOW);
        assert!(!verdict.notify);
    }

    #[test]
    fn test_decide_is_idempotent() {
        let decider = decider();
        let state = notified(NOW, 5.2);
        let obs = observation("7.2%");
        let first = decider.decide(&obs, &state, NOW);
        let second = decider.decide(&obs, &state, NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn test_threshold_only_requires_breach() {
        let decider = Decider::new(filter(), DeciderMode::ThresholdOnly);

        // Window open but percent in range: no heartbeat in this mode.
        let verdict = decider.decide(&observation("0.5%"), &CoinState::default(), NOW);
        assert!(!verdict.notify);

        let verdict = decider.decide(&observation("6.0%"), &CoinState::default(), NOW);
        assert!(verdict.notify);
    }

    #[test]
    fn test_threshold_only_throttles_on_shared_window() {
        let decider = Decider::new(filter(), DeciderMode::ThresholdOnly);

        // Breach inside the shared window is suppressed.
        let verdict = decider.decide(&observation("6.0%"), &notified(NOW, 0.0), NOW);
        assert!(!verdict.notify);

        // Same breach after the window elapses notifies.
        let verdict = decider.decide(&observation("6.0%"), &notified(NOW - 3, 0.0), NOW);
        assert!(verdict.notify);
    }
}
