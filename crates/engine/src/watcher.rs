//! Periodic watch loop: fetch, decide, notify, record.

use crate::{Decider, DeciderMode, TaskBook};
use async_trait::async_trait;
use coinwatch_core::Observation;
use coinwatch_feeds::{FeedError, ObservationSource};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Bounded capacity of the watch event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Error type carried by sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Notification sink: receives observations that warranted an alert.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, observation: &Observation) -> Result<(), SinkError>;
}

/// Recoverable events reported by the loops. None of these stop a loop;
/// only the shutdown signal does.
#[derive(Debug, Error)]
pub enum WatchEvent {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FeedError),

    #[error("notify for {coin} failed: {error}")]
    Send { coin: String, error: SinkError },

    #[error("session refresh failed: {0}")]
    SessionRefresh(FeedError),
}

/// Report an event without ever blocking the loop; on overflow the event is
/// dropped.
pub(crate) fn report(events: &mpsc::Sender<WatchEvent>, event: WatchEvent) {
    if let Err(dropped) = events.try_send(event) {
        debug!("watch event dropped: {dropped}");
    }
}

/// Drives the fixed-interval scrape/decide/notify cycle.
///
/// Owns the task book exclusively; each tick body runs to completion before
/// the next tick or a shutdown request is considered.
pub struct Watcher<S, N> {
    source: S,
    sink: N,
    decider: Decider,
    book: TaskBook,
}

impl<S, N> Watcher<S, N>
where
    S: ObservationSource,
    N: AlertSink,
{
    pub fn new(source: S, sink: N, decider: Decider) -> Self {
        Self {
            source,
            sink,
            decider,
            book: TaskBook::new(),
        }
    }

    pub fn book(&self) -> &TaskBook {
        &self.book
    }

    /// Run the loop until `shutdown` flips.
    pub async fn run(
        mut self,
        tick: Duration,
        mut shutdown: watch::Receiver<bool>,
        events: mpsc::Sender<WatchEvent>,
    ) {
        info!(interval_secs = tick.as_secs_f64(), "watch loop started");
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(&events).await,
                _ = shutdown.changed() => break,
            }
        }

        info!(coins = self.book.len(), "watch loop stopped");
    }

    /// One scheduling tick.
    pub async fn tick(&mut self, events: &mpsc::Sender<WatchEvent>) {
        let observations = match self.source.observations(self.decider.filter()).await {
            Ok(observations) => observations,
            Err(e) => {
                report(events, WatchEvent::Fetch(e));
                return;
            }
        };

        let now = now_unix();
        for observation in &observations {
            let state = match self.decider.mode() {
                DeciderMode::PerCoin => self.book.coin(&observation.coin),
                DeciderMode::ThresholdOnly => self.book.shared(),
            };

            let verdict = self.decider.decide(observation, &state, now);
            if verdict.notify {
                debug!(
                    coin = %observation.coin,
                    platform = %observation.platform,
                    percent = verdict.percent,
                    "notifying"
                );
                if let Err(error) = self.sink.send(observation).await {
                    report(
                        events,
                        WatchEvent::Send {
                            coin: observation.coin.to_string(),
                            error,
                        },
                    );
                }
                // A failed send still counts for throttling.
                self.book.mark_notified(&observation.coin, now);
            }

            self.book.record_percent(&observation.coin, verdict.percent);
        }
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
