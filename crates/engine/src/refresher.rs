//! Long-period login refresh keeping the shared session fresh.

use crate::watcher::{report, WatchEvent};
use coinwatch_feeds::{LoginCredentials, SessionSlot, TickerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Re-login on a long period and replace the shared session wholesale.
///
/// A failed refresh keeps the stale session in place and is surfaced as a
/// low-severity event; the next attempt happens a full period later.
pub async fn run_session_refresher(
    client: TickerClient,
    credentials: LoginCredentials,
    slot: Arc<SessionSlot>,
    every: Duration,
    events: mpsc::Sender<WatchEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(every_secs = every.as_secs(), "session refresher started");
    let mut ticker = tokio::time::interval(every);
    // The session established at startup is already fresh.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match client.login(&credentials).await {
                    Ok(session) => {
                        slot.replace(session);
                        debug!("session refreshed");
                    }
                    Err(e) => report(&events, WatchEvent::SessionRefresh(e)),
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("session refresher stopped");
}
