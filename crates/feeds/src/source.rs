//! Observation source abstraction over the ticker client.

use crate::{FeedError, SessionSlot, TickerClient};
use async_trait::async_trait;
use coinwatch_core::{Observation, WatchFilter};
use std::sync::Arc;

/// Anything that can produce the current set of watched observations.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn observations(&self, filter: &WatchFilter) -> Result<Vec<Observation>, FeedError>;
}

/// Ticker-site source bound to the shared login session.
///
/// The session is read from the slot on every call, so a refresh between
/// ticks is picked up automatically.
pub struct TickerFeed {
    client: TickerClient,
    slot: Arc<SessionSlot>,
}

impl TickerFeed {
    pub fn new(client: TickerClient, slot: Arc<SessionSlot>) -> Self {
        Self { client, slot }
    }
}

#[async_trait]
impl ObservationSource for TickerFeed {
    async fn observations(&self, filter: &WatchFilter) -> Result<Vec<Observation>, FeedError> {
        let session = self.slot.current();
        self.client.fetch_observations(&session, filter).await
    }
}
