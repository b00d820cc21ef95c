//! Notification engine.
//!
//! This crate contains the decision logic mapping price observations to
//! notify/no-notify verdicts, the per-coin throttling state, and the two
//! periodic loops: the watch loop (scrape, decide, notify) and the session
//! refresher.

pub mod decider;
pub mod refresher;
pub mod state;
pub mod watcher;

pub use decider::*;
pub use refresher::*;
pub use state::*;
pub use watcher::*;
