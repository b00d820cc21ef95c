//! Ticker-site data source: login session handling and price scraping.
//!
//! The site authenticates with a cookie session; the user-ticker page is an
//! HTML table of watched coins. This crate provides:
//!
//! - `client` - login and ticker-page fetching over HTTP
//! - `session` - the opaque cookie session and its synchronized slot
//! - `source` - the `ObservationSource` abstraction used by the watch loop

pub mod client;
pub mod error;
pub mod session;
pub mod source;

pub use client::{FeedConfig, LoginCredentials, TickerClient};
pub use error::FeedError;
pub use session::{Session, SessionCookie, SessionSlot};
pub use source::{ObservationSource, TickerFeed};
