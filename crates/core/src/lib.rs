//! Core data types for the coin price notifier.

pub mod filter;
pub mod observation;
pub mod percent;

pub use filter::*;
pub use observation::*;
pub use percent::*;
