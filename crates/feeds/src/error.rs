//! Error types for ticker feed operations.

use thiserror::Error;

/// Errors that can occur while talking to the ticker site.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("failed to parse ticker page: {0}")]
    Parse(String),
}

impl FeedError {
    /// True when the error is likely to clear on a later tick without
    /// intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Http(_) | FeedError::Status(_))
    }

    /// True when the error points at credentials or markup changes and will
    /// not clear on its own.
    pub fn is_permanent(&self) -> bool {
        matches!(self, FeedError::LoginRejected(_) | FeedError::Parse(_))
    }
}
