//! Engine error types
//!
//! Fetch failures are data, not exceptions: they end up in a cache entry's
//! error slot for the presentation layer to render. [`EngineError`] covers
//! the engine's own operations (init, explicit refresh).

use gridsync_model::SubscriptionKey;
use gridsync_notify::EnvelopeError;
use gridsync_tree::TreeError;

/// Errors a result or tree fetcher can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport or server failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The configured fetch timeout elapsed
    #[error("fetch timed out after {secs}s")]
    Timeout {
        /// Configured bound, in seconds
        secs: u64,
    },

    /// The server does not know the requested resource
    #[error("resource not found")]
    NotFound,
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Tree mutation failed
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// A fetcher failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Envelope validation failed
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Operation addressed a key with no live subscription
    #[error("no subscription for {0}")]
    UnknownSubscription(SubscriptionKey),
}
