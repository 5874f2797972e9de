//! gridsync synchronization engine
//!
//! Keeps a client-side cache of expensive analysis results correctly
//! synchronized against a stream of server-pushed change notifications:
//! - One cache entry per `(study, node, root network, result kind)` key,
//!   exposed to presentation code as a read-only handle
//! - A decision algorithm matching each notification against each live
//!   subscription's root network, named nodes and invalidation tags
//! - Generation tokens that discard fetch completions superseded by a newer
//!   fetch, so a stale value is never committed
//! - Routing of tree delta notifications into the
//!   [`gridsync_tree::TreeStore`]
//!
//! # Example
//!
//! ```rust,ignore
//! use gridsync_engine::SyncEngine;
//! use gridsync_model::{EngineConfig, ResultKind};
//!
//! # async fn example(study: gridsync_model::StudyUuid,
//! #                  node: gridsync_model::NodeUuid,
//! #                  root_network: gridsync_model::RootNetworkUuid,
//! #                  rest: std::sync::Arc<dyn gridsync_engine::TreeFetcher>,
//! #                  loadflow: std::sync::Arc<dyn gridsync_engine::ResultFetcher>)
//! # -> Result<(), gridsync_engine::EngineError> {
//! let engine = SyncEngine::new(study, EngineConfig::new(), rest);
//! engine.init().await?;
//!
//! let mut handle = engine.subscribe(node, root_network, ResultKind::LoadFlow, loadflow, None);
//! let state = handle.settled().await;
//! println!("loading={} error={:?}", state.loading, state.error);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod value;

// Re-exports for convenience
pub use engine::SyncEngine;
pub use entry::{ResultHandle, ResultState};
pub use error::{EngineError, FetchError};
pub use fetcher::{FetcherId, ResultFetcher, TreeFetcher};
pub use value::ResultValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the synchronization engine
    pub use crate::{
        EngineError, FetchError, FetcherId, ResultFetcher, ResultHandle, ResultState,
        ResultValue, SyncEngine, TreeFetcher,
    };
    pub use gridsync_model::{
        EngineConfig, NodeUuid, ResultKind, RootNetworkUuid, StudyUuid, SubscriptionKey,
    };
}
