//! gridsync domain model
//!
//! Shared vocabulary of the synchronization engine:
//! - Strongly-typed identifiers for studies, nodes and root networks
//! - Node attributes with per-root-network build state
//! - Result kinds and their notification invalidation tags
//! - The composite subscription key addressing one cached result
//! - Engine configuration

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod ids;
pub mod key;
pub mod kind;
pub mod node;

// Re-exports for convenience
pub use config::EngineConfig;
pub use ids::{NodeUuid, RootNetworkUuid, StudyUuid};
pub use key::SubscriptionKey;
pub use kind::{ResultKind, BUILD_COMPLETED_TAG, BUILD_FAILED_TAG, STUDY_UPDATE_TAG};
pub use node::{BuildStatus, NodeInfo, NodeType};
