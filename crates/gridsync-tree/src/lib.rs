//! gridsync tree store
//!
//! In-memory representation of a study's node hierarchy. Nodes live in an
//! id-addressed arena with parent/child id links, so the delta events the
//! push channel delivers (created, updated, deleted) apply as point
//! mutations instead of full-tree rebuilds. Consumers read cloned snapshots
//! and follow a watch channel to learn about changes.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod snapshot;
pub mod store;

// Re-exports for convenience
pub use error::TreeError;
pub use snapshot::TreeNode;
pub use store::TreeStore;
