//! Tree store errors

use gridsync_model::NodeUuid;

/// Errors from tree mutations
///
/// A failed mutation leaves the tree in its last consistent state; no
/// mutation is partially applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Insert target parent is not in the tree
    #[error("parent not found: {0}")]
    ParentNotFound(NodeUuid),

    /// Mutation target is not in the tree
    #[error("node not found: {0}")]
    NodeNotFound(NodeUuid),

    /// Insert would duplicate an existing id
    #[error("duplicate node: {0}")]
    DuplicateNode(NodeUuid),

    /// Structural invariant violated (single root, connectivity, backlinks)
    #[error("tree inconsistent: {0}")]
    Inconsistent(String),
}
