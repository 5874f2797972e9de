//! Fetcher interfaces
//!
//! The REST side of the system lives behind these traits: one per result
//! kind for analysis outputs, one for tree content. Fetches must be
//! idempotent reads and must resolve or reject, never hang silently
//! (a hung fetch is only bounded when [`gridsync_model::EngineConfig`]
//! sets a timeout).

use crate::error::FetchError;
use crate::value::ResultValue;
use async_trait::async_trait;
use gridsync_model::{NodeInfo, NodeUuid, RootNetworkUuid, StudyUuid};
use gridsync_tree::TreeNode;

/// Value identity of a fetch strategy
///
/// Two fetchers with the same id are interchangeable; swapping in a fetcher
/// with a different id on a live subscription forces a re-fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetcherId(String);

impl FetcherId {
    /// Create a fetcher id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FetcherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Async source of one result kind's values
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Identity of this fetch strategy
    fn id(&self) -> FetcherId;

    /// Fetch the result for one node under one root network
    async fn fetch(
        &self,
        study: StudyUuid,
        node: NodeUuid,
        root_network: RootNetworkUuid,
    ) -> Result<ResultValue, FetchError>;
}

/// Async source of tree content
///
/// Push notifications carry node ids only; attributes and full subtrees are
/// re-fetched through this interface.
#[async_trait]
pub trait TreeFetcher: Send + Sync {
    /// Fetch the study's whole node tree
    async fn fetch_tree(&self, study: StudyUuid) -> Result<TreeNode, FetchError>;

    /// Fetch one node's attributes
    async fn fetch_node(&self, study: StudyUuid, node: NodeUuid)
        -> Result<NodeInfo, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_id_equality_is_by_value() {
        assert_eq!(FetcherId::new("loadflow/v1"), FetcherId::new("loadflow/v1"));
        assert_ne!(FetcherId::new("loadflow/v1"), FetcherId::new("loadflow/v2"));
    }
}
