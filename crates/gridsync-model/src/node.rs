//! Tree-node attributes
//!
//! A node is one step of a study's modification tree. Its build and result
//! state is partitioned per root network: the same node can be built under
//! one scenario and untouched under another.

use crate::ids::{NodeUuid, RootNetworkUuid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node classification within the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// The single tree root (the unmodified network)
    Root,
    /// A network-modification step
    NetworkModification,
}

/// Build state of a node under one root network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    /// Never built
    #[default]
    NotBuilt,
    /// Build in progress
    Building,
    /// Built cleanly
    Built,
    /// Built, with warnings
    BuiltWithWarnings,
    /// Built, with errors
    BuiltWithErrors,
}

impl BuildStatus {
    /// Whether the node's network is usable for analyses
    #[inline]
    #[must_use]
    pub fn is_built(self) -> bool {
        matches!(
            self,
            Self::Built | Self::BuiltWithWarnings | Self::BuiltWithErrors
        )
    }
}

/// Mutable attributes of a tree node
///
/// Position in the tree (parent, children) is owned by the tree store, not
/// by the node itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node ID
    pub id: NodeUuid,
    /// Display name
    pub name: String,
    /// Node classification
    pub node_type: NodeType,
    /// Whether the node rejects further modifications
    #[serde(default)]
    pub read_only: bool,
    /// Build state per root network
    #[serde(default)]
    pub build_status: HashMap<RootNetworkUuid, BuildStatus>,
}

impl NodeInfo {
    /// Create a modification node with default state
    #[inline]
    #[must_use]
    pub fn new(id: NodeUuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            node_type: NodeType::NetworkModification,
            read_only: false,
            build_status: HashMap::new(),
        }
    }

    /// Create the root node
    #[inline]
    #[must_use]
    pub fn root(id: NodeUuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            node_type: NodeType::Root,
            read_only: true,
            build_status: HashMap::new(),
        }
    }

    /// Build state under one root network (`NotBuilt` when never reported)
    #[inline]
    #[must_use]
    pub fn build_status_for(&self, root_network: RootNetworkUuid) -> BuildStatus {
        self.build_status
            .get(&root_network)
            .copied()
            .unwrap_or_default()
    }

    /// With a build state preset for one root network
    #[inline]
    #[must_use]
    pub fn with_build_status(
        mut self,
        root_network: RootNetworkUuid,
        status: BuildStatus,
    ) -> Self {
        self.build_status.insert(root_network, status);
        self
    }
}
