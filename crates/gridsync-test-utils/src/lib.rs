//! Testing utilities for the gridsync workspace
//!
//! Shared fetcher stubs, tree fixtures and envelope builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use gridsync_engine::{FetchError, FetcherId, ResultFetcher, ResultValue, TreeFetcher};
use gridsync_model::{NodeInfo, NodeUuid, RootNetworkUuid, StudyUuid};
use gridsync_notify::{
    RawEnvelope, H_NEW_NODE, H_NODE, H_NODES, H_PARENT_NODE, H_ROOT_NETWORK, H_STUDY,
    H_UPDATE_TYPE, NODE_CREATED_TAG, NODE_DELETED_TAG, NODE_UPDATED_TAG,
};
use gridsync_tree::TreeNode;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Initialize tracing for tests, honoring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fetcher resolving immediately, counting calls; each value is the call
/// number
#[derive(Debug)]
pub struct CountingFetcher {
    id: FetcherId,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: FetcherId::new(id),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultFetcher for CountingFetcher {
    fn id(&self) -> FetcherId {
        self.id.clone()
    }

    async fn fetch(
        &self,
        _study: StudyUuid,
        _node: NodeUuid,
        _root_network: RootNetworkUuid,
    ) -> Result<ResultValue, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ResultValue::new(n))
    }
}

/// Fetcher resolving immediately to the node id it was asked about
///
/// Lets tests check which subscription a committed value belongs to.
#[derive(Debug)]
pub struct NodeEchoFetcher {
    id: FetcherId,
}

impl NodeEchoFetcher {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: FetcherId::new(id),
        })
    }
}

#[async_trait]
impl ResultFetcher for NodeEchoFetcher {
    fn id(&self) -> FetcherId {
        self.id.clone()
    }

    async fn fetch(
        &self,
        _study: StudyUuid,
        node: NodeUuid,
        _root_network: RootNetworkUuid,
    ) -> Result<ResultValue, FetchError> {
        Ok(ResultValue::new(node))
    }
}

/// Payload of a [`GatedFetcher`] fetch: which node was asked for, and which
/// fetch (by start order) produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Echo {
    pub node: NodeUuid,
    pub ordinal: usize,
}

/// Fetcher that parks every fetch until it is released
///
/// Resolves to an [`Echo`] so tests can tell which fetch produced a
/// committed value. Used to hold a fetch in flight while the test changes
/// parameters underneath it.
#[derive(Debug)]
pub struct GatedFetcher {
    id: FetcherId,
    gate: Semaphore,
    started: AtomicUsize,
}

impl GatedFetcher {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: FetcherId::new(id),
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
        })
    }

    /// Let one parked (or future) fetch proceed
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    /// How many fetches have started (parked or finished)
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Spin until `n` fetches have started
    pub async fn wait_started(&self, n: usize) {
        while self.started() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ResultFetcher for GatedFetcher {
    fn id(&self) -> FetcherId {
        self.id.clone()
    }

    async fn fetch(
        &self,
        _study: StudyUuid,
        node: NodeUuid,
        _root_network: RootNetworkUuid,
    ) -> Result<ResultValue, FetchError> {
        let ordinal = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        Ok(ResultValue::new(Echo { node, ordinal }))
    }
}

/// Fetcher that always rejects
#[derive(Debug)]
pub struct FailingFetcher {
    id: FetcherId,
    message: String,
}

impl FailingFetcher {
    pub fn new(id: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            id: FetcherId::new(id),
            message: message.to_string(),
        })
    }
}

#[async_trait]
impl ResultFetcher for FailingFetcher {
    fn id(&self) -> FetcherId {
        self.id.clone()
    }

    async fn fetch(
        &self,
        _study: StudyUuid,
        _node: NodeUuid,
        _root_network: RootNetworkUuid,
    ) -> Result<ResultValue, FetchError> {
        Err(FetchError::Transport(self.message.clone()))
    }
}

/// Tree fetcher serving a test-controlled tree description
#[derive(Debug)]
pub struct StaticTreeFetcher {
    tree: RwLock<TreeNode>,
    fetches: AtomicUsize,
}

impl StaticTreeFetcher {
    pub fn new(tree: TreeNode) -> Arc<Self> {
        Arc::new(Self {
            tree: RwLock::new(tree),
            fetches: AtomicUsize::new(0),
        })
    }

    /// Swap the tree the next `fetch_tree` returns
    pub fn set_tree(&self, tree: TreeNode) {
        *self.tree.write() = tree;
    }

    /// How many full-tree fetches were served
    pub fn tree_fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TreeFetcher for StaticTreeFetcher {
    async fn fetch_tree(&self, _study: StudyUuid) -> Result<TreeNode, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.tree.read().clone())
    }

    async fn fetch_node(
        &self,
        _study: StudyUuid,
        node: NodeUuid,
    ) -> Result<NodeInfo, FetchError> {
        // Serve the stored attributes when the node is in the tree,
        // otherwise a fresh default (a node created server-side)
        let tree = self.tree.read();
        Ok(tree
            .find(node)
            .map(|n| n.info.clone())
            .unwrap_or_else(|| NodeInfo::new(node, "fetched")))
    }
}

/// A root with one flat layer of children
pub fn simple_tree(root: NodeUuid, children: &[NodeUuid]) -> TreeNode {
    let mut tree = TreeNode::new(NodeInfo::root(root, "root"));
    for (i, &child) in children.iter().enumerate() {
        tree = tree.with_child(TreeNode::new(NodeInfo::new(child, format!("n{i}"))));
    }
    tree
}

/// Envelope announcing a stale result
pub fn result_envelope(
    study: StudyUuid,
    tag: &str,
    nodes: &[NodeUuid],
    root_network: Option<RootNetworkUuid>,
) -> RawEnvelope {
    let mut env = RawEnvelope::new()
        .with_header(H_UPDATE_TYPE, tag)
        .with_header(H_STUDY, study.to_string());
    if !nodes.is_empty() {
        let ids: Vec<String> = nodes.iter().map(ToString::to_string).collect();
        env = env.with_header(H_NODES, serde_json::json!(ids));
    }
    if let Some(rn) = root_network {
        env = env.with_header(H_ROOT_NETWORK, rn.to_string());
    }
    env
}

/// Envelope announcing a created node
pub fn node_created_envelope(study: StudyUuid, parent: NodeUuid, node: NodeUuid) -> RawEnvelope {
    RawEnvelope::new()
        .with_header(H_UPDATE_TYPE, NODE_CREATED_TAG)
        .with_header(H_STUDY, study.to_string())
        .with_header(H_PARENT_NODE, parent.to_string())
        .with_header(H_NEW_NODE, node.to_string())
}

/// Envelope announcing updated nodes
pub fn nodes_updated_envelope(study: StudyUuid, nodes: &[NodeUuid]) -> RawEnvelope {
    let ids: Vec<String> = nodes.iter().map(ToString::to_string).collect();
    RawEnvelope::new()
        .with_header(H_UPDATE_TYPE, NODE_UPDATED_TAG)
        .with_header(H_STUDY, study.to_string())
        .with_header(H_NODES, serde_json::json!(ids))
}

/// Envelope announcing deleted nodes
pub fn nodes_deleted_envelope(study: StudyUuid, nodes: &[NodeUuid]) -> RawEnvelope {
    let ids: Vec<String> = nodes.iter().map(ToString::to_string).collect();
    RawEnvelope::new()
        .with_header(H_UPDATE_TYPE, NODE_DELETED_TAG)
        .with_header(H_STUDY, study.to_string())
        .with_header(H_NODES, serde_json::json!(ids))
}

/// Envelope announcing a finished build
pub fn build_completed_envelope(
    study: StudyUuid,
    node: NodeUuid,
    root_network: RootNetworkUuid,
) -> RawEnvelope {
    RawEnvelope::new()
        .with_header(H_UPDATE_TYPE, gridsync_model::BUILD_COMPLETED_TAG)
        .with_header(H_STUDY, study.to_string())
        .with_header(H_NODE, node.to_string())
        .with_header(H_ROOT_NETWORK, root_network.to_string())
}
