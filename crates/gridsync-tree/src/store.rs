//! In-memory node tree with incremental mutations
//!
//! Nodes live in an id-addressed arena; parent/child relations are stored as
//! id links so point mutations touch only the slots involved instead of
//! rebuilding the tree. The store is thread-safe behind a
//! [`parking_lot::RwLock`] with a single writer (the synchronization
//! engine); everything else only reads.

use crate::error::TreeError;
use crate::snapshot::TreeNode;
use gridsync_model::{BuildStatus, NodeInfo, NodeUuid, RootNetworkUuid};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::sync::watch;

/// One arena slot: node attributes plus id links to neighbors
#[derive(Debug, Clone)]
struct NodeSlot {
    info: NodeInfo,
    parent: Option<NodeUuid>,
    children: Vec<NodeUuid>,
}

#[derive(Debug, Default)]
struct TreeState {
    arena: IndexMap<NodeUuid, NodeSlot>,
    root: Option<NodeUuid>,
}

/// In-memory study node tree
///
/// Invariant after every mutation: at most one root, every non-root node has
/// exactly one present parent, ids are unique, no cycles.
#[derive(Debug)]
pub struct TreeStore {
    state: RwLock<TreeState>,
    version: watch::Sender<u64>,
}

impl TreeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: RwLock::new(TreeState::default()),
            version,
        }
    }

    /// Replace the whole tree (initial load, resync)
    ///
    /// # Errors
    /// [`TreeError::DuplicateNode`] when the description repeats an id; the
    /// previous tree is kept in that case.
    pub fn replace_tree(&self, root: TreeNode) -> Result<(), TreeError> {
        let root_id = root.id();
        let mut arena = IndexMap::new();
        flatten_into(&mut arena, root, None)?;

        let count = arena.len();
        *self.state.write() = TreeState {
            arena,
            root: Some(root_id),
        };
        tracing::info!(nodes = count, "tree replaced");
        self.bump();
        Ok(())
    }

    /// Insert a node as the last child of `parent_id`
    ///
    /// # Errors
    /// - [`TreeError::ParentNotFound`] when the parent is unknown; the
    ///   caller decides whether to drop the insert or resync the tree
    /// - [`TreeError::DuplicateNode`] when the id is already present
    pub fn apply_node_created(
        &self,
        info: NodeInfo,
        parent_id: NodeUuid,
    ) -> Result<(), TreeError> {
        let id = info.id;
        let mut state = self.state.write();

        if state.arena.contains_key(&id) {
            return Err(TreeError::DuplicateNode(id));
        }
        if !state.arena.contains_key(&parent_id) {
            return Err(TreeError::ParentNotFound(parent_id));
        }

        state.arena.insert(
            id,
            NodeSlot {
                info,
                parent: Some(parent_id),
                children: Vec::new(),
            },
        );
        if let Some(parent) = state.arena.get_mut(&parent_id) {
            parent.children.push(id);
        }

        drop(state);
        tracing::debug!(node = %id, parent = %parent_id, "node created");
        self.bump();
        Ok(())
    }

    /// Replace attributes of the given nodes in place
    ///
    /// Position and children are preserved. Unknown ids are skipped with a
    /// warning; returns how many nodes were actually updated.
    pub fn apply_nodes_updated(&self, updated: Vec<NodeInfo>) -> usize {
        let mut state = self.state.write();
        let mut applied = 0;

        for info in updated {
            match state.arena.get_mut(&info.id) {
                Some(slot) => {
                    slot.info = info;
                    applied += 1;
                }
                None => {
                    tracing::warn!(node = %info.id, "update target not in tree, skipped");
                }
            }
        }

        drop(state);
        if applied > 0 {
            self.bump();
        }
        applied
    }

    /// Record a node's build outcome under one root network
    ///
    /// # Errors
    /// [`TreeError::NodeNotFound`] when the node is unknown.
    pub fn apply_build_status(
        &self,
        node_id: NodeUuid,
        root_network: RootNetworkUuid,
        status: BuildStatus,
    ) -> Result<(), TreeError> {
        let mut state = self.state.write();
        let slot = state
            .arena
            .get_mut(&node_id)
            .ok_or(TreeError::NodeNotFound(node_id))?;
        slot.info.build_status.insert(root_network, status);

        drop(state);
        tracing::debug!(node = %node_id, root_network = %root_network, ?status, "build status");
        self.bump();
        Ok(())
    }

    /// Remove the given nodes and their entire subtrees
    ///
    /// Idempotent: absent ids are no-ops. Removing the root clears the tree.
    /// Returns how many nodes were removed, descendants included.
    pub fn apply_nodes_removed(&self, ids: &[NodeUuid]) -> usize {
        let mut state = self.state.write();
        let mut removed = 0;

        for &id in ids {
            if !state.arena.contains_key(&id) {
                continue;
            }

            // Detach from the parent's child list first
            if let Some(parent_id) = state.arena.get(&id).and_then(|s| s.parent) {
                if let Some(parent) = state.arena.get_mut(&parent_id) {
                    parent.children.retain(|c| *c != id);
                }
            }

            // Drop the subtree, iteratively
            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                if let Some(slot) = state.arena.shift_remove(&current) {
                    stack.extend(slot.children);
                    removed += 1;
                }
            }

            if state.root == Some(id) {
                state.root = None;
            }
        }

        drop(state);
        if removed > 0 {
            tracing::debug!(removed, "nodes removed");
            self.bump();
        }
        removed
    }

    /// Cloned nested view of the current tree, `None` when empty
    #[must_use]
    pub fn snapshot(&self) -> Option<TreeNode> {
        let state = self.state.read();
        let root = state.root?;
        build_subtree(&state, root)
    }

    /// Subscribe to mutation notifications
    ///
    /// The watched value is a version that increases on every applied
    /// mutation; consumers re-read the snapshot when it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Current mutation version
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Whether a node is present
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeUuid) -> bool {
        self.state.read().arena.contains_key(&id)
    }

    /// Number of nodes in the tree
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().arena.len()
    }

    /// The root node's id, `None` when empty
    #[inline]
    #[must_use]
    pub fn root_id(&self) -> Option<NodeUuid> {
        self.state.read().root
    }

    /// Cloned attributes of one node
    #[must_use]
    pub fn get(&self, id: NodeUuid) -> Option<NodeInfo> {
        self.state.read().arena.get(&id).map(|s| s.info.clone())
    }

    /// Ordered children of one node
    #[must_use]
    pub fn children_of(&self, id: NodeUuid) -> Option<Vec<NodeUuid>> {
        self.state.read().arena.get(&id).map(|s| s.children.clone())
    }

    /// Parent of one node; `None` for the root or an unknown id
    #[must_use]
    pub fn parent_of(&self, id: NodeUuid) -> Option<NodeUuid> {
        self.state.read().arena.get(&id).and_then(|s| s.parent)
    }

    /// Check structural invariants
    ///
    /// # Errors
    /// [`TreeError::Inconsistent`] describing the first violation found.
    pub fn validate(&self) -> Result<(), TreeError> {
        let state = self.state.read();
        if state.arena.is_empty() {
            return Ok(());
        }
        let root = state
            .root
            .ok_or_else(|| TreeError::Inconsistent("nodes present but no root".into()))?;

        let mut visited = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let slot = state
                .arena
                .get(&id)
                .ok_or_else(|| TreeError::Inconsistent(format!("dangling child link {id}")))?;
            visited += 1;
            if visited > state.arena.len() {
                return Err(TreeError::Inconsistent("cycle detected".into()));
            }
            for &child in &slot.children {
                let child_slot = state.arena.get(&child).ok_or_else(|| {
                    TreeError::Inconsistent(format!("dangling child link {child}"))
                })?;
                if child_slot.parent != Some(id) {
                    return Err(TreeError::Inconsistent(format!(
                        "child {child} does not link back to {id}"
                    )));
                }
                stack.push(child);
            }
        }

        if visited != state.arena.len() {
            return Err(TreeError::Inconsistent(format!(
                "{} nodes unreachable from root",
                state.arena.len() - visited
            )));
        }
        Ok(())
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_into(
    arena: &mut IndexMap<NodeUuid, NodeSlot>,
    node: TreeNode,
    parent: Option<NodeUuid>,
) -> Result<(), TreeError> {
    let id = node.id();
    if arena.contains_key(&id) {
        return Err(TreeError::DuplicateNode(id));
    }
    let child_ids: Vec<NodeUuid> = node.children.iter().map(TreeNode::id).collect();
    arena.insert(
        id,
        NodeSlot {
            info: node.info,
            parent,
            children: child_ids,
        },
    );
    for child in node.children {
        flatten_into(arena, child, Some(id))?;
    }
    Ok(())
}

fn build_subtree(state: &TreeState, id: NodeUuid) -> Option<TreeNode> {
    let slot = state.arena.get(&id)?;
    let children = slot
        .children
        .iter()
        .filter_map(|&c| build_subtree(state, c))
        .collect();
    Some(TreeNode {
        info: slot.info.clone(),
        children,
    })
}
