//! Nested read-only tree view

use gridsync_model::{NodeInfo, NodeUuid};

/// One node of a nested tree description
///
/// Used both as the input shape for full replacement (initial load, resync)
/// and as the snapshot handed to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Node attributes
    pub info: NodeInfo,
    /// Ordered children, each owning its subtree
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf
    #[inline]
    #[must_use]
    pub fn new(info: NodeInfo) -> Self {
        Self {
            info,
            children: Vec::new(),
        }
    }

    /// With a child subtree appended
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// This node's id
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeUuid {
        self.info.id
    }

    /// Number of nodes in this subtree, self included
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }

    /// Depth-first search for a node by id
    #[must_use]
    pub fn find(&self, id: NodeUuid) -> Option<&TreeNode> {
        if self.info.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_len_counts_all_nodes() {
        let leaf = |name: &str| TreeNode::new(NodeInfo::new(NodeUuid::new(), name));

        let tree = TreeNode::new(NodeInfo::root(NodeUuid::new(), "root"))
            .with_child(leaf("a").with_child(leaf("a1")))
            .with_child(leaf("b"));

        assert_eq!(tree.subtree_len(), 4);
    }

    #[test]
    fn find_locates_nested_node() {
        let target = NodeUuid::new();
        let tree = TreeNode::new(NodeInfo::root(NodeUuid::new(), "root"))
            .with_child(TreeNode::new(NodeInfo::new(target, "a")));

        assert_eq!(tree.find(target).map(TreeNode::id), Some(target));
        assert!(tree.find(NodeUuid::new()).is_none());
    }
}
