use gridsync_model::{NodeInfo, NodeUuid};
use gridsync_tree::{TreeError, TreeNode, TreeStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn chain(ids: &[NodeUuid]) -> TreeNode {
    // ids[0] -> ids[1] -> ... as a single path
    let mut iter = ids.iter().rev();
    let mut node = TreeNode::new(NodeInfo::new(*iter.next().unwrap(), "leaf"));
    for &id in iter {
        node = TreeNode::new(NodeInfo::new(id, "n")).with_child(node);
    }
    node
}

#[test]
fn test_removal_detaches_only_named_subtree() {
    // root -> x -> x1, x2
    //      -> y
    let root = NodeUuid::new();
    let x = NodeUuid::new();
    let x1 = NodeUuid::new();
    let x2 = NodeUuid::new();
    let y = NodeUuid::new();

    let store = TreeStore::new();
    store
        .replace_tree(
            TreeNode::new(NodeInfo::root(root, "root"))
                .with_child(
                    TreeNode::new(NodeInfo::new(x, "x"))
                        .with_child(TreeNode::new(NodeInfo::new(x1, "x1")))
                        .with_child(TreeNode::new(NodeInfo::new(x2, "x2"))),
                )
                .with_child(TreeNode::new(NodeInfo::new(y, "y"))),
        )
        .unwrap();

    assert_eq!(store.apply_nodes_removed(&[x]), 3);

    for gone in [x, x1, x2] {
        assert!(!store.contains(gone));
    }
    // Untouched relationships
    assert_eq!(store.children_of(root).unwrap(), vec![y]);
    assert_eq!(store.parent_of(y), Some(root));
    store.validate().unwrap();
}

#[test]
fn test_created_node_appears_once_at_end() {
    let root = NodeUuid::new();
    let a = NodeUuid::new();
    let b = NodeUuid::new();

    let store = TreeStore::new();
    store
        .replace_tree(
            TreeNode::new(NodeInfo::root(root, "root"))
                .with_child(TreeNode::new(NodeInfo::new(a, "a"))),
        )
        .unwrap();

    store
        .apply_node_created(NodeInfo::new(b, "b"), root)
        .unwrap();

    let children = store.children_of(root).unwrap();
    assert_eq!(children, vec![a, b]);
}

#[test]
fn test_failed_mutation_leaves_tree_consistent() {
    let root = NodeUuid::new();
    let store = TreeStore::new();
    store
        .replace_tree(TreeNode::new(NodeInfo::root(root, "root")))
        .unwrap();
    let version = store.version();

    let unknown_parent = NodeUuid::new();
    assert_eq!(
        store.apply_node_created(NodeInfo::new(NodeUuid::new(), "n"), unknown_parent),
        Err(TreeError::ParentNotFound(unknown_parent))
    );

    assert_eq!(store.node_count(), 1);
    assert_eq!(store.version(), version);
    store.validate().unwrap();
}

#[test]
fn test_empty_store_reads() {
    let store = TreeStore::new();

    assert!(store.snapshot().is_none());
    assert!(store.root_id().is_none());
    assert_eq!(store.node_count(), 0);
    assert_eq!(store.apply_nodes_removed(&[NodeUuid::new()]), 0);
    store.validate().unwrap();
}

proptest! {
    #[test]
    fn prop_removals_preserve_invariants(
        depth in 2..8usize,
        removals in proptest::collection::vec(0..8usize, 0..6)
    ) {
        let ids: Vec<NodeUuid> = (0..depth).map(|_| NodeUuid::new()).collect();
        let store = TreeStore::new();
        store.replace_tree(chain(&ids)).unwrap();

        for idx in removals {
            if idx < ids.len() {
                store.apply_nodes_removed(&[ids[idx]]);
            }
            store.validate().unwrap();
        }

        // Removing any interior node takes its whole tail with it
        let expected: usize = match store.root_id() {
            Some(root) => {
                let mut len = 0;
                let mut cursor = Some(root);
                while let Some(id) = cursor {
                    len += 1;
                    cursor = store.children_of(id).unwrap().first().copied();
                }
                len
            }
            None => 0,
        };
        prop_assert_eq!(store.node_count(), expected);
    }

    #[test]
    fn prop_snapshot_matches_arena_size(extra in 0..10usize) {
        let root = NodeUuid::new();
        let store = TreeStore::new();
        store.replace_tree(TreeNode::new(NodeInfo::root(root, "root"))).unwrap();

        let mut parent = root;
        for i in 0..extra {
            let id = NodeUuid::new();
            store.apply_node_created(NodeInfo::new(id, format!("n{i}")), parent).unwrap();
            parent = id;
        }

        prop_assert_eq!(store.snapshot().unwrap().subtree_len(), store.node_count());
    }
}
