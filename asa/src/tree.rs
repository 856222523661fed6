//! The 2-3 tree index over [`ValueNode`]s.
//!
//! Every key stored here is a handle into the shared
//! [`crate::queue::SortedQueue`] arena, never a owned copy: the tree only
//! ever borrows a value's ordering through the queue, so a key compares by
//! delegating to the queue that actually owns it. Minimum degree is fixed at
//! `T = 1`: a node holds 1 or 2 keys and 2 or 3 children, and overflows at 3
//! keys (the classic 2-3 tree).

use crate::arena::{Arena, Handle};
use crate::queue::SortedQueue;
use crate::value_node::ValueNodeHandle;

/// Fixed minimum degree of every tree node.
const T: usize = 1;

pub struct TreeNode<K> {
    pub(crate) keys: Vec<ValueNodeHandle<K>>,
    pub(crate) children: Vec<TreeNodeHandle<K>>,
    pub(crate) leaf: bool,
    pub(crate) parent: Option<TreeNodeHandle<K>>,
}

/// Stable reference to a [`TreeNode`].
pub type TreeNodeHandle<K> = Handle<TreeNode<K>>;

impl<K> TreeNode<K> {
    pub(crate) fn leaf_node(parent: Option<TreeNodeHandle<K>>) -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            leaf: true,
            parent,
        }
    }

    pub(crate) fn branch(
        key: ValueNodeHandle<K>,
        left: TreeNodeHandle<K>,
        right: TreeNodeHandle<K>,
    ) -> Self {
        Self {
            keys: vec![key],
            children: vec![left, right],
            leaf: false,
            parent: None,
        }
    }
}

/// A node overflows once it picks up a third key; splitting restores the invariant.
pub(crate) fn overflow<K>(node: &TreeNode<K>) -> bool {
    node.keys.len() >= 2 * T + 1
}

/// Insert `key` into the leaf `handle`, or bump its count if already present.
///
/// Mirrors the queue-splicing logic a leaf insert needs: a brand new key gets
/// its own [`crate::value_node::ValueNode`] linked into the sorted queue
/// next to its future tree neighbour.
pub(crate) fn add_new<K: Ord>(
    nodes: &mut Arena<TreeNode<K>>,
    queue: &mut SortedQueue<K>,
    handle: TreeNodeHandle<K>,
    key: K,
) -> ValueNodeHandle<K> {
    let keys = nodes
        .get(handle)
        .expect("dangling tree node handle")
        .keys
        .clone();

    if keys.is_empty() {
        let added = queue.add_first(key);
        nodes.get_mut(handle).expect("dangling tree node handle").keys.push(added);
        return added;
    }

    if let Some(existing) = keys.iter().copied().find(|&k| *queue.key(k) == key) {
        queue.increment(existing);
        return existing;
    }

    for (i, &k) in keys.iter().enumerate() {
        if key < *queue.key(k) {
            let added = queue.add_neighbour(key, k);
            nodes
                .get_mut(handle)
                .expect("dangling tree node handle")
                .keys
                .insert(i, added);
            return added;
        }
    }

    let anchor = *keys.last().expect("non-empty key list");
    let added = queue.add_neighbour(key, anchor);
    nodes
        .get_mut(handle)
        .expect("dangling tree node handle")
        .keys
        .push(added);
    added
}

/// Insert a key promoted up from a child split, keeping `handle`'s keys sorted.
pub(crate) fn add_promoted<K: Ord>(
    nodes: &mut Arena<TreeNode<K>>,
    queue: &SortedQueue<K>,
    handle: TreeNodeHandle<K>,
    promoted: ValueNodeHandle<K>,
) {
    let promoted_key = queue.key(promoted);
    let node = nodes.get_mut(handle).expect("dangling tree node handle");
    let pos = node
        .keys
        .iter()
        .position(|&k| promoted_key < queue.key(k))
        .unwrap_or(node.keys.len());
    node.keys.insert(pos, promoted);
}

/// Split an overflowing node into two nodes of `T` keys each plus a
/// promoted middle key. The original node is removed from the arena; its
/// children (if any) are re-parented onto the two new nodes. Returns the
/// promoted key, the new left and right nodes, and the original node's
/// parent (so the caller can link the split result into the tree).
pub(crate) fn split<K>(
    nodes: &mut Arena<TreeNode<K>>,
    handle: TreeNodeHandle<K>,
) -> (
    ValueNodeHandle<K>,
    TreeNodeHandle<K>,
    TreeNodeHandle<K>,
    Option<TreeNodeHandle<K>>,
) {
    let node = nodes.remove(handle).expect("dangling tree node handle");
    let TreeNode {
        mut keys,
        mut children,
        leaf,
        parent,
    } = node;

    let right_keys = keys.split_off(T + 1);
    let promoted = keys.pop().expect("overflowing node has 2t+1 keys");
    let left_keys = keys;

    let (left_children, right_children) = if leaf {
        (Vec::new(), Vec::new())
    } else {
        let right_children = children.split_off(T + 1);
        (children, right_children)
    };

    let left = nodes.insert(TreeNode {
        keys: left_keys,
        children: left_children,
        leaf,
        parent: None,
    });
    let right = nodes.insert(TreeNode {
        keys: right_keys,
        children: right_children,
        leaf,
        parent: None,
    });

    if !leaf {
        let left_kids = nodes.get(left).expect("just inserted").children.clone();
        for child in left_kids {
            nodes.get_mut(child).expect("dangling tree node handle").parent = Some(left);
        }
        let right_kids = nodes.get(right).expect("just inserted").children.clone();
        for child in right_kids {
            nodes.get_mut(child).expect("dangling tree node handle").parent = Some(right);
        }
    }

    (promoted, left, right, parent)
}
