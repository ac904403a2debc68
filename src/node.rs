use std::fmt;
use std::ptr;

use crate::arena::{Ancestors, NodeId, Tree, TreeIterator, TreeNode};

/// Read-only view of one node together with the tree that owns it.
///
/// Comparing two views with `==` compares payloads, the same way two
/// nodes holding equal data are considered equal. Use [`NodeRef::id`] or
/// [`NodeRef::is_descendant_of`] when identity matters.
pub struct NodeRef<'a, T> {
    tree: &'a Tree<T>,
    id: NodeId,
    node: &'a TreeNode<T>,
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, id: NodeId, node: &'a TreeNode<T>) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &'a T {
        &self.node.data
    }

    pub fn tree(&self) -> &'a Tree<T> {
        self.tree
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.node.parent().and_then(|p| self.tree.node(p))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, T>> + 'a {
        let (tree, node) = (self.tree, self.node);
        node.children().iter().filter_map(move |&c| tree.node(c))
    }

    pub fn child_count(&self) -> usize {
        self.node.children().len()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.node.is_root()
    }

    /// This node, then every node below it, depth-first pre-order.
    ///
    /// Each call starts a fresh walk.
    pub fn descendants(&self) -> TreeIterator<'a, T> {
        self.tree.descendants(self.id)
    }

    /// Parent first, then upward to the root. Empty for a root.
    pub fn ancestors(&self) -> Ancestors<'a, T> {
        self.tree.ancestors(self.id)
    }

    /// True iff `candidate` sits strictly above this node in the same tree.
    ///
    /// Identity based: a different node carrying an equal payload does not
    /// count, and a node is never its own descendant.
    pub fn is_descendant_of(&self, candidate: &NodeRef<'_, T>) -> bool {
        ptr::eq(self.tree, candidate.tree) && self.ancestors().any(|a| a.id == candidate.id)
    }

    /// Number of levels in the subtree rooted here, 1 for a leaf.
    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.id, 1)];

        while let Some((current, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.tree.get_node(current) {
                stack.extend(node.children().iter().map(|&c| (c, depth + 1)));
            }
        }

        max_depth
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T: PartialEq> PartialEq for NodeRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("data", self.data())
            .field("parent", &self.node.parent())
            .field("children", &self.node.children())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data())
    }
}
