use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::errors::{TreeError, TreeResult};
use crate::node::NodeRef;

/// Handle to a node stored in a [`Tree`].
///
/// Handles are generation checked: a handle from another tree, or one that
/// outlived its node, resolves to nothing instead of aliasing a new node.
/// Node identity is handle identity, independent of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "#{}@{}", idx, generation)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Payload carried by this node
    pub data: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<T> TreeNode<T> {
    /// Handle of the parent node, None for root nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Handles of the child nodes in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-based tree structure.
///
/// The arena owns every node; a parent lists its children by handle and each
/// child points back at its parent by handle, so there is no ownership cycle.
/// Nodes that have not been attached anywhere are roots. Trees produced by
/// the hierarchy builder or by [`Tree::with_root`] have exactly one root, a
/// tree wired by hand may temporarily hold several.
///
/// Mutation needs `&mut Tree` while every iterator borrows it shared, so
/// attaching during enumeration is rejected at compile time.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    arena: Arena<TreeNode<T>>,
    /// Parentless nodes in insertion order
    roots: Vec<NodeId>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Creates a tree holding a single leaf root.
    pub fn with_root(data: T) -> Self {
        let mut tree = Self::new();
        tree.insert(data);
        tree
    }

    /// Inserts a detached leaf node and returns its handle.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert(&mut self, data: T) -> NodeId {
        self.insert_node(data, None)
    }

    /// Creates a node holding `data` and appends it to `parent`'s children.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_child(&mut self, parent: NodeId, data: T) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::NodeNotFound(parent));
        }
        Ok(self.insert_node(data, Some(parent)))
    }

    /// Callers guarantee that `parent` resolves.
    pub(crate) fn insert_node(&mut self, data: T, parent: Option<NodeId>) -> NodeId {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = NodeId(self.arena.insert(node));

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx.0) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    /// Appends an existing root node to `parent`'s children.
    ///
    /// Both sides of the link are updated together. Nothing is modified when
    /// the call fails.
    ///
    /// # Errors
    ///
    /// * [`TreeError::NodeNotFound`] if either handle does not resolve.
    /// * [`TreeError::AlreadyAttached`] if `child` already has a parent.
    /// * [`TreeError::CycleDetected`] if `child` is `parent` or one of its ancestors.
    #[instrument(level = "trace", skip(self))]
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_attachable(parent, child)?;
        self.link(parent, child);
        if let Some(pos) = self.roots.iter().position(|&root| root == child) {
            self.roots.remove(pos);
        }
        Ok(())
    }

    /// Attaches each child in order; the resulting child order follows the
    /// input order. Every handle is validated before the first link is made.
    #[instrument(level = "trace", skip(self, children))]
    pub fn attach_children<I>(&mut self, parent: NodeId, children: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let children: Vec<NodeId> = children.into_iter().collect();
        let mut seen = HashSet::with_capacity(children.len());
        for &child in &children {
            self.check_attachable(parent, child)?;
            if !seen.insert(child) {
                return Err(TreeError::AlreadyAttached { child, parent });
            }
        }
        for &child in &children {
            self.link(parent, child);
        }
        // one pass over the roots for the whole batch
        self.roots.retain(|root| !seen.contains(root));
        Ok(())
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        if !self.contains(parent) {
            return Err(TreeError::NodeNotFound(parent));
        }
        let child_node = self.get_node(child).ok_or(TreeError::NodeNotFound(child))?;
        if let Some(existing) = child_node.parent {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        // child is a root here, so a cycle means parent lives below it
        if parent == child || self.ancestor_ids(parent).any(|a| a == child) {
            return Err(TreeError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Sets both sides of the link; callers drop `child` from `roots`.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent.0) {
            node.children.push(child);
        }
        trace!(%parent, %child, "linked");
    }

    fn ancestor_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get_node(id).and_then(|n| n.parent), move |&current| {
            self.get_node(current).and_then(|n| n.parent)
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.arena.get(id.0)
    }

    /// Borrowed view of a node with the traversal operations attached.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, T>> {
        self.get_node(id).map(|node| NodeRef::new(self, id, node))
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.get_node(id).map(|n| &n.data)
    }

    /// Payloads may change freely; structure only changes through attach.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id.0).map(|n| &mut n.data)
    }

    /// First root of the tree, None for empty trees
    pub fn root(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    pub fn root_node(&self) -> Option<NodeRef<'_, T>> {
        self.root().and_then(|id| self.node(id))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk over every root's subtree, roots in insertion order.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Post-order walk over every root's subtree, roots in insertion order.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// The node itself followed by its subtree in pre-order.
    /// A handle that does not resolve yields an empty walk.
    pub fn descendants(&self, id: NodeId) -> TreeIterator<'_, T> {
        TreeIterator::new(self, vec![id])
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            next: self.get_node(id).and_then(|n| n.parent),
        }
    }

    /// True iff `candidate` is found strictly above `id` by handle identity.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant_of(&self, id: NodeId, candidate: NodeId) -> TreeResult<bool> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        if !self.contains(candidate) {
            return Err(TreeError::NodeNotFound(candidate));
        }
        Ok(self.ancestor_ids(id).any(|a| a == candidate))
    }

    /// Number of levels of the deepest root subtree, 0 for empty trees.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .filter_map(|&root| self.node(root))
            .map(|root| root.height())
            .max()
            .unwrap_or(0)
    }

    /// Collects all leaf nodes in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<NodeRef<'_, T>> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }
}

/// Depth-first pre-order iterator driven by an explicit stack.
pub struct TreeIterator<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(tree: &'a Tree<T>, stack: Vec<NodeId>) -> Self {
        Self { tree, stack }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some(NodeRef::new(self.tree, current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let stack = tree.roots.iter().rev().map(|&root| (root, false)).collect();
        Self { tree, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                if visited {
                    return Some(NodeRef::new(self.tree, current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

/// Walks parent links upward; empty for a root.
pub struct Ancestors<'a, T> {
    tree: &'a Tree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for Ancestors<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let node = self.tree.get_node(current)?;
        self.next = node.parent;
        Some(NodeRef::new(self.tree, current, node))
    }
}
