//! Parent-free mirror of a tree for external formats.
//!
//! A [`PlainNode`] owns its children directly and carries no parent link,
//! so any serde format that handles nested structures (JSON, TOML, ...)
//! can write and read it. Converting back rebuilds every parent link.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PlainNode<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlainNode<T>>,
}

impl<T> PlainNode<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    pub fn with_children(data: T, children: Vec<PlainNode<T>>) -> Self {
        Self { data, children }
    }

    pub fn add_child(&mut self, child: PlainNode<T>) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Builds a live tree from this mirror, wiring parent links from scratch.
    #[instrument(level = "debug", skip_all)]
    pub fn into_tree(self) -> Tree<T> {
        let mut tree = Tree::new();
        let mut stack: Vec<(PlainNode<T>, Option<NodeId>)> = vec![(self, None)];

        while let Some((plain, parent)) = stack.pop() {
            let node_idx = tree.insert_node(plain.data, parent);
            // Push children in reverse order so they are inserted left to right
            for child in plain.children.into_iter().rev() {
                stack.push((child, Some(node_idx)));
            }
        }

        debug!(nodes = tree.len(), "tree rebuilt from plain representation");
        tree
    }
}

impl<T: fmt::Display> fmt::Display for PlainNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl<T> From<PlainNode<T>> for Tree<T> {
    fn from(plain: PlainNode<T>) -> Self {
        plain.into_tree()
    }
}

impl<T> Tree<T> {
    pub fn from_plain(plain: PlainNode<T>) -> Self {
        plain.into_tree()
    }
}

impl<T: Clone> Tree<T> {
    /// Deep copy of the subtree under `id`, keeping child order.
    ///
    /// Post-order walk: when a node is reached its children's copies are the
    /// last entries on the output stack, in order.
    #[instrument(level = "debug", skip(self))]
    pub fn to_plain(&self, id: NodeId) -> TreeResult<PlainNode<T>> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }

        let mut built: Vec<PlainNode<T>> = Vec::new();
        let mut stack = vec![(id, false)];

        while let Some((current, visited)) = stack.pop() {
            let Some(node) = self.get_node(current) else {
                continue;
            };
            if visited {
                let children = built.split_off(built.len() - node.children().len());
                built.push(PlainNode::with_children(node.data.clone(), children));
            } else {
                stack.push((current, true));
                stack.extend(node.children().iter().rev().map(|&c| (c, false)));
            }
        }

        built.pop().ok_or(TreeError::NodeNotFound(id))
    }

    /// Plain copy of the first root, None for empty trees.
    pub fn root_to_plain(&self) -> Option<PlainNode<T>> {
        self.root().and_then(|root| self.to_plain(root).ok())
    }
}
