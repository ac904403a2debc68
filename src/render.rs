/*
Text rendering of hierarchies via termtree.

Implemented as a trait so the same conversion serves a whole `Tree` (every
root) and a single `NodeRef` subtree.
 */
use std::fmt;

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::arena::Tree;
use crate::config::RenderSettings;
use crate::node::NodeRef;

pub trait TreeDisplay {
    fn to_term_tree(&self, settings: &RenderSettings) -> TermTree<String>;

    fn render(&self, settings: &RenderSettings) -> String {
        let term = self.to_term_tree(settings);
        let text = term.to_string();
        dismantle(term);
        text
    }
}

/// Drops a term tree level by level; the derived drop recurses per level.
fn dismantle(term: TermTree<String>) {
    let mut stack = vec![term];
    while let Some(mut current) = stack.pop() {
        stack.append(&mut current.leaves);
    }
}

impl<T: fmt::Display> TreeDisplay for NodeRef<'_, T> {
    /// Post-order walk: when a node is reached its children's labels are the
    /// last entries on the output stack, in order.
    #[instrument(level = "debug", skip_all, fields(node = %self.id()))]
    fn to_term_tree(&self, settings: &RenderSettings) -> TermTree<String> {
        let tree = self.tree();
        let mut built: Vec<TermTree<String>> = Vec::new();
        let mut stack = vec![(self.id(), 0usize, false)];

        while let Some((current, level, visited)) = stack.pop() {
            let Some(node) = tree.get_node(current) else {
                continue;
            };
            let expand = settings.max_depth.map_or(true, |max| level < max);
            if visited {
                let leaves = if expand {
                    built.split_off(built.len() - node.children().len())
                } else {
                    Vec::new()
                };
                built.push(TermTree::new(node.data.to_string()).with_leaves(leaves));
            } else {
                stack.push((current, level, true));
                if expand {
                    stack.extend(node.children().iter().rev().map(|&c| (c, level + 1, false)));
                }
            }
        }

        built
            .pop()
            .unwrap_or_else(|| TermTree::new(self.data().to_string()))
    }
}

impl<T: fmt::Display> TreeDisplay for Tree<T> {
    /// A single root is drawn as is; several roots hang off the empty label.
    fn to_term_tree(&self, settings: &RenderSettings) -> TermTree<String> {
        let mut roots: Vec<_> = self
            .roots()
            .iter()
            .filter_map(|&id| self.node(id))
            .map(|root| root.to_term_tree(settings))
            .collect();

        if roots.len() == 1 {
            roots.remove(0)
        } else {
            TermTree::new(settings.empty_label.clone()).with_leaves(roots)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let term = self.to_term_tree(&RenderSettings::default());
        let result = write!(f, "{}", term);
        dismantle(term);
        result
    }
}
