/*
Predicate and containment helpers over a node's subtree and ancestor chain.

Predicates see every node; filtering never prunes, a node failing the
predicate still has its subtree walked. The containment helpers compare
payloads by value and treat an absent query value as "not found".
 */
use crate::arena::{Ancestors, TreeIterator};
use crate::node::NodeRef;

pub trait NodeQuery<'a, T> {
    /// Pre-order walk of this node and its subtree, keeping matches only.
    fn descendants_where<P>(&self, predicate: P) -> std::iter::Filter<TreeIterator<'a, T>, P>
    where
        P: FnMut(&NodeRef<'a, T>) -> bool;

    /// Short-circuits on the first match, pre-order, self included.
    fn descendants_any<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&NodeRef<'a, T>) -> bool;

    fn descendants_contains(&self, value: Option<&T>) -> bool
    where
        T: PartialEq;

    /// Ancestors (self excluded) walking upward, keeping matches only.
    fn ancestors_where<P>(&self, predicate: P) -> std::iter::Filter<Ancestors<'a, T>, P>
    where
        P: FnMut(&NodeRef<'a, T>) -> bool;

    /// True iff the node has a parent.
    fn ancestors_any(&self) -> bool;

    fn ancestors_any_where<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&NodeRef<'a, T>) -> bool;

    fn ancestors_contains(&self, value: Option<&T>) -> bool
    where
        T: PartialEq;
}

impl<'a, T> NodeQuery<'a, T> for NodeRef<'a, T> {
    fn descendants_where<P>(&self, predicate: P) -> std::iter::Filter<TreeIterator<'a, T>, P>
    where
        P: FnMut(&NodeRef<'a, T>) -> bool,
    {
        self.descendants().filter(predicate)
    }

    fn descendants_any<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&NodeRef<'a, T>) -> bool,
    {
        self.descendants().any(|n| predicate(&n))
    }

    fn descendants_contains(&self, value: Option<&T>) -> bool
    where
        T: PartialEq,
    {
        match value {
            Some(value) => self.descendants().any(|n| n.data() == value),
            None => false,
        }
    }

    fn ancestors_where<P>(&self, predicate: P) -> std::iter::Filter<Ancestors<'a, T>, P>
    where
        P: FnMut(&NodeRef<'a, T>) -> bool,
    {
        self.ancestors().filter(predicate)
    }

    fn ancestors_any(&self) -> bool {
        !self.is_root()
    }

    fn ancestors_any_where<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&NodeRef<'a, T>) -> bool,
    {
        self.ancestors().any(|n| predicate(&n))
    }

    fn ancestors_contains(&self, value: Option<&T>) -> bool
    where
        T: PartialEq,
    {
        match value {
            Some(value) => self.ancestors().any(|n| n.data() == value),
            None => false,
        }
    }
}
