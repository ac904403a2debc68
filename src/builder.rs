//! Hierarchy builder: assembles trees from flat records linked by keys.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::arena::{NodeId, Tree};
use crate::config::BuilderSettings;
use crate::errors::{TreeError, TreeResult};

/// Key type usable as primary and parent key.
///
/// `is_absent` marks the "null" key: a parent-key group under an absent
/// key is never used as a child lookup target, so a record whose primary
/// key is absent never receives children. Only `Option::None` is absent
/// out of the box; implement the trait for your own key types as needed.
pub trait HierarchyKey: Eq + Hash + Clone + fmt::Debug {
    fn is_absent(&self) -> bool {
        false
    }
}

impl<K: Eq + Hash + Clone + fmt::Debug> HierarchyKey for Option<K> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

macro_rules! present_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl HierarchyKey for $ty {})*
    };
}

present_keys!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool, String,
    &str,
);

impl<A: HierarchyKey, B: HierarchyKey> HierarchyKey for (A, B) {}

/// Builds trees from records carrying a primary key and a parent key.
///
/// The builder holds only extraction functions and limits; each build call
/// is independent.
pub struct HierarchyBuilder<PK, FK> {
    primary_key: PK,
    parent_key: FK,
    settings: BuilderSettings,
}

impl<PK, FK> HierarchyBuilder<PK, FK> {
    pub fn new(primary_key: PK, parent_key: FK) -> Self {
        Self {
            primary_key,
            parent_key,
            settings: BuilderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: BuilderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds exactly one tree; the root is the only record whose parent key
    /// equals `root_marker`.
    ///
    /// # Errors
    ///
    /// * [`TreeError::NoRootFound`] if no record has `root_marker` as parent key.
    /// * [`TreeError::MultipleRootsFound`] if more than one does.
    /// * [`TreeError::KeyCycle`] / [`TreeError::DepthLimitExceeded`] during assembly.
    #[instrument(level = "debug", skip(self, records))]
    pub fn build_hierarchy<R, K, I>(&self, records: I, root_marker: K) -> TreeResult<Tree<R>>
    where
        I: IntoIterator<Item = R>,
        R: Clone,
        K: HierarchyKey,
        PK: Fn(&R) -> K,
        FK: Fn(&R) -> K,
    {
        let (mut roots, lookup) = self.group(records, &root_marker)?;
        if roots.len() > 1 {
            return Err(TreeError::MultipleRootsFound(roots.len()));
        }
        let root = roots.pop().ok_or(TreeError::NoRootFound)?;
        assemble(root, &lookup, &self.primary_key, &self.settings)
    }

    /// Builds one tree per record whose parent key equals `root_marker`.
    ///
    /// Grouping and the root check happen up front; each tree is assembled
    /// when the returned iterator is advanced, in input order of the roots.
    #[instrument(level = "debug", skip(self, records))]
    pub fn build_hierarchies<R, K, I>(
        &self,
        records: I,
        root_marker: K,
    ) -> TreeResult<Hierarchies<'_, R, K, PK>>
    where
        I: IntoIterator<Item = R>,
        R: Clone,
        K: HierarchyKey,
        PK: Fn(&R) -> K,
        FK: Fn(&R) -> K,
    {
        let (roots, lookup) = self.group(records, &root_marker)?;
        Ok(Hierarchies {
            roots: roots.into_iter(),
            lookup,
            primary_key: &self.primary_key,
            settings: &self.settings,
        })
    }

    fn group<R, K, I>(&self, records: I, root_marker: &K) -> TreeResult<(Vec<R>, HashMap<K, Vec<R>>)>
    where
        I: IntoIterator<Item = R>,
        R: Clone,
        K: HierarchyKey,
        FK: Fn(&R) -> K,
    {
        let mut groups = records.into_iter().into_group_map_by(|r| (self.parent_key)(r));
        debug!(groups = groups.len(), "grouped records by parent key");

        // the root group stays in the lookup unless its key is absent
        let roots = groups.get(root_marker).cloned().ok_or(TreeError::NoRootFound)?;
        groups.retain(|key, _| !key.is_absent());
        debug!(roots = roots.len(), lookup = groups.len(), "root set resolved");
        Ok((roots, groups))
    }
}

/// Lazily assembled trees, one per root record.
pub struct Hierarchies<'b, R, K, PK> {
    roots: std::vec::IntoIter<R>,
    lookup: HashMap<K, Vec<R>>,
    primary_key: &'b PK,
    settings: &'b BuilderSettings,
}

impl<R, K, PK> Iterator for Hierarchies<'_, R, K, PK>
where
    R: Clone,
    K: HierarchyKey,
    PK: Fn(&R) -> K,
{
    type Item = TreeResult<Tree<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let root = self.roots.next()?;
        Some(assemble(root, &self.lookup, self.primary_key, self.settings))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.roots.size_hint()
    }
}

impl<R, K, PK> ExactSizeIterator for Hierarchies<'_, R, K, PK>
where
    R: Clone,
    K: HierarchyKey,
    PK: Fn(&R) -> K,
{
}

/// Single-root build using the key type's default value (None for Option keys)
/// as root marker.
pub fn build_hierarchy<R, K, I, PK, FK>(records: I, primary_key: PK, parent_key: FK) -> TreeResult<Tree<R>>
where
    I: IntoIterator<Item = R>,
    R: Clone,
    K: HierarchyKey + Default,
    PK: Fn(&R) -> K,
    FK: Fn(&R) -> K,
{
    HierarchyBuilder::new(primary_key, parent_key).build_hierarchy(records, K::default())
}

/// Multi-root build using the key type's default value as root marker,
/// collected eagerly.
pub fn build_hierarchies<R, K, I, PK, FK>(records: I, primary_key: PK, parent_key: FK) -> TreeResult<Vec<Tree<R>>>
where
    I: IntoIterator<Item = R>,
    R: Clone,
    K: HierarchyKey + Default,
    PK: Fn(&R) -> K,
    FK: Fn(&R) -> K,
{
    let builder = HierarchyBuilder::new(primary_key, parent_key);
    let trees = builder.build_hierarchies(records, K::default())?;
    trees.collect()
}

/// Work item of the assembly stack.
enum Step<K> {
    /// Expand a node sitting `level` levels deep, the root being level 1
    Enter { node: NodeId, key: K, level: usize },
    /// Subtree of a node carrying this key is finished
    Exit(K),
}

/// Top-down assembly with an explicit stack.
///
/// Children of a node are inserted together in group order before any of
/// them is expanded, which keeps sibling order equal to input order. `path`
/// holds the primary keys of the expanded nodes between the root and the
/// current node; an `Exit` step drops a key again once its subtree is done,
/// so a key repeating along one branch is reported instead of expanding
/// forever.
fn assemble<R, K, PK>(
    root: R,
    lookup: &HashMap<K, Vec<R>>,
    primary_key: &PK,
    settings: &BuilderSettings,
) -> TreeResult<Tree<R>>
where
    R: Clone,
    K: HierarchyKey,
    PK: Fn(&R) -> K,
{
    // the root alone already occupies one level
    if let Some(max_depth @ 0) = settings.max_depth {
        return Err(TreeError::DepthLimitExceeded { max_depth });
    }

    let mut tree = Tree::new();
    let root_key = primary_key(&root);
    let root_idx = tree.insert(root);
    let mut path: HashSet<K> = HashSet::new();
    let mut stack = vec![Step::Enter {
        node: root_idx,
        key: root_key,
        level: 1,
    }];

    while let Some(step) = stack.pop() {
        let (current_idx, current_key, level) = match step {
            Step::Exit(key) => {
                path.remove(&key);
                continue;
            }
            Step::Enter { node, key, level } => (node, key, level),
        };
        let Some(children) = lookup.get(&current_key) else {
            continue;
        };
        if path.contains(&current_key) {
            return Err(TreeError::KeyCycle {
                key: format!("{:?}", current_key),
            });
        }
        if let Some(max_depth) = settings.max_depth {
            if level + 1 > max_depth {
                return Err(TreeError::DepthLimitExceeded { max_depth });
            }
        }
        path.insert(current_key.clone());
        stack.push(Step::Exit(current_key));

        trace!(children = children.len(), level, "attaching child group");
        let first_child = stack.len();
        for record in children {
            let key = primary_key(record);
            let child_idx = tree.insert_node(record.clone(), Some(current_idx));
            stack.push(Step::Enter {
                node: child_idx,
                key,
                level: level + 1,
            });
        }
        // first child on top of the stack
        stack[first_child..].reverse();
    }

    debug!(nodes = tree.len(), "hierarchy assembled");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        parent_id: Option<i32>,
        value: &'static str,
    }

    fn row(id: i32, parent_id: Option<i32>, value: &'static str) -> Row {
        Row { id, parent_id, value }
    }

    type Pair = (Option<i32>, Option<i32>);

    #[test]
    fn test_absent_primary_key_never_receives_children() {
        // (primary, parent): the None-keyed record must not adopt the None parent group
        let rows: Vec<Pair> = vec![(Some(1), Some(0)), (None, Some(1)), (Some(5), None)];
        let builder = HierarchyBuilder::new(|r: &Pair| r.0, |r: &Pair| r.1);
        let tree = builder.build_hierarchy(rows, Some(0)).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_root_group_stays_reachable_through_lookup() {
        let rows: Vec<Pair> = vec![(Some(1), Some(0)), (Some(0), Some(1))];
        let builder = HierarchyBuilder::new(|r: &Pair| r.0, |r: &Pair| r.1);
        // 1 -> 0 -> 1 again via the root group
        assert!(matches!(
            builder.build_hierarchy(rows, Some(0)),
            Err(TreeError::KeyCycle { .. })
        ));
    }

    #[test]
    fn test_key_cycle_is_reported() {
        let rows = vec![row(1, None, "root"), row(2, Some(1), "a"), row(1, Some(2), "again")];
        let result = build_hierarchy(rows, |r: &Row| Some(r.id), |r| r.parent_id);
        assert!(matches!(result, Err(TreeError::KeyCycle { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let rows = vec![row(1, None, "root"), row(2, Some(1), "a"), row(3, Some(2), "b")];
        let builder = HierarchyBuilder::new(|r: &Row| Some(r.id), |r: &Row| r.parent_id);

        let limited = builder.with_settings(BuilderSettings { max_depth: Some(2) });
        assert_eq!(
            limited.build_hierarchy(rows.clone(), None).unwrap_err(),
            TreeError::DepthLimitExceeded { max_depth: 2 }
        );

        let roomy = limited.with_settings(BuilderSettings { max_depth: Some(3) });
        assert_eq!(roomy.build_hierarchy(rows, None).unwrap().depth(), 3);
    }

    #[test]
    fn test_zero_depth_limit_rejects_lone_root() {
        let rows = vec![row(1, None, "root")];
        let builder = HierarchyBuilder::new(|r: &Row| Some(r.id), |r: &Row| r.parent_id);

        let none = builder.with_settings(BuilderSettings { max_depth: Some(0) });
        assert_eq!(
            none.build_hierarchy(rows.clone(), None).unwrap_err(),
            TreeError::DepthLimitExceeded { max_depth: 0 }
        );

        let single = none.with_settings(BuilderSettings { max_depth: Some(1) });
        assert_eq!(single.build_hierarchy(rows.clone(), None).unwrap().len(), 1);

        let with_child = vec![row(1, None, "root"), row(2, Some(1), "a")];
        assert_eq!(
            single.build_hierarchy(with_child, None).unwrap_err(),
            TreeError::DepthLimitExceeded { max_depth: 1 }
        );
    }

    #[test]
    fn test_sibling_with_repeated_key_is_not_a_cycle() {
        // "a" and "b" share key 2, the second one still gets the shared child
        let rows = vec![
            row(1, None, "root"),
            row(2, Some(1), "a"),
            row(2, Some(1), "b"),
            row(3, Some(2), "leaf"),
        ];
        let tree = build_hierarchy(rows, |r: &Row| Some(r.id), |r| r.parent_id).unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.leaves().len(), 2);
    }

    #[test]
    fn test_hierarchies_are_lazy_and_ordered() {
        let rows = vec![row(1, None, "r1"), row(2, None, "r2"), row(3, Some(2), "c")];
        let builder = HierarchyBuilder::new(|r: &Row| Some(r.id), |r: &Row| r.parent_id);
        let mut trees = builder.build_hierarchies(rows, None).unwrap();

        assert_eq!(trees.len(), 2);
        let first = trees.next().unwrap().unwrap();
        assert_eq!(first.root_node().unwrap().data().value, "r1");
        assert_eq!(trees.len(), 1);
        let second = trees.next().unwrap().unwrap();
        assert_eq!(second.len(), 2);
        assert!(trees.next().is_none());
    }
}
