//! Tests for Tree / NodeRef construction and traversal

use hierarchy::{NodeId, Tree, TreeError};
use rstest::{fixture, rstest};

// root
// ├── child1
// │   ├── grandchild1
// │   └── grandchild2
// └── child2
struct Sample {
    tree: Tree<String>,
    root: NodeId,
    child1: NodeId,
    grandchild1: NodeId,
    grandchild2: NodeId,
    child2: NodeId,
}

#[fixture]
fn sample() -> Sample {
    hierarchy::util::testing::init_test_setup();
    let mut tree = Tree::new();
    let root = tree.insert("root".to_string());
    let child1 = tree.insert("child1".to_string());
    let child2 = tree.insert("child2".to_string());
    let grandchild1 = tree.insert("grandchild1".to_string());
    let grandchild2 = tree.insert("grandchild2".to_string());
    tree.attach_children(root, [child1, child2]).unwrap();
    tree.attach_children(child1, [grandchild1, grandchild2]).unwrap();
    Sample {
        tree,
        root,
        child1,
        grandchild1,
        grandchild2,
        child2,
    }
}

fn names<'a>(nodes: impl Iterator<Item = hierarchy::NodeRef<'a, String>>) -> Vec<&'a str> {
    nodes.map(|n| n.data().as_str()).collect()
}

#[rstest]
fn given_new_tree_when_inserting_then_node_is_leaf_and_root() {
    let tree = Tree::with_root(42);
    let root = tree.root_node().unwrap();

    assert!(root.is_leaf());
    assert!(root.is_root());
    assert_eq!(root.parent(), None);
    assert_eq!(root.descendants().count(), 1);
    assert_eq!(root.ancestors().count(), 0);
}

#[rstest]
fn given_attached_children_when_reading_then_order_and_parent_are_set(sample: Sample) {
    let root = sample.tree.node(sample.root).unwrap();

    assert_eq!(names(root.children()), vec!["child1", "child2"]);
    assert_eq!(sample.tree.roots(), &[sample.root]);
    let child1 = sample.tree.node(sample.child1).unwrap();
    assert_eq!(child1.parent().unwrap().id(), sample.root);
    assert!(!child1.is_root());
    assert!(!child1.is_leaf());
}

#[rstest]
fn given_tree_when_listing_descendants_then_preorder_including_self(sample: Sample) {
    let root = sample.tree.node(sample.root).unwrap();
    assert_eq!(
        names(root.descendants()),
        vec!["root", "child1", "grandchild1", "grandchild2", "child2"]
    );

    // re-invocable: a second call walks again from the start
    assert_eq!(root.descendants().count(), 5);

    let leaf = sample.tree.node(sample.child2).unwrap();
    assert_eq!(names(leaf.descendants()), vec!["child2"]);
}

#[rstest]
fn given_tree_when_listing_ancestors_then_walks_up_to_root(sample: Sample) {
    let grandchild = sample.tree.node(sample.grandchild2).unwrap();
    assert_eq!(names(grandchild.ancestors()), vec!["child1", "root"]);
    assert_eq!(sample.tree.ancestors(sample.root).count(), 0);
}

#[rstest]
fn given_tree_when_checking_descendant_then_matches_ancestors(sample: Sample) {
    let all: Vec<NodeId> = sample.tree.iter().map(|n| n.id()).collect();
    for &node in &all {
        let ancestors: Vec<NodeId> = sample.tree.ancestors(node).map(|n| n.id()).collect();
        for &candidate in &all {
            assert_eq!(
                sample.tree.is_descendant_of(node, candidate).unwrap(),
                ancestors.contains(&candidate)
            );
        }
        assert!(!sample.tree.is_descendant_of(node, node).unwrap());
    }
    assert!(sample.tree.is_descendant_of(sample.grandchild1, sample.root).unwrap());
    assert!(!sample.tree.is_descendant_of(sample.grandchild1, sample.child2).unwrap());
}

#[rstest]
fn given_equal_payloads_when_checking_descendant_then_identity_decides() {
    let mut tree = Tree::new();
    let root = tree.insert("x");
    let twin = tree.insert("x");
    let child = tree.insert_child(root, "y").unwrap();

    assert!(tree.is_descendant_of(child, root).unwrap());
    assert!(!tree.is_descendant_of(child, twin).unwrap());
    assert_eq!(tree.node(root).unwrap(), tree.node(twin).unwrap());
}

#[rstest]
fn given_attached_child_when_attaching_again_then_already_attached(sample: Sample) {
    let mut tree = sample.tree;

    let result = tree.attach_child(sample.child2, sample.grandchild1);

    assert_eq!(
        result,
        Err(TreeError::AlreadyAttached {
            child: sample.grandchild1,
            parent: sample.child1
        })
    );
    assert!(tree.get_node(sample.child2).unwrap().is_leaf());
}

#[rstest]
fn given_root_when_attaching_under_own_descendant_then_cycle_detected(sample: Sample) {
    let mut tree = sample.tree;

    let result = tree.attach_child(sample.grandchild1, sample.root);

    assert_eq!(
        result,
        Err(TreeError::CycleDetected {
            parent: sample.grandchild1,
            child: sample.root
        })
    );
    assert_eq!(tree.roots(), &[sample.root]);
}

#[rstest]
fn given_tree_when_mutating_payload_then_structure_is_kept(sample: Sample) {
    let mut tree = sample.tree;
    tree.data_mut(sample.child2).unwrap().push_str("-renamed");

    assert_eq!(tree.data(sample.child2).unwrap(), "child2-renamed");
    assert_eq!(tree.node(sample.child2).unwrap().parent().unwrap().id(), sample.root);
}

#[rstest]
fn given_tree_when_measuring_then_depth_and_leaves_match(sample: Sample) {
    assert_eq!(sample.tree.depth(), 3);
    assert_eq!(
        names(sample.tree.leaves().into_iter()),
        vec!["grandchild1", "grandchild2", "child2"]
    );
    assert_eq!(
        names(sample.tree.iter_postorder()),
        vec!["grandchild1", "grandchild2", "child1", "child2", "root"]
    );
}

#[rstest]
fn given_deep_chain_when_walking_then_no_recursion_limit() {
    let mut tree = Tree::new();
    let mut current = tree.insert(0u32);
    for i in 1..200_000 {
        current = tree.insert_child(current, i).unwrap();
    }

    assert_eq!(tree.iter().count(), 200_000);
    assert_eq!(tree.ancestors(current).count(), 199_999);
    assert_eq!(tree.depth(), 200_000);
}
