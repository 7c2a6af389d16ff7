//! Tree model tests: building, search and traversal order

use rstest::{fixture, rstest};

use treeprint::util::testing;
use treeprint::{ToTermTree, Tree, Value};

#[fixture]
fn sample() -> Tree {
    testing::init_test_setup();
    // .
    // ├─ [1]  a
    // │   ├─ x
    // │   └─ [0]  dup
    // │       └─ [[1 2]]  deep
    // ├─ dup
    // └─ [1.5]  list
    let mut tree = Tree::new();
    tree.root_mut()
        .add_meta_branch(1, "a")
        .add_node("x")
        .add_meta_branch(0, "dup")
        .add_meta_node(vec![1, 2], "deep");
    tree.root_mut()
        .add_node("dup")
        .add_meta_node(1.5, vec!["p", "q"]);
    tree
}

// ============================================================
// Building
// ============================================================

#[rstest]
fn given_builder_calls_when_done_then_counts_nodes(sample: Tree) {
    assert_eq!(sample.node_count(), 7);
    assert_eq!(sample.root().child_count(), 3);
    assert_eq!(sample.root().depth(), 4);
}

#[test]
fn given_leaf_when_find_last_child_then_none() {
    let mut tree = Tree::new();
    assert!(tree.root().find_last_child().is_none());
    tree.root_mut().add_node("first").add_node("second");
    assert_eq!(
        tree.root().find_last_child().unwrap().value(),
        &Value::from("second")
    );
}

#[test]
fn given_add_branch_when_returned_then_handle_points_to_child() {
    let mut tree = Tree::new();
    let branch = tree.root_mut().add_branch("b");
    let id = branch.id();
    assert_eq!(branch.as_node_ref().value(), &Value::from("b"));
    assert_eq!(tree.node(id).unwrap().parent().unwrap().id(), tree.root_id());
}

#[test]
fn given_add_node_when_returned_then_handle_points_to_parent() {
    let mut tree = Tree::new();
    let id = tree.root_mut().add_node("leaf").id();
    assert_eq!(id, tree.root_id());
}

// ============================================================
// Search
// ============================================================

#[rstest]
fn given_duplicate_values_when_find_by_value_then_first_pre_order_match(sample: Tree) {
    let found = sample.root().find_by_value("dup").unwrap();
    assert_eq!(found.parent().unwrap().value(), &Value::from("a"));
    assert_eq!(found.meta(), Some(&Value::Int(0)));
}

#[rstest]
fn given_value_below_first_level_when_find_by_value_then_found(sample: Tree) {
    let found = sample.root().find_by_value("deep").unwrap();
    assert!(found.is_leaf());
    assert_eq!(found.meta(), Some(&Value::from(vec![1, 2])));
}

#[rstest]
fn given_composite_value_when_find_by_value_then_compares_structurally(sample: Tree) {
    let found = sample
        .root()
        .find_by_value(vec![Value::from("p"), Value::from("q")])
        .unwrap();
    assert_eq!(found.meta(), Some(&Value::Float(1.5)));
}

#[rstest]
#[case(Value::from("missing"))]
#[case(Value::from("."))]
#[case(Value::from(1))]
fn given_absent_value_when_find_by_value_then_none(sample: Tree, #[case] target: Value) {
    assert!(sample.root().find_by_value(target).is_none());
}

#[rstest]
fn given_meta_when_find_by_meta_then_returns_first_match(sample: Tree) {
    assert_eq!(
        sample.root().find_by_meta(1).unwrap().value(),
        &Value::from("a")
    );
    assert_eq!(
        sample.root().find_by_meta(0).unwrap().value(),
        &Value::from("dup")
    );
    assert_eq!(
        sample.root().find_by_meta(vec![1, 2]).unwrap().value(),
        &Value::from("deep")
    );
}

#[rstest]
#[case(Value::Float(1.0))]
#[case(Value::from("1"))]
#[case(Value::Bool(false))]
fn given_other_kind_when_find_by_meta_then_none(sample: Tree, #[case] target: Value) {
    assert!(sample.root().find_by_meta(target).is_none());
}

#[rstest]
fn given_subtree_when_searching_then_only_descendants(sample: Tree) {
    let a = sample.root().find_by_value("a").unwrap();
    assert!(a.find_by_value("a").is_none());
    assert!(a.find_by_meta(1.5).is_none());
    assert!(a.find_by_value("x").is_some());
}

// ============================================================
// Traversal
// ============================================================

#[rstest]
fn given_tree_when_visit_all_then_child_followed_by_its_subtree(sample: Tree) {
    let mut seen = Vec::new();
    sample.root().visit_all(|node| seen.push(node.value().to_string()));
    assert_eq!(seen, ["a", "x", "dup", "deep", "dup", "[p q]"]);
}

#[test]
fn given_two_branches_when_visit_all_then_not_level_order() {
    let mut tree = Tree::new();
    tree.root_mut().add_branch("b1").add_node("b1c");
    tree.root_mut().add_branch("b2").add_node("b2c");

    let mut seen = Vec::new();
    tree.root().visit_all(|node| seen.push(node.value().to_string()));
    assert_eq!(seen, ["b1", "b1c", "b2", "b2c"]);
}

#[test]
fn given_leaf_when_visit_all_then_visitor_never_called() {
    let tree = Tree::new();
    let mut calls = 0;
    tree.root().visit_all(|_| calls += 1);
    assert_eq!(calls, 0);
}

#[rstest]
fn given_tree_when_leaf_values_then_in_render_order(sample: Tree) {
    let leaves: Vec<String> = sample
        .root()
        .leaf_values()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(leaves, ["x", "deep", "dup", "[p q]"]);
}

// ============================================================
// termtree interop
// ============================================================

#[rstest]
fn given_tree_when_converted_to_termtree_then_same_shape(sample: Tree) {
    let converted = sample.to_termtree();
    assert_eq!(converted.root, ".");
    assert_eq!(converted.leaves.len(), 3);
    assert_eq!(converted.leaves[0].root, "[1]  a");
    assert_eq!(converted.leaves[0].leaves[1].leaves[0].root, "[[1 2]]  deep");
}
