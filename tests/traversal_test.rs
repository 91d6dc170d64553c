//! Traversal orders over N-ary and binary trees

use rstest::rstest;
use treelink::domain::{BinaryTree, ChildSlots, Forest, NodeId, Tree};

fn names<S: ChildSlots>(
    forest: &Forest<S>,
    ids: impl IntoIterator<Item = NodeId>,
) -> Vec<String> {
    ids.into_iter()
        .filter_map(|id| forest.name(id).map(str::to_string))
        .collect()
}

#[rstest]
fn given_heap_tree_when_traversed_then_orders_match_textbook() {
    let mut tree = BinaryTree::new();
    let root = tree.from_heap_list(&[1, 2, 3, 4, 5, 6, 7]).unwrap().unwrap();
    assert_eq!(names(&tree, tree.preorder(root)), ["1", "2", "4", "5", "3", "6", "7"]);
    assert_eq!(names(&tree, tree.postorder(root)), ["4", "5", "2", "6", "7", "3", "1"]);
    assert_eq!(names(&tree, tree.levelorder(root)), ["1", "2", "3", "4", "5", "6", "7"]);
    assert_eq!(names(&tree, tree.zigzag(root)), ["1", "3", "2", "4", "5", "6", "7"]);
}

#[rstest]
fn given_binary_node_with_right_slot_only_when_traversed_then_skips_empty_slot() {
    let mut tree = BinaryTree::new();
    let [a, b, c] = ["a", "b", "c"].map(|n| tree.insert(n));
    tree.set_right(a, Some(b)).unwrap();
    tree.set_left(b, Some(c)).unwrap();
    assert_eq!(names(&tree, tree.preorder(a)), ["a", "b", "c"]);
    assert_eq!(tree.levelorder_groups(a).count(), 3);
}

#[rstest]
fn given_deep_chain_when_traversed_then_no_stack_exhaustion() {
    let mut tree = Tree::new();
    let root = tree.insert("0");
    let mut last = root;
    for i in 1..5_000 {
        let next = tree.insert(i.to_string());
        tree.append(last, next).unwrap();
        last = next;
    }
    assert_eq!(tree.preorder(root).count(), 5_000);
    assert_eq!(tree.postorder(root).next(), Some(last));
    assert_eq!(tree.depth(last), 5_000);
}

#[rstest]
fn given_level_groups_when_collected_then_one_group_per_depth() {
    let mut tree = Tree::new();
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|n| tree.insert(n));
    tree.set_children(a, &[b, c]).unwrap();
    tree.append(c, d).unwrap();
    let groups: Vec<Vec<String>> = tree
        .levelorder_groups(a)
        .map(|level| names(&tree, level))
        .collect();
    assert_eq!(groups, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
}

#[rstest]
fn given_unknown_id_when_traversed_then_empty() {
    let mut tree = Tree::new();
    let a = tree.insert("a");
    tree.remove_subtree(a).unwrap();
    assert_eq!(tree.preorder(a).count(), 0);
    assert_eq!(tree.levelorder_groups(a).count(), 0);
}

#[rstest]
fn given_mutation_after_traversal_when_traversed_again_then_reflects_new_links() {
    let mut tree = Tree::new();
    let [a, b, c] = ["a", "b", "c"].map(|n| tree.insert(n));
    tree.set_children(a, &[b, c]).unwrap();
    let before: Vec<NodeId> = tree.preorder(a).collect();
    tree.append(b, c).unwrap();
    let after: Vec<NodeId> = tree.preorder(a).collect();
    assert_eq!(before, vec![a, b, c]);
    assert_eq!(after, vec![a, b, c]);
    assert_eq!(names(&tree, tree.postorder(a)), ["c", "b", "a"]);
}
