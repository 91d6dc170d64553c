//! Randomised checks of linkage consistency and layout geometry

use float_cmp::approx_eq;
use proptest::prelude::*;
use proptest::sample::Index;
use treelink::domain::{NodeId, Tree};
use treelink::layout::{reingold_tilford, LayoutParams, ATTR_X, ATTR_Y};

const EPSILON: f64 = 1e-6;

// ===================
// Strategies
// ===================

/// Parent choice for every node after the root: node `i + 1` hangs below one of
/// the nodes `0..=i`, so the result is always a single tree.
fn shape_strategy() -> impl Strategy<Value = Vec<Index>> {
    prop::collection::vec(any::<Index>(), 0..40)
}

fn moves_strategy() -> impl Strategy<Value = Vec<(Index, Index)>> {
    prop::collection::vec((any::<Index>(), any::<Index>()), 1..20)
}

fn pairs_strategy() -> impl Strategy<Value = Vec<(Index, Index)>> {
    prop::collection::vec((any::<Index>(), any::<Index>()), 1..10)
}

fn build(shape: &[Index]) -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::new();
    let mut ids = vec![tree.insert("n0")];
    for (i, choice) in shape.iter().enumerate() {
        let id = tree.insert(format!("n{}", i + 1));
        let parent = ids[choice.index(i + 1)];
        tree.append(parent, id).unwrap();
        ids.push(id);
    }
    (tree, ids)
}

type Links = Vec<(Option<NodeId>, Vec<NodeId>)>;

fn links(tree: &Tree, ids: &[NodeId]) -> Links {
    ids.iter()
        .map(|&id| (tree.parent(id), tree.children(id)))
        .collect()
}

fn coord(tree: &Tree, id: NodeId, key: &str) -> f64 {
    tree.get_attr(id, key)
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::NAN)
}

// ===================
// Property Test Functions
// ===================

/// Every child names its parent, every parent lists its children once, and every
/// parent chain ends at a root.
fn check_links_consistent(tree: &Tree, ids: &[NodeId]) -> Result<(), TestCaseError> {
    for &id in ids {
        for child in tree.children(id) {
            prop_assert_eq!(tree.parent(child), Some(id));
        }
        if let Some(parent) = tree.parent(id) {
            let listed = tree.children(parent).iter().filter(|&&c| c == id).count();
            prop_assert_eq!(listed, 1);
        }
        prop_assert!(tree.ancestors(id).count() < ids.len());
    }
    Ok(())
}

/// A move either succeeds and keeps the tree consistent, or fails and leaves every
/// link exactly as it was.
fn check_moves_are_atomic(shape: &[Index], moves: &[(Index, Index)]) -> Result<(), TestCaseError> {
    let (mut tree, ids) = build(shape);
    for (node, parent) in moves {
        let node = ids[node.index(ids.len())];
        let parent = ids[parent.index(ids.len())];
        let before = links(&tree, &ids);
        match tree.set_parent(node, Some(parent)) {
            Ok(()) => {
                prop_assert_eq!(tree.parent(node), Some(parent));
            }
            Err(e) => {
                prop_assert!(e.is_loop(), "unexpected error: {}", e);
                prop_assert_eq!(links(&tree, &ids), before);
            }
        }
        check_links_consistent(&tree, &ids)?;
    }
    Ok(())
}

/// A path runs from `from` to `to` through parent/child steps only, and its length
/// is fixed by the depths of its ends and of their lowest common ancestor.
fn check_path_lengths(shape: &[Index], pairs: &[(Index, Index)]) -> Result<(), TestCaseError> {
    let (tree, ids) = build(shape);
    for (from, to) in pairs {
        let from = ids[from.index(ids.len())];
        let to = ids[to.index(ids.len())];
        let path = tree.get_path(from, to).unwrap();
        let common = tree.lowest_common_ancestor(from, to).unwrap();

        prop_assert_eq!(path.first(), Some(&from));
        prop_assert_eq!(path.last(), Some(&to));
        for step in path.windows(2) {
            let linked = tree.parent(step[0]) == Some(step[1])
                || tree.parent(step[1]) == Some(step[0]);
            prop_assert!(linked, "{} and {} are not adjacent", step[0], step[1]);
        }
        let expected = tree.depth(from) + tree.depth(to) + 1 - 2 * tree.depth(common);
        prop_assert_eq!(path.len(), expected);
    }
    Ok(())
}

/// Same-depth nodes share `y` and parents sit over the middle of their children.
/// Neighbouring siblings keep the sibling separation; neighbouring cousins keep
/// the subtree separation.
fn check_layout_geometry(shape: &[Index], params: LayoutParams) -> Result<(), TestCaseError> {
    let (mut tree, ids) = build(shape);
    let root = ids[0];
    reingold_tilford(&mut tree, root, &params).unwrap();

    let levels: Vec<Vec<NodeId>> = tree.levelorder_groups(root).collect();
    for (depth, level) in levels.iter().enumerate() {
        let expected_y =
            (levels.len() - 1 - depth) as f64 * params.level_separation + params.y_offset;
        for &id in level {
            prop_assert!(approx_eq!(f64, coord(&tree, id, ATTR_Y), expected_y, epsilon = EPSILON));
        }
        for pair in level.windows(2) {
            let gap = coord(&tree, pair[1], ATTR_X) - coord(&tree, pair[0], ATTR_X);
            let required = if tree.parent(pair[0]) == tree.parent(pair[1]) {
                params.sibling_separation
            } else {
                params.subtree_separation
            };
            prop_assert!(gap >= required - EPSILON, "gap {} below {}", gap, required);
        }
    }

    for &id in &ids {
        let kids = tree.children(id);
        if let (Some(&first), Some(&last)) = (kids.first(), kids.last()) {
            let centre = (coord(&tree, first, ATTR_X) + coord(&tree, last, ATTR_X)) / 2.0;
            prop_assert!(approx_eq!(f64, coord(&tree, id, ATTR_X), centre, epsilon = EPSILON));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_trees_are_consistent(shape in shape_strategy()) {
        let (tree, ids) = build(&shape);
        check_links_consistent(&tree, &ids)?;
        prop_assert_eq!(tree.preorder(ids[0]).count(), ids.len());
    }

    #[test]
    fn random_moves_are_atomic(shape in shape_strategy(), moves in moves_strategy()) {
        check_moves_are_atomic(&shape, &moves)?;
    }

    #[test]
    fn paths_connect_their_ends(shape in shape_strategy(), pairs in pairs_strategy()) {
        check_path_lengths(&shape, &pairs)?;
    }

    #[test]
    fn layout_respects_geometry(
        shape in shape_strategy(),
        sibling in 0.5f64..3.0,
        subtree in 0.5f64..3.0,
        level in 0.5f64..2.0,
    ) {
        let params = LayoutParams {
            sibling_separation: sibling,
            subtree_separation: subtree,
            level_separation: level,
            ..LayoutParams::default()
        };
        check_layout_geometry(&shape, params)?;
    }
}
