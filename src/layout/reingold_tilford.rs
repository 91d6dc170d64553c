//! Reingold-Tilford layout with Walker's improvement for m-ary trees.
//!
//! 1. **First pass (post-order):** preliminary `x` per node. A leftmost child sits
//!    over the midpoint of its own children; any other node sits one sibling
//!    separation right of its left sibling, and its `mod` re-centres its subtree.
//! 2. **Second pass (level-order):** sibling groups are separated by walking the
//!    right contour of each left subtree against the left contour of the right
//!    subtree. Levels are processed deepest first so that each subtree is settled
//!    before it is compared with its siblings. A conflict shifts the right sibling
//!    in full and every sibling after the left one by its share of the gap, which
//!    keeps them evenly spaced; the parent is then re-centred through its `mod`.
//! 3. **Third pass (pre-order):** final `x` adds the `mod` of every ancestor and
//!    the x offset; `y` is derived from the depth.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::domain::{ChildSlots, Forest, NodeId, TreeResult};
use crate::layout::{Bounds, LayoutParams, ATTR_MOD, ATTR_SHIFT, ATTR_X, ATTR_Y};

#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    x: f64,
    modifier: f64,
    shift: f64,
}

type Placements = HashMap<NodeId, Placement>;

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Snapshot of the subtree shape, taken once so the passes do not re-walk the forest.
#[derive(Debug)]
struct Frame {
    root: NodeId,
    children: HashMap<NodeId, Vec<NodeId>>,
    left_sibling: HashMap<NodeId, NodeId>,
    levels: Vec<Vec<NodeId>>,
    postorder: Vec<NodeId>,
}

impl Frame {
    fn capture<S: ChildSlots>(forest: &Forest<S>, root: NodeId) -> Self {
        let postorder: Vec<NodeId> = forest.postorder(root).collect();
        let mut children = HashMap::with_capacity(postorder.len());
        let mut left_sibling = HashMap::new();
        for &id in &postorder {
            let kids = forest.children(id);
            for pair in kids.windows(2) {
                left_sibling.insert(pair[1], pair[0]);
            }
            children.insert(id, kids);
        }
        Self {
            root,
            children,
            left_sibling,
            levels: forest.levelorder_groups(root).collect(),
            postorder,
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Lay out the subtree rooted at `root` and write `x`, `y`, `mod` and `shift`
/// attributes on each of its nodes.
///
/// Same-depth nodes share `y`; deeper nodes get smaller `y`, with the deepest level
/// at `y_offset`. Returns the bounds of the final coordinates.
///
/// The forest is trusted to be well formed; the only error is an unknown `root`.
#[instrument(level = "debug", skip(forest))]
pub fn reingold_tilford<S: ChildSlots>(
    forest: &mut Forest<S>,
    root: NodeId,
    params: &LayoutParams,
) -> TreeResult<Bounds> {
    forest.check(root)?;
    let frame = Frame::capture(forest, root);
    let mut placements = Placements::with_capacity(frame.postorder.len());

    first_pass(&frame, params, &mut placements);
    second_pass(&frame, params, &mut placements);
    let coordinates = third_pass(&frame, params, &placements);

    let mut bounds = Bounds::empty();
    for (&id, &(x, y)) in &coordinates {
        bounds.include(x, y);
        let placement = placements.get(&id).copied().unwrap_or_default();
        forest.set_attrs(
            id,
            [
                (ATTR_X, x),
                (ATTR_Y, y),
                (ATTR_MOD, placement.modifier),
                (ATTR_SHIFT, placement.shift),
            ],
        )?;
    }
    debug!(
        nodes = coordinates.len(),
        levels = frame.levels.len(),
        width = bounds.width(),
        "layout complete"
    );
    Ok(bounds)
}

fn x_of(placements: &Placements, id: NodeId) -> f64 {
    placements.get(&id).map_or(0.0, |p| p.x)
}

fn mod_of(placements: &Placements, id: NodeId) -> f64 {
    placements.get(&id).map_or(0.0, |p| p.modifier)
}

/// Midpoint between the first and last child, 0 for leaves.
fn midpoint(placements: &Placements, kids: &[NodeId]) -> f64 {
    match (kids.first(), kids.last()) {
        (Some(&first), Some(&last)) => (x_of(placements, first) + x_of(placements, last)) / 2.0,
        _ => 0.0,
    }
}

fn first_pass(frame: &Frame, params: &LayoutParams, placements: &mut Placements) {
    for &id in &frame.postorder {
        let kids = frame.children(id);
        let center = midpoint(placements, kids);
        let mut placement = Placement::default();
        match frame.left_sibling.get(&id) {
            Some(&left) => {
                placement.x = x_of(placements, left) + params.sibling_separation;
                if !kids.is_empty() {
                    placement.modifier = placement.x - center;
                }
            }
            None => placement.x = center,
        }
        placements.insert(id, placement);
    }
}

fn second_pass(frame: &Frame, params: &LayoutParams, placements: &mut Placements) {
    for level in frame.levels.iter().rev() {
        resolve_level(frame, params, placements, level);
    }
}

/// Separate the children of every node on `level`, then re-centre each parent.
/// A subtree must be resolved before its own parent's level is.
fn resolve_level(
    frame: &Frame,
    params: &LayoutParams,
    placements: &mut Placements,
    level: &[NodeId],
) {
    for &parent in level {
        let kids = frame.children(parent);
        if kids.is_empty() {
            continue;
        }
        separate_siblings(frame, params, placements, kids);
        let center = midpoint(placements, kids);
        if let Some(placement) = placements.get_mut(&parent) {
            placement.modifier = placement.x - center;
        }
    }
}

/// Push each sibling right until it clears every sibling to its left.
fn separate_siblings(
    frame: &Frame,
    params: &LayoutParams,
    placements: &mut Placements,
    kids: &[NodeId],
) {
    for right in 1..kids.len() {
        for left in 0..right {
            let shift = subtree_shift(frame, params, placements, kids[left], kids[right]);
            if shift <= 0.0 {
                continue;
            }
            trace!(left = %kids[left], right = %kids[right], shift, "separating subtrees");
            let span = (right - left) as f64;
            for (offset, &sibling) in kids.iter().enumerate().skip(left + 1) {
                let delta = shift * (offset - left) as f64 / span;
                if let Some(placement) = placements.get_mut(&sibling) {
                    placement.x += delta;
                    placement.modifier += delta;
                    placement.shift += delta;
                }
            }
        }
    }
}

/// Distance the right subtree must move so every shared level keeps its separation.
/// Clamped to zero when the subtrees already clear each other.
fn subtree_shift(
    frame: &Frame,
    params: &LayoutParams,
    placements: &Placements,
    left: NodeId,
    right: NodeId,
) -> f64 {
    let right_edge = contour(frame, placements, left, Side::Right);
    let left_edge = contour(frame, placements, right, Side::Left);
    right_edge
        .iter()
        .zip(&left_edge)
        .enumerate()
        .map(|(level, (l, r))| {
            let gap = if level == 0 {
                params.sibling_separation
            } else {
                params.subtree_separation
            };
            l + gap - r
        })
        .fold(0.0, f64::max)
}

/// Extreme x per level of a subtree, relative to the subtree root's frame.
///
/// Every node of a level is visited, so childless nodes are stepped over and the
/// walk continues in the same direction across cousins.
fn contour(frame: &Frame, placements: &Placements, root: NodeId, side: Side) -> Vec<f64> {
    let mut edge = Vec::new();
    let mut frontier = vec![(root, 0.0)];
    while !frontier.is_empty() {
        let positions = frontier
            .iter()
            .map(|&(id, offset)| x_of(placements, id) + offset);
        edge.push(match side {
            Side::Left => positions.fold(f64::INFINITY, f64::min),
            Side::Right => positions.fold(f64::NEG_INFINITY, f64::max),
        });
        frontier = frontier
            .iter()
            .flat_map(|&(id, offset)| {
                let below = offset + mod_of(placements, id);
                frame.children(id).iter().map(move |&child| (child, below))
            })
            .collect();
    }
    edge
}

fn third_pass(
    frame: &Frame,
    params: &LayoutParams,
    placements: &Placements,
) -> HashMap<NodeId, (f64, f64)> {
    let max_depth = frame.levels.len();
    let mut coordinates = HashMap::with_capacity(frame.postorder.len());
    let mut stack = vec![(frame.root, 0.0, 1usize)];
    while let Some((id, ancestor_mods, depth)) = stack.pop() {
        let x = x_of(placements, id) + ancestor_mods + params.x_offset;
        let y = (max_depth - depth) as f64 * params.level_separation + params.y_offset;
        coordinates.insert(id, (x, y));
        let below = ancestor_mods + mod_of(placements, id);
        for &child in frame.children(id).iter().rev() {
            stack.push((child, below, depth + 1));
        }
    }

    // The root has no sibling to anchor it; it sits over its children.
    let kids = frame.children(frame.root);
    if let (Some(first), Some(last)) = (kids.first(), kids.last()) {
        let first_x = coordinates.get(first).map_or(0.0, |c| c.0);
        let last_x = coordinates.get(last).map_or(0.0, |c| c.0);
        if let Some(root) = coordinates.get_mut(&frame.root) {
            root.0 = (first_x + last_x) / 2.0;
        }
    }
    coordinates
}
