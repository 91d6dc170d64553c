//! Binary-tree specific linkage: positional `left`/`right` slots.

use std::fmt::Display;

use tracing::instrument;

use crate::domain::arena::{BinaryTree, NodeId};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::slots::BinaryChildren;

impl BinaryTree {
    /// Both slots, `[left, right]`; `[None, None]` for unknown ids.
    pub fn slots(&self, id: NodeId) -> [Option<NodeId>; 2] {
        self.node(id)
            .map(|node| node.children().slots())
            .unwrap_or_default()
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.slots(id)[BinaryChildren::LEFT]
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.slots(id)[BinaryChildren::RIGHT]
    }

    /// Assign both slots at once. `children` must hold exactly two slots, or be
    /// empty to clear both.
    ///
    /// # Errors
    ///
    /// [`TreeError::Arity`] for any other length, plus the errors of the N-ary
    /// `set_children`.
    pub fn set_children(&mut self, node: NodeId, children: &[Option<NodeId>]) -> TreeResult<()> {
        let slots = match children {
            [] => BinaryChildren::default(),
            [left, right] => BinaryChildren::new(*left, *right),
            _ => {
                return Err(TreeError::Arity(format!(
                    "{} takes 0 or 2 children, got {}",
                    self.label(node),
                    children.len()
                )))
            }
        };
        self.assign_children(node, slots)
    }

    /// Replace the left slot, keeping the right one.
    pub fn set_left(&mut self, node: NodeId, left: Option<NodeId>) -> TreeResult<()> {
        self.check(node)?;
        let right = self.right(node);
        self.assign_children(node, BinaryChildren::new(left, right))
    }

    /// Replace the right slot, keeping the left one.
    pub fn set_right(&mut self, node: NodeId, right: Option<NodeId>) -> TreeResult<()> {
        self.check(node)?;
        let left = self.left(node);
        self.assign_children(node, BinaryChildren::new(left, right))
    }

    /// Build a complete binary tree from a heap-ordered list: the children of
    /// element `i` are elements `2i + 1` and `2i + 2`. Returns the root, or `None`
    /// for an empty list.
    #[instrument(level = "debug", skip(self, values))]
    pub fn from_heap_list<T: Display>(&mut self, values: &[T]) -> TreeResult<Option<NodeId>> {
        let ids: Vec<NodeId> = values
            .iter()
            .map(|value| self.insert(value.to_string()))
            .collect();
        for (i, &id) in ids.iter().enumerate() {
            let left = ids.get(2 * i + 1).copied();
            let right = ids.get(2 * i + 2).copied();
            if left.is_some() || right.is_some() {
                self.set_children(id, &[left, right])?;
            }
        }
        Ok(ids.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_heap_list_when_building_then_children_follow_heap_indices() {
        let mut tree = BinaryTree::new();
        let root = tree.from_heap_list(&[1, 2, 3, 4, 5]).unwrap().unwrap();
        let two = tree.left(root).unwrap();
        assert_eq!(tree.name(two), Some("2"));
        assert_eq!(tree.name(tree.right(two).unwrap()), Some("5"));
        let three = tree.right(root).unwrap();
        assert!(tree.is_leaf(three));
    }

    #[test]
    fn given_empty_heap_list_when_building_then_no_root() {
        let mut tree = BinaryTree::new();
        assert_eq!(tree.from_heap_list::<i32>(&[]).unwrap(), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn given_three_slots_when_set_children_then_arity_error() {
        let mut tree = BinaryTree::new();
        let [a, b, c, d] = ["a", "b", "c", "d"].map(|n| tree.insert(n));
        let result = tree.set_children(a, &[Some(b), Some(c), Some(d)]);
        assert!(matches!(result, Err(TreeError::Arity(_))));
        assert!(tree.is_leaf(a));
    }
}
