//! Children storage strategies.
//!
//! A forest is generic over how a node stores its children. N-ary trees keep an
//! ordered growable list; binary trees keep two positional slots where either may
//! be empty. The linkage engine only talks to storage through [`ChildSlots`].

use std::fmt;

use crate::domain::arena::NodeId;

/// Children storage of one node.
///
/// Positions returned by [`take`](ChildSlots::take) are exactly what
/// [`restore`](ChildSlots::restore) needs to put a child back where it was.
pub trait ChildSlots: Default + Clone + fmt::Debug + 'static {
    /// Human readable name of the node kind, used in error messages.
    const KIND: &'static str;

    /// Occupied children in order.
    fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_;

    /// Number of occupied children.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when one more child can be attached.
    fn has_vacancy(&self) -> bool;

    fn position(&self, child: NodeId) -> Option<usize>;

    /// Attach at the end (N-ary) or into the first empty slot (binary).
    /// Returns the position, or `None` when there is no room.
    fn attach(&mut self, child: NodeId) -> Option<usize>;

    /// Remove a child, returning the position it occupied.
    fn take(&mut self, child: NodeId) -> Option<usize>;

    /// Put a child back at a position previously returned by `take`.
    fn restore(&mut self, position: usize, child: NodeId);

    fn first(&self) -> Option<NodeId> {
        self.ids().next()
    }

    fn last(&self) -> Option<NodeId> {
        self.ids().next_back()
    }
}

/// Ordered, growable children list of an N-ary node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(Vec<NodeId>);

impl Children {
    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }
}

impl From<Vec<NodeId>> for Children {
    fn from(ids: Vec<NodeId>) -> Self {
        Children(ids)
    }
}

impl ChildSlots for Children {
    const KIND: &'static str = "node";

    fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn has_vacancy(&self) -> bool {
        true
    }

    fn position(&self, child: NodeId) -> Option<usize> {
        self.0.iter().position(|&c| c == child)
    }

    fn attach(&mut self, child: NodeId) -> Option<usize> {
        self.0.push(child);
        Some(self.0.len() - 1)
    }

    fn take(&mut self, child: NodeId) -> Option<usize> {
        let position = self.position(child)?;
        self.0.remove(position);
        Some(position)
    }

    fn restore(&mut self, position: usize, child: NodeId) {
        let position = position.min(self.0.len());
        self.0.insert(position, child);
    }
}

/// Two positional slots of a binary node: `[left, right]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryChildren([Option<NodeId>; 2]);

impl BinaryChildren {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;

    pub fn new(left: Option<NodeId>, right: Option<NodeId>) -> Self {
        BinaryChildren([left, right])
    }

    pub fn slots(&self) -> [Option<NodeId>; 2] {
        self.0
    }

    pub fn left(&self) -> Option<NodeId> {
        self.0[Self::LEFT]
    }

    pub fn right(&self) -> Option<NodeId> {
        self.0[Self::RIGHT]
    }
}

impl ChildSlots for BinaryChildren {
    const KIND: &'static str = "binary node";

    fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.0.iter().flatten().copied()
    }

    fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    fn has_vacancy(&self) -> bool {
        self.0.iter().any(Option::is_none)
    }

    fn position(&self, child: NodeId) -> Option<usize> {
        self.0.iter().position(|&c| c == Some(child))
    }

    fn attach(&mut self, child: NodeId) -> Option<usize> {
        let position = self.0.iter().position(Option::is_none)?;
        self.0[position] = Some(child);
        Some(position)
    }

    fn take(&mut self, child: NodeId) -> Option<usize> {
        let position = self.position(child)?;
        self.0[position] = None;
        Some(position)
    }

    fn restore(&mut self, position: usize, child: NodeId) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = Some(child);
        }
    }
}
