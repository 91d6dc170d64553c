//! Lazy traversal iterators over a subtree.
//!
//! All iterators use explicit stacks/queues, so very deep trees do not exhaust the
//! call stack. Each can be limited by absolute depth (`max_depth`, root = 1) and by
//! a pruning predicate; a pruned node is skipped together with its subtree.

use std::collections::VecDeque;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::slots::ChildSlots;

type Prune<'a> = Box<dyn Fn(NodeId) -> bool + 'a>;

#[derive(Default)]
struct Limits<'a> {
    max_depth: Option<usize>,
    prune: Option<Prune<'a>>,
}

impl Limits<'_> {
    fn admits(&self, id: NodeId, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
            && !self.prune.as_ref().is_some_and(|prune| prune(id))
    }
}

macro_rules! impl_limits {
    ($($iter:ident),+) => {
        $(
            impl<'a, S: ChildSlots> $iter<'a, S> {
                /// Stop descending below this absolute depth.
                pub fn max_depth(mut self, depth: usize) -> Self {
                    self.limits.max_depth = Some(depth);
                    self
                }

                /// Skip nodes (and their subtrees) for which `prune` returns true.
                pub fn prune(mut self, prune: impl Fn(NodeId) -> bool + 'a) -> Self {
                    self.limits.prune = Some(Box::new(prune));
                    self
                }
            }
        )+
    };
}

/// Node, then children left to right (NLR).
pub struct PreOrder<'a, S: ChildSlots> {
    forest: &'a Forest<S>,
    stack: Vec<(NodeId, usize)>,
    limits: Limits<'a>,
}

impl<'a, S: ChildSlots> Iterator for PreOrder<'a, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if !self.limits.admits(id, depth) {
                continue;
            }
            // Push children in reverse order for left-to-right traversal
            for child in self.forest.children(id).into_iter().rev() {
                self.stack.push((child, depth + 1));
            }
            return Some(id);
        }
        None
    }
}

/// Children left to right, then node (LRN).
pub struct PostOrder<'a, S: ChildSlots> {
    forest: &'a Forest<S>,
    stack: Vec<(NodeId, usize, bool)>,
    limits: Limits<'a>,
}

impl<'a, S: ChildSlots> Iterator for PostOrder<'a, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth, visited)) = self.stack.pop() {
            if visited {
                return Some(id);
            }
            if !self.limits.admits(id, depth) {
                continue;
            }
            self.stack.push((id, depth, true));
            for child in self.forest.children(id).into_iter().rev() {
                self.stack.push((child, depth + 1, false));
            }
        }
        None
    }
}

/// Breadth first, left to right within each level.
pub struct LevelOrder<'a, S: ChildSlots> {
    forest: &'a Forest<S>,
    queue: VecDeque<(NodeId, usize)>,
    limits: Limits<'a>,
}

impl<'a, S: ChildSlots> Iterator for LevelOrder<'a, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.queue.pop_front() {
            if !self.limits.admits(id, depth) {
                continue;
            }
            for child in self.forest.children(id) {
                self.queue.push_back((child, depth + 1));
            }
            return Some(id);
        }
        None
    }
}

/// One `Vec` per level, top down.
pub struct LevelOrderGroups<'a, S: ChildSlots> {
    forest: &'a Forest<S>,
    frontier: Vec<NodeId>,
    depth: usize,
    started: bool,
    limits: Limits<'a>,
}

impl<'a, S: ChildSlots> Iterator for LevelOrderGroups<'a, S> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            let depth = self.depth;
            let limits = &self.limits;
            self.frontier.retain(|&id| limits.admits(id, depth));
        }
        if self.frontier.is_empty() {
            return None;
        }
        let level = std::mem::take(&mut self.frontier);
        self.depth += 1;
        let depth = self.depth;
        self.frontier = level
            .iter()
            .flat_map(|&id| self.forest.children(id))
            .filter(|&child| self.limits.admits(child, depth))
            .collect();
        Some(level)
    }
}

/// Level groups with every second level reversed, starting left to right.
pub struct ZigZagGroups<'a, S: ChildSlots> {
    groups: LevelOrderGroups<'a, S>,
    reverse: bool,
}

impl<'a, S: ChildSlots> ZigZagGroups<'a, S> {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.groups = self.groups.max_depth(depth);
        self
    }

    pub fn prune(mut self, prune: impl Fn(NodeId) -> bool + 'a) -> Self {
        self.groups = self.groups.prune(prune);
        self
    }
}

impl<'a, S: ChildSlots> Iterator for ZigZagGroups<'a, S> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut level = self.groups.next()?;
        if self.reverse {
            level.reverse();
        }
        self.reverse = !self.reverse;
        Some(level)
    }
}

impl_limits!(PreOrder, PostOrder, LevelOrder, LevelOrderGroups);

impl<S: ChildSlots> Forest<S> {
    fn start(&self, id: NodeId) -> Option<(NodeId, usize)> {
        self.contains(id).then(|| (id, self.depth(id)))
    }

    pub fn preorder(&self, id: NodeId) -> PreOrder<'_, S> {
        PreOrder {
            forest: self,
            stack: self.start(id).into_iter().collect(),
            limits: Limits::default(),
        }
    }

    pub fn postorder(&self, id: NodeId) -> PostOrder<'_, S> {
        PostOrder {
            forest: self,
            stack: self
                .start(id)
                .map(|(id, depth)| (id, depth, false))
                .into_iter()
                .collect(),
            limits: Limits::default(),
        }
    }

    pub fn levelorder(&self, id: NodeId) -> LevelOrder<'_, S> {
        LevelOrder {
            forest: self,
            queue: self.start(id).into_iter().collect(),
            limits: Limits::default(),
        }
    }

    pub fn levelorder_groups(&self, id: NodeId) -> LevelOrderGroups<'_, S> {
        let (frontier, depth) = match self.start(id) {
            Some((id, depth)) => (vec![id], depth),
            None => (Vec::new(), 0),
        };
        LevelOrderGroups {
            forest: self,
            frontier,
            depth,
            started: false,
            limits: Limits::default(),
        }
    }

    pub fn zigzag_groups(&self, id: NodeId) -> ZigZagGroups<'_, S> {
        ZigZagGroups {
            groups: self.levelorder_groups(id),
            reverse: false,
        }
    }

    /// Flattened [`zigzag_groups`](Self::zigzag_groups).
    pub fn zigzag(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.zigzag_groups(id).flatten()
    }
}
