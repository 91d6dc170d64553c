//! Read-only queries derived from parent/children links.
//!
//! Nothing here is cached: depth, root, siblings and paths are recomputed from the
//! links on every call, so they are always consistent with the last mutation.

use itertools::Itertools;
use tracing::instrument;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::slots::ChildSlots;

/// Walks the parent chain upwards, excluding the start node.
pub struct Ancestors<'a, S: ChildSlots> {
    forest: &'a Forest<S>,
    next: Option<NodeId>,
}

impl<'a, S: ChildSlots> Iterator for Ancestors<'a, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.forest.parent(current);
        Some(current)
    }
}

impl<S: ChildSlots> Forest<S> {
    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.is_root())
    }

    /// No occupied children. For binary nodes both slots are empty.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.is_leaf())
    }

    /// 1 at the root; 0 for ids not in this forest.
    pub fn depth(&self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        1 + self.ancestors(id).count()
    }

    pub fn root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Lazy, restartable walk from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, S> {
        Ancestors {
            forest: self,
            next: self.parent(id),
        }
    }

    /// Pre-order descendants, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder(id).skip(1)
    }

    /// Leaf nodes of the subtree, including `id` when it is itself a leaf.
    pub fn leaves(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder(id).filter(move |&n| self.is_leaf(n))
    }

    /// Other children of the parent, in order. Roots have no siblings.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .into_iter()
                .filter(|&c| c != id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn left_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&c| c == id)?;
        position.checked_sub(1).map(|p| siblings[p])
    }

    pub fn right_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&c| c == id)?;
        siblings.get(position + 1).copied()
    }

    /// Nodes from the root down to `id`, inclusive.
    pub fn node_path(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut path: Vec<NodeId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        path.reverse();
        path
    }

    /// Names along [`node_path`](Self::node_path), each prefixed by `sep`.
    pub fn path_name(&self, id: NodeId, sep: &str) -> String {
        self.node_path(id)
            .into_iter()
            .filter_map(|n| self.name(n))
            .map(|name| format!("{}{}", sep, name))
            .collect()
    }

    /// Greatest depth of any node in the tree containing `id`.
    #[instrument(level = "trace", skip(self))]
    pub fn max_depth(&self, id: NodeId) -> usize {
        let root = self.root(id);
        let base = self.depth(root);
        self.levelorder_groups(root)
            .count()
            .checked_sub(1)
            .map_or(0, |extra| base + extra)
    }

    /// First node of the subtree, in pre-order, accepted by `predicate`.
    pub fn find<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(NodeId) -> bool,
    {
        self.preorder(id).find(|&n| predicate(n))
    }

    pub fn find_all<P>(&self, id: NodeId, mut predicate: P) -> Vec<NodeId>
    where
        P: FnMut(NodeId) -> bool,
    {
        self.preorder(id).filter(|&n| predicate(n)).collect()
    }

    /// Ancestors shared by every node in `nodes`, nearest first. Each node counts
    /// as its own ancestor.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotSameTree`] when the nodes live in different trees.
    #[instrument(level = "debug", skip(self))]
    pub fn common_ancestors(&self, nodes: &[NodeId]) -> TreeResult<Vec<NodeId>> {
        for &node in nodes {
            self.check(node)?;
        }
        let Some((&first, rest)) = nodes.split_first() else {
            return Ok(Vec::new());
        };
        let root = self.root(first);
        if let Some(&stranger) = rest.iter().find(|&&n| self.root(n) != root) {
            return Err(TreeError::NotSameTree(format!(
                "{} and {} have different roots",
                self.label(first),
                self.label(stranger)
            )));
        }

        let chains: Vec<Vec<NodeId>> = rest.iter().map(|&n| self.lineage(n)).collect();
        Ok(self
            .lineage(first)
            .into_iter()
            .filter(|candidate| chains.iter().all(|chain| chain.contains(candidate)))
            .collect())
    }

    /// Deepest node that is an ancestor of (or equal to) both `a` and `b`.
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> TreeResult<NodeId> {
        self.common_ancestors(&[a, b])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                TreeError::NotSameTree(format!("{} and {}", self.label(a), self.label(b)))
            })
    }

    /// Path from `from` to `to` through their lowest common ancestor, which appears
    /// once. Consecutive nodes are parent/child pairs.
    #[instrument(level = "debug", skip(self))]
    pub fn get_path(&self, from: NodeId, to: NodeId) -> TreeResult<Vec<NodeId>> {
        let common = self.lowest_common_ancestor(from, to)?;
        let up = self
            .lineage(from)
            .into_iter()
            .take_while(|&n| n != common)
            .chain(std::iter::once(common));
        let down = self
            .lineage(to)
            .into_iter()
            .take_while(|&n| n != common)
            .collect_vec();
        Ok(up.chain(down.into_iter().rev()).collect())
    }

    /// `id` followed by its ancestors, root last.
    fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        std::iter::once(id).chain(self.ancestors(id)).collect()
    }
}
