use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::attrs::{AttrValue, Attrs};
use crate::domain::error::{HookError, TreeError, TreeResult};
use crate::domain::hooks::{HookResult, LinkHooks};
use crate::domain::slots::{BinaryChildren, ChildSlots, Children};

static NEXT_FOREST_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a node inside a [`Forest`].
///
/// Carries the id of the forest that minted it, so handles from another forest
/// (or from a forest of the other node kind) are rejected instead of aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    forest: u64,
    index: Index,
}

impl NodeId {
    /// Arena slot of the node, stable for the node's lifetime.
    pub fn slot(&self) -> usize {
        self.index.into_raw_parts().0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.slot())
    }
}

/// Tree node stored in the arena.
#[derive(Debug, Clone)]
pub struct Node<S> {
    /// Label of the node, not required to be unique
    name: String,
    /// Open-ended user attributes
    attrs: Attrs,
    /// Non-owning back reference, None for root nodes
    parent: Option<NodeId>,
    /// Exclusively owned children
    children: S,
}

impl<S: ChildSlots> Node<S> {
    fn new(name: String, attrs: Attrs) -> Self {
        Self {
            name,
            attrs,
            parent: None,
            children: S::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Missing attributes yield `None`.
    pub fn get_attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &S {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One primitive linkage change, recorded so it can be reverted.
#[derive(Debug)]
enum Undo<S> {
    Parent { node: NodeId, previous: Option<NodeId> },
    Children { node: NodeId, previous: S },
    Unlinked { parent: NodeId, child: NodeId, position: usize },
    Linked { parent: NodeId, child: NodeId },
}

#[derive(Debug)]
struct Journal<S>(Vec<Undo<S>>);

impl<S> Journal<S> {
    fn new() -> Self {
        Journal(Vec::new())
    }

    fn push(&mut self, undo: Undo<S>) {
        self.0.push(undo);
    }
}

/// Arena-backed collection of trees sharing one node kind.
///
/// Every node lives in the arena; a node without parent is the root of its own tree.
/// Parent and children links are only changed through [`Forest::set_parent`] and the
/// `set_children` family, which keep both directions consistent and are all-or-nothing.
pub struct Forest<S: ChildSlots> {
    /// Tag copied into every `NodeId` minted here
    id: u64,
    /// Arena storage for all nodes
    arena: Arena<Node<S>>,
    /// Optional user validation around linkage changes
    hooks: Option<Box<dyn LinkHooks<S>>>,
    /// Walk ancestor chains to reject loops
    strict: bool,
}

/// Forest of N-ary nodes.
pub type Tree = Forest<Children>;

/// Forest of binary nodes.
pub type BinaryTree = Forest<BinaryChildren>;

impl<S: ChildSlots> fmt::Debug for Forest<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest")
            .field("kind", &S::KIND)
            .field("nodes", &self.arena.len())
            .field("strict", &self.strict)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

impl<S: ChildSlots> Default for Forest<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ChildSlots> Forest<S> {
    pub fn new() -> Self {
        Self {
            id: NEXT_FOREST_ID.fetch_add(1, AtomicOrdering::Relaxed),
            arena: Arena::new(),
            hooks: None,
            strict: true,
        }
    }

    pub fn with_hooks(mut self, hooks: impl LinkHooks<S> + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Non-strict forests skip the ancestor walk of the loop check. The caller then
    /// guarantees that no assignment creates a cycle.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn set_hooks(&mut self, hooks: Option<Box<dyn LinkHooks<S>>>) {
        self.hooks = hooks;
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self, name))]
    pub fn insert(&mut self, name: impl Into<String>) -> NodeId {
        self.insert_with_attrs(name, Attrs::new())
    }

    #[instrument(level = "trace", skip(self, name, attrs))]
    pub fn insert_with_attrs(&mut self, name: impl Into<String>, attrs: Attrs) -> NodeId {
        let index = self.arena.insert(Node::new(name.into(), attrs));
        NodeId {
            forest: self.id,
            index,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.forest == self.id && self.arena.contains(id.index)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<S>> {
        if id.forest != self.id {
            return None;
        }
        self.arena.get(id.index)
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<S>)> + '_ {
        let forest = self.id;
        self.arena
            .iter()
            .map(move |(index, node)| (NodeId { forest, index }, node))
    }

    /// Nodes without parent, in arena order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Occupied children in order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children.ids().collect())
            .unwrap_or_default()
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<()> {
        self.entry_mut(id)?.name = name.into();
        Ok(())
    }

    /// Attribute lookup; absent nodes and attributes both yield `None`.
    pub fn get_attr(&self, id: NodeId, key: &str) -> Option<&AttrValue> {
        self.node(id).and_then(|node| node.get_attr(key))
    }

    /// Merge attributes into a node, overwriting existing keys. Linkage is untouched.
    pub fn set_attrs<K, V>(
        &mut self,
        id: NodeId,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> TreeResult<()>
    where
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let node = self.entry_mut(id)?;
        for (key, value) in attrs {
            node.attrs.insert(key.into(), value.into());
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Option<AttrValue> {
        self.entry_mut(id).ok()?.attrs.remove(key)
    }

    /// Reassign the parent of `node`, detaching it from its current parent.
    ///
    /// `None` detaches the node, which then roots its own tree. Assigning the parent
    /// it already has moves the node to the end of the list, or into the first
    /// empty slot of a binary parent. The call is atomic:
    /// on any error the node is back under its original parent at its original
    /// position.
    ///
    /// # Errors
    ///
    /// * [`TreeError::Loop`] when `new_parent` is `node` or one of its descendants
    /// * [`TreeError::Type`] / [`TreeError::NodeNotFound`] for foreign or stale ids
    /// * [`TreeError::Arity`] when a binary parent has both slots occupied
    /// * [`TreeError::Hook`] when a hook rejects the change
    #[instrument(level = "debug", skip(self))]
    pub fn set_parent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> TreeResult<()> {
        self.check(node)?;
        if let Some(parent) = new_parent {
            self.check(parent)?;
            if parent == node {
                return Err(TreeError::Loop(format!(
                    "{} cannot be its own parent",
                    self.label(node)
                )));
            }
            if self.strict && self.is_ancestor_of(node, parent)? {
                return Err(TreeError::Loop(format!(
                    "{} is an ancestor of {}, it cannot become its child",
                    self.label(node),
                    self.label(parent)
                )));
            }
        }

        if let Some(parent) = new_parent {
            let already_child = self.entry(node)?.parent == Some(parent);
            if !already_child && !self.entry(parent)?.children.has_vacancy() {
                return Err(self.full_error(parent, node));
            }
        }

        self.run_hook(|hooks, forest| hooks.pre_assign_parent(forest, node, new_parent))
            .map_err(|source| self.hook_error("pre-assign parent", node, source))?;

        let mut journal = Journal::new();
        if let Err(e) = self.relink_parent(node, new_parent, &mut journal) {
            self.rollback(journal);
            return Err(e);
        }

        if let Err(source) =
            self.run_hook(|hooks, forest| hooks.post_assign_parent(forest, node, new_parent))
        {
            warn!(%node, error = %source, "post-assign parent hook failed");
            self.rollback(journal);
            return Err(self.hook_error("post-assign parent", node, source));
        }
        Ok(())
    }

    /// Make `node` a root.
    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        self.set_parent(node, None)
    }

    /// Attach `child` under `parent` (end of list, or first free binary slot).
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.set_parent(child, Some(parent))
    }

    /// Detach every child of `node`; each becomes the root of its own tree.
    pub fn clear_children(&mut self, node: NodeId) -> TreeResult<()> {
        self.assign_children(node, S::default())
    }

    /// Destroy `node` and its descendants, returning how many nodes were removed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, node: NodeId) -> TreeResult<usize> {
        self.detach(node)?;
        let doomed: Vec<NodeId> = self.postorder(node).collect();
        for id in &doomed {
            self.arena.remove(id.index);
        }
        debug!(%node, removed = doomed.len(), "subtree removed");
        Ok(doomed.len())
    }

    /// Replace the children of `node` in one atomic step.
    ///
    /// Old children not in `new_children` become roots; candidates attached
    /// elsewhere are moved. On failure every candidate is back at its original
    /// parent and position and `node` has its original children.
    #[instrument(level = "debug", skip(self, new_children))]
    pub(crate) fn assign_children(&mut self, node: NodeId, new_children: S) -> TreeResult<()> {
        self.check(node)?;
        let candidates: Vec<NodeId> = new_children.ids().collect();
        let mut seen = HashSet::with_capacity(candidates.len());
        for &child in &candidates {
            self.check(child)?;
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild(format!(
                    "{} appears more than once in the children of {}",
                    self.label(child),
                    self.label(node)
                )));
            }
            if child == node {
                return Err(TreeError::Loop(format!(
                    "{} cannot be its own child",
                    self.label(node)
                )));
            }
            if self.strict && self.is_ancestor_of(child, node)? {
                return Err(TreeError::Loop(format!(
                    "{} is an ancestor of {}, it cannot become its child",
                    self.label(child),
                    self.label(node)
                )));
            }
        }

        self.run_hook(|hooks, forest| hooks.pre_assign_children(forest, node, &candidates))
            .map_err(|source| self.hook_error("pre-assign children", node, source))?;

        let mut journal = Journal::new();
        if let Err(e) = self.install_children(node, new_children, &candidates, &mut journal) {
            self.rollback(journal);
            return Err(e);
        }

        if let Err(source) =
            self.run_hook(|hooks, forest| hooks.post_assign_children(forest, node, &candidates))
        {
            warn!(%node, error = %source, "post-assign children hook failed");
            self.rollback(journal);
            return Err(self.hook_error("post-assign children", node, source));
        }
        Ok(())
    }

    /// Insert a node and link it through the regular protocol, parent first.
    /// Nothing is left behind when linking fails.
    pub(crate) fn insert_linked(
        &mut self,
        name: String,
        attrs: Attrs,
        parent: Option<NodeId>,
        children: Option<S>,
    ) -> TreeResult<NodeId> {
        let id = self.insert_with_attrs(name, attrs);
        let linked = match parent {
            Some(parent) => self.set_parent(id, Some(parent)),
            None => Ok(()),
        }
        .and_then(|_| match children {
            Some(children) => self.assign_children(id, children),
            None => Ok(()),
        });

        if let Err(e) = linked {
            debug!(%id, error = %e, "construction failed, discarding node");
            let mut journal = Journal::new();
            if let Err(unlink_err) = self.unlink(id, &mut journal) {
                warn!(%id, error = %unlink_err, "could not unlink discarded node");
            }
            self.arena.remove(id.index);
            return Err(e);
        }
        Ok(id)
    }

    /// True when `candidate` lies on the parent chain above `node`.
    pub(crate) fn is_ancestor_of(&self, candidate: NodeId, node: NodeId) -> TreeResult<bool> {
        let mut current = self.entry(node)?.parent;
        let mut steps = 0;
        while let Some(id) = current {
            if id == candidate {
                return Ok(true);
            }
            steps += 1;
            if steps > self.arena.len() {
                return Err(TreeError::Corrupted(format!(
                    "parent chain above {} does not terminate",
                    self.label(node)
                )));
            }
            current = self.entry(id)?.parent;
        }
        Ok(false)
    }

    pub(crate) fn check(&self, id: NodeId) -> TreeResult<()> {
        if id.forest != self.id {
            return Err(TreeError::Type {
                node: id,
                expected: S::KIND,
            });
        }
        if !self.arena.contains(id.index) {
            return Err(TreeError::NodeNotFound(id));
        }
        Ok(())
    }

    pub(crate) fn entry(&self, id: NodeId) -> TreeResult<&Node<S>> {
        self.check(id)?;
        self.arena.get(id.index).ok_or(TreeError::NodeNotFound(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> TreeResult<&mut Node<S>> {
        self.check(id)?;
        self.arena
            .get_mut(id.index)
            .ok_or(TreeError::NodeNotFound(id))
    }

    pub(crate) fn label(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) => format!("'{}' ({})", node.name, id),
            None => id.to_string(),
        }
    }

    fn full_error(&self, parent: NodeId, child: NodeId) -> TreeError {
        TreeError::Arity(format!(
            "{} already has 2 children, cannot attach {}",
            self.label(parent),
            self.label(child)
        ))
    }

    fn hook_error(&self, stage: &str, node: NodeId, source: HookError) -> TreeError {
        TreeError::Hook {
            context: format!("{} of {}", stage, self.label(node)),
            source,
        }
    }

    fn run_hook(&self, call: impl FnOnce(&dyn LinkHooks<S>, &Self) -> HookResult) -> HookResult {
        match &self.hooks {
            Some(hooks) => call(hooks.as_ref(), self),
            None => Ok(()),
        }
    }

    fn relink_parent(
        &mut self,
        node: NodeId,
        new_parent: Option<NodeId>,
        journal: &mut Journal<S>,
    ) -> TreeResult<()> {
        self.unlink(node, journal)?;
        if let Some(parent) = new_parent {
            self.link(parent, node, journal)?;
        }
        Ok(())
    }

    fn install_children(
        &mut self,
        node: NodeId,
        new_children: S,
        candidates: &[NodeId],
        journal: &mut Journal<S>,
    ) -> TreeResult<()> {
        let old = std::mem::take(&mut self.entry_mut(node)?.children);
        let old_ids: Vec<NodeId> = old.ids().collect();
        journal.push(Undo::Children {
            node,
            previous: old,
        });
        for child in old_ids {
            self.set_parent_ref(child, None, journal)?;
        }

        for &child in candidates {
            self.unlink(child, journal)?;
        }

        let previous = std::mem::replace(&mut self.entry_mut(node)?.children, new_children);
        journal.push(Undo::Children { node, previous });
        for &child in candidates {
            self.set_parent_ref(child, Some(node), journal)?;
        }
        Ok(())
    }

    /// Remove `child` from its parent's children and clear its parent reference.
    fn unlink(&mut self, child: NodeId, journal: &mut Journal<S>) -> TreeResult<()> {
        let Some(parent) = self.entry(child)?.parent else {
            return Ok(());
        };
        let taken = self.entry_mut(parent)?.children.take(child);
        let Some(position) = taken else {
            return Err(TreeError::Corrupted(format!(
                "{} claims parent {} which does not list it",
                self.label(child),
                self.label(parent)
            )));
        };
        journal.push(Undo::Unlinked {
            parent,
            child,
            position,
        });
        self.set_parent_ref(child, None, journal)
    }

    fn link(&mut self, parent: NodeId, child: NodeId, journal: &mut Journal<S>) -> TreeResult<()> {
        if self.entry_mut(parent)?.children.attach(child).is_none() {
            return Err(self.full_error(parent, child));
        }
        journal.push(Undo::Linked { parent, child });
        self.set_parent_ref(child, Some(parent), journal)
    }

    fn set_parent_ref(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        journal: &mut Journal<S>,
    ) -> TreeResult<()> {
        let previous = std::mem::replace(&mut self.entry_mut(node)?.parent, parent);
        journal.push(Undo::Parent { node, previous });
        Ok(())
    }

    fn rollback(&mut self, journal: Journal<S>) {
        debug!(steps = journal.0.len(), "rolling back linkage");
        for undo in journal.0.into_iter().rev() {
            match undo {
                Undo::Parent { node, previous } => {
                    if let Some(entry) = self.arena.get_mut(node.index) {
                        entry.parent = previous;
                    }
                }
                Undo::Children { node, previous } => {
                    if let Some(entry) = self.arena.get_mut(node.index) {
                        entry.children = previous;
                    }
                }
                Undo::Unlinked {
                    parent,
                    child,
                    position,
                } => {
                    if let Some(entry) = self.arena.get_mut(parent.index) {
                        entry.children.restore(position, child);
                    }
                }
                Undo::Linked { parent, child } => {
                    if let Some(entry) = self.arena.get_mut(parent.index) {
                        entry.children.take(child);
                    }
                }
            }
        }
    }
}

impl Forest<Children> {
    /// Replace the children of `node` with `children`, in order.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateChild`] if an id repeats, [`TreeError::Loop`] if a
    /// candidate is `node` or one of its ancestors, plus the errors of
    /// [`Forest::set_parent`].
    pub fn set_children(&mut self, node: NodeId, children: &[NodeId]) -> TreeResult<()> {
        self.assign_children(node, Children::from(children.to_vec()))
    }

    /// Append several children at once; all or none are attached.
    pub fn extend(&mut self, node: NodeId, children: &[NodeId]) -> TreeResult<()> {
        let mut all = self.children(node);
        all.extend_from_slice(children);
        self.set_children(node, &all)
    }

    /// Reorder the children of `node`; sorting is stable.
    pub fn sort_children<F>(&mut self, node: NodeId, mut compare: F) -> TreeResult<()>
    where
        F: FnMut(&Node<Children>, &Node<Children>) -> Ordering,
    {
        self.check(node)?;
        let mut ids = self.children(node);
        ids.sort_by(|a, b| match (self.node(*a), self.node(*b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        });
        self.set_children(node, &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_node_id_when_displayed_then_shows_slot() {
        let mut tree = Tree::new();
        let a = tree.insert("a");
        assert_eq!(a.to_string(), format!("#{}", a.slot()));
        assert_eq!(tree.label(a), format!("'a' ({})", a));
    }

    #[test]
    fn given_two_forests_when_checking_foreign_id_then_type_error() {
        let mut first = Tree::new();
        let second = Tree::new();
        let a = first.insert("a");
        assert!(matches!(second.check(a), Err(TreeError::Type { .. })));
        assert!(second.node(a).is_none());
    }

    #[test]
    fn given_removed_node_when_checking_then_not_found() {
        let mut tree = Tree::new();
        let a = tree.insert("a");
        tree.remove_subtree(a).unwrap();
        assert!(matches!(tree.check(a), Err(TreeError::NodeNotFound(_))));
    }

    #[test]
    fn given_journal_when_rolled_back_then_restores_positions_in_reverse() {
        let mut tree = Tree::new();
        let p = tree.insert("p");
        let kids: Vec<NodeId> = (0..4).map(|i| tree.insert(format!("k{i}"))).collect();
        tree.set_children(p, &kids).unwrap();

        let mut journal = Journal::new();
        tree.unlink(kids[1], &mut journal).unwrap();
        tree.unlink(kids[3], &mut journal).unwrap();
        assert_eq!(tree.children(p), vec![kids[0], kids[2]]);

        tree.rollback(journal);
        assert_eq!(tree.children(p), kids);
        assert!(kids.iter().all(|&k| tree.parent(k) == Some(p)));
    }

    #[test]
    fn given_child_missing_from_parent_list_when_unlinking_then_corrupted() {
        let mut tree = Tree::new();
        let p = tree.insert("p");
        let c = tree.insert("c");
        // Forge a one-sided link.
        tree.arena.get_mut(c.index).unwrap().parent = Some(p);

        let result = tree.detach(c);
        assert!(matches!(result, Err(TreeError::Corrupted(_))));
        assert_eq!(tree.parent(c), Some(p));
    }
}
