//! Node construction with initial parent and children.
//!
//! Construction goes through the same linkage protocol as later mutation: parent
//! first, then children, with the same checks and rollback. A failed construction
//! leaves no node behind.

use tracing::instrument;

use crate::domain::arena::{BinaryTree, NodeId, Tree};
use crate::domain::attrs::{AttrValue, Attrs};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::slots::{BinaryChildren, Children};

/// Constructor arguments for an N-ary node.
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    name: String,
    attrs: Attrs,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn children(mut self, children: impl Into<Vec<NodeId>>) -> Self {
        self.children = Some(children.into());
        self
    }
}

/// Constructor arguments for a binary node. `left`/`right` and `children` may both
/// be given only when they agree.
#[derive(Debug, Clone, Default)]
pub struct BinaryNodeBuilder {
    name: String,
    attrs: Attrs,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    children: Option<Vec<Option<NodeId>>>,
}

impl BinaryNodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn left(mut self, left: NodeId) -> Self {
        self.left = Some(left);
        self
    }

    pub fn right(mut self, right: NodeId) -> Self {
        self.right = Some(right);
        self
    }

    pub fn children(mut self, children: impl Into<Vec<Option<NodeId>>>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Reconcile `left`/`right` with `children` into the initial slots.
    fn slots(&self) -> TreeResult<Option<BinaryChildren>> {
        let explicit = self.left.is_some() || self.right.is_some();
        let Some(children) = &self.children else {
            return Ok(explicit.then(|| BinaryChildren::new(self.left, self.right)));
        };
        let slots = match children.as_slice() {
            [] => BinaryChildren::default(),
            [left, right] => BinaryChildren::new(*left, *right),
            _ => {
                return Err(TreeError::Arity(format!(
                    "binary node '{}' takes 0 or 2 children, got {}",
                    self.name,
                    children.len()
                )))
            }
        };
        let disagrees = self.left.is_some_and(|l| slots.left() != Some(l))
            || self.right.is_some_and(|r| slots.right() != Some(r));
        if disagrees {
            return Err(TreeError::ConflictingChildren(format!(
                "left/right of '{}' disagree with its children",
                self.name
            )));
        }
        Ok(Some(slots))
    }
}

impl Tree {
    /// Create a node and link it as described by `builder`.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, builder: NodeBuilder) -> TreeResult<NodeId> {
        let NodeBuilder {
            name,
            attrs,
            parent,
            children,
        } = builder;
        self.insert_linked(name, attrs, parent, children.map(Children::from))
    }
}

impl BinaryTree {
    /// Create a binary node and link it as described by `builder`.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, builder: BinaryNodeBuilder) -> TreeResult<NodeId> {
        let slots = builder.slots()?;
        let BinaryNodeBuilder {
            name,
            attrs,
            parent,
            ..
        } = builder;
        self.insert_linked(name, attrs, parent, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_left_and_matching_children_when_building_then_accepted() {
        let mut tree = BinaryTree::new();
        let b = tree.insert("b");
        let c = tree.insert("c");
        let a = tree
            .build(
                BinaryNodeBuilder::new("a")
                    .left(b)
                    .children(vec![Some(b), Some(c)]),
            )
            .unwrap();
        assert_eq!(tree.slots(a), [Some(b), Some(c)]);
    }

    #[test]
    fn given_left_disagreeing_with_children_when_building_then_conflict() {
        let mut tree = BinaryTree::new();
        let b = tree.insert("b");
        let c = tree.insert("c");
        let result = tree.build(
            BinaryNodeBuilder::new("a")
                .left(c)
                .children(vec![Some(b), Some(c)]),
        );
        assert!(matches!(result, Err(TreeError::ConflictingChildren(_))));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_attrs_when_building_then_stored() {
        let mut tree = Tree::new();
        let a = tree
            .build(NodeBuilder::new("a").attr("age", 90).attr("role", "root"))
            .unwrap();
        assert_eq!(tree.get_attr(a, "age"), Some(&AttrValue::Int(90)));
        assert_eq!(tree.get_attr(a, "missing"), None);
    }
}
