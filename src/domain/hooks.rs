//! User supplied validation around linkage operations.

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::HookError;
use crate::domain::slots::ChildSlots;

pub type HookResult = Result<(), HookError>;

/// Callbacks invoked by the linkage engine of a [`Forest`].
///
/// `pre_*` hooks run after the built-in checks and before any mutation. `post_*`
/// hooks see the forest with the new linkage in place; if one fails the operation is
/// rolled back. Hooks only get shared access, so they cannot change the tree.
pub trait LinkHooks<S: ChildSlots> {
    fn pre_assign_parent(
        &self,
        _forest: &Forest<S>,
        _node: NodeId,
        _new_parent: Option<NodeId>,
    ) -> HookResult {
        Ok(())
    }

    fn post_assign_parent(
        &self,
        _forest: &Forest<S>,
        _node: NodeId,
        _new_parent: Option<NodeId>,
    ) -> HookResult {
        Ok(())
    }

    fn pre_assign_children(
        &self,
        _forest: &Forest<S>,
        _node: NodeId,
        _new_children: &[NodeId],
    ) -> HookResult {
        Ok(())
    }

    fn post_assign_children(
        &self,
        _forest: &Forest<S>,
        _node: NodeId,
        _new_children: &[NodeId],
    ) -> HookResult {
        Ok(())
    }
}
