//! Linkage errors (no external dependencies beyond thiserror)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Boxed error returned by user supplied [`LinkHooks`](crate::domain::LinkHooks).
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Every way a linkage operation or a tree query can fail.
///
/// After any of these is returned from a mutating call the forest is exactly as it
/// was before the call.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The assignment would make a node its own parent, child, ancestor or descendant.
    #[error("loop detected: {0}")]
    Loop(String),

    /// The node handle was minted by another forest, e.g. a binary tree id used
    /// with an N-ary tree.
    #[error("node {node} is not compatible with this {expected} forest")]
    Type { node: NodeId, expected: &'static str },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate child: {0}")]
    DuplicateChild(String),

    #[error("arity violated: {0}")]
    Arity(String),

    #[error("conflicting children: {0}")]
    ConflictingChildren(String),

    /// A child claims a parent that does not list it. Indicates an earlier defect.
    #[error("corrupted tree: {0}")]
    Corrupted(String),

    #[error("nodes do not share the same root: {0}")]
    NotSameTree(String),

    /// A user hook rejected the operation; the operation was rolled back.
    #[error("hook rejected {context}")]
    Hook {
        context: String,
        #[source]
        source: HookError,
    },
}

impl TreeError {
    /// True for every variant that is raised by a cycle check.
    pub fn is_loop(&self) -> bool {
        matches!(self, TreeError::Loop(_))
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
