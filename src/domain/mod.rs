//! Domain layer: node storage, linkage engine and queries
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod attrs;
pub mod binary;
pub mod builder;
pub mod error;
pub mod hooks;
pub mod query;
pub mod slots;
pub mod traversal;

pub use arena::{BinaryTree, Forest, Node, NodeId, Tree};
pub use attrs::{AttrValue, Attrs};
pub use builder::{BinaryNodeBuilder, NodeBuilder};
pub use error::{HookError, TreeError, TreeResult};
pub use hooks::{HookResult, LinkHooks};
pub use query::Ancestors;
pub use slots::{BinaryChildren, ChildSlots, Children};
pub use traversal::{LevelOrder, LevelOrderGroups, PostOrder, PreOrder, ZigZagGroups};
