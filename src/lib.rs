//! Ordered N-ary and binary trees with transactional parent/child linkage, plus a
//! Reingold-Tilford layout that assigns drawable coordinates.
//!
//! # Example
//! ```
//! use treelink::domain::Tree;
//! use treelink::layout::{reingold_tilford, LayoutParams};
//!
//! let mut tree = Tree::new();
//! let a = tree.insert("a");
//! let b = tree.insert("b");
//! let c = tree.insert("c");
//! tree.set_children(a, &[b, c]).unwrap();
//!
//! assert_eq!(tree.parent(b), Some(a));
//! assert!(tree.set_parent(a, Some(b)).is_err());
//! assert_eq!(tree.children(a), vec![b, c]);
//!
//! reingold_tilford(&mut tree, a, &LayoutParams::default()).unwrap();
//! assert_eq!(tree.get_attr(a, "x").and_then(|v| v.as_f64()), Some(0.5));
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod layout;
pub mod tree_traits;
pub mod util;

pub use domain::{BinaryTree, NodeId, Tree, TreeError, TreeResult};
