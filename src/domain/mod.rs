//! Domain layer: payload and tree model
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod value;

pub use arena::{NodeId, NodeMut, NodeRef, Tree, TreeIterator, TreeNode, DEFAULT_ROOT};
pub use value::Value;
