//! Render labeled trees as box-drawing diagrams.
//!
//! ```
//! use treeprint::Tree;
//!
//! let mut tree = Tree::new();
//! tree.root_mut().add_branch("A").add_node("B");
//! tree.root_mut().add_node("C");
//!
//! assert_eq!(tree.to_string(), ".\n├─ A\n│   └─ B\n└─ C\n");
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod exitcode;
pub mod render;
pub mod tree_traits;
pub mod util;

pub use builder::TreeBuilder;
pub use domain::{NodeId, NodeMut, NodeRef, Tree, Value};
pub use errors::{TreePrintError, TreePrintResult};
pub use render::{Glyphs, RenderConfig, Renderer, EDGE_END, EDGE_LINK, EDGE_MID};
pub use tree_traits::ToTermTree;
