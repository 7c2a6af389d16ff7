//! Conversion into `termtree` for callers that already print with it.

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::{NodeRef, Tree};

pub trait ToTermTree {
    fn to_termtree(&self) -> TermTree<String>;
}

fn label(node: &NodeRef<'_>) -> String {
    match node.meta() {
        Some(meta) => format!("[{}]  {}", meta, node.value()),
        None => node.value().to_string(),
    }
}

impl ToTermTree for NodeRef<'_> {
    #[instrument(level = "trace", skip(self))]
    fn to_termtree(&self) -> TermTree<String> {
        let leaves: Vec<_> = self.children().map(|c| c.to_termtree()).collect();
        TermTree::new(label(self)).with_leaves(leaves)
    }
}

impl ToTermTree for Tree {
    fn to_termtree(&self) -> TermTree<String> {
        self.root().to_termtree()
    }
}
