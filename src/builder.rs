//! Tree builder for scanning directories into a renderable [`Tree`].

use std::path::Path;

use tracing::{debug, instrument};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::domain::{NodeId, Tree, Value};
use crate::errors::{TreePrintError, TreePrintResult};

/// Constructs a tree mirroring a directory hierarchy.
///
/// Directories become branches, everything else becomes a leaf. Entries are
/// sorted by file name so the output is stable across platforms.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    max_depth: Option<usize>,
    show_hidden: bool,
    with_sizes: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_depth: settings.max_depth,
            show_hidden: settings.show_hidden,
            with_sizes: settings.sizes,
        }
    }

    /// Limit descent below the root; `Some(1)` lists only direct entries.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn show_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    /// Attach file sizes in bytes as node metadata.
    pub fn with_sizes(mut self, with_sizes: bool) -> Self {
        self.with_sizes = with_sizes;
        self
    }

    /// Build a tree from all entries below `directory_path`.
    #[instrument(level = "debug", skip(self))]
    pub fn build_from_directory(&self, directory_path: &Path) -> TreePrintResult<Tree> {
        if !directory_path.exists() {
            return Err(TreePrintError::NotFound(directory_path.to_path_buf()));
        }
        if !directory_path.is_dir() {
            return Err(TreePrintError::NotADirectory(directory_path.to_path_buf()));
        }

        let mut tree = Tree::with_root(directory_path.display().to_string());
        // ancestors of the current entry, indexed by walk depth
        let mut path: Vec<NodeId> = vec![tree.root_id()];

        let mut walker = WalkDir::new(directory_path).min_depth(1).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        let show_hidden = self.show_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || show_hidden || !is_hidden(e));

        for entry in entries {
            let entry = entry.map_err(|e| TreePrintError::Walk {
                path: directory_path.to_path_buf(),
                message: e.to_string(),
            })?;

            path.truncate(entry.depth());
            let Some(&parent) = path.last() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(parent) = tree.node_mut(parent) else {
                continue;
            };

            if entry.file_type().is_dir() {
                let id = parent.add_branch(name).id();
                path.push(id);
            } else if self.with_sizes {
                let size = entry_size(&entry)?;
                parent.add_meta_node(size, name);
            } else {
                parent.add_node(name);
            }
        }

        debug!(nodes = tree.node_count(), "directory tree built");
        Ok(tree)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn entry_size(entry: &DirEntry) -> TreePrintResult<Value> {
    let metadata = entry.metadata().map_err(|e| TreePrintError::Walk {
        path: entry.path().to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Value::Int(i64::try_from(metadata.len()).unwrap_or(i64::MAX)))
}
