//! Box-drawing renderer for [`Tree`](crate::domain::Tree) nodes
//!
//! A render root (a node without parent link) prints its value bare. Every
//! descendant line is prefixed, per ancestor depth, with either a vertical
//! link or blank padding, followed by a `mid` or `end` connector:
//!
//! ```text
//! .
//! ├─ A
//! │   └─ B
//! └─ C
//! ```
//!
//! Continuation lines of multi-line values get a padding computed by walking
//! upward from the node, so ancestor links stay connected across them.

use std::fmt;
use std::io;

use itertools::{Itertools, Position};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::NodeRef;

pub const EDGE_LINK: &str = "│";
pub const EDGE_MID: &str = "├─";
pub const EDGE_END: &str = "└─";

/// Number of spaces per tree level.
pub const DEFAULT_INDENT_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Link,
    Mid,
    End,
}

/// Connector strings used by a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glyphs {
    pub link: String,
    pub mid: String,
    pub end: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            link: EDGE_LINK.into(),
            mid: EDGE_MID.into(),
            end: EDGE_END.into(),
        }
    }
}

impl Glyphs {
    pub fn edge(&self, edge: EdgeType) -> &str {
        match edge {
            EdgeType::Link => &self.link,
            EdgeType::Mid => &self.mid,
            EdgeType::End => &self.end,
        }
    }
}

/// Per-renderer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Spaces following the link glyph on each level
    pub indent_size: usize,
    pub glyphs: Glyphs,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT_SIZE,
            glyphs: Glyphs::default(),
        }
    }
}

/// Renders nodes with a fixed [`RenderConfig`].
///
/// Rendering only reads the tree; rendering the same unmodified tree twice
/// yields identical output.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
    blank: String,
    link: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        let blank = " ".repeat(config.indent_size + 1);
        let link = format!("{}{}", config.glyphs.link, " ".repeat(config.indent_size));
        Self {
            config,
            blank,
            link,
        }
    }

    pub fn with_indent_size(indent_size: usize) -> Self {
        Self::new(RenderConfig {
            indent_size,
            ..RenderConfig::default()
        })
    }

    /// Writes `node` and its descendants to `w`.
    #[instrument(level = "trace", skip_all, fields(children = node.child_count()))]
    pub fn render<W: fmt::Write + ?Sized>(&self, node: NodeRef<'_>, w: &mut W) -> fmt::Result {
        let mut ended = Vec::new();
        if node.is_root() {
            match node.meta() {
                Some(meta) => write!(w, "[{}]  {}", meta, node.value())?,
                None => write!(w, "{}", node.value())?,
            }
            w.write_char('\n')?;
        } else {
            // detached rendering of an attached node: its own line at level 0
            let edge = if node.is_leaf() {
                ended.push(0);
                EdgeType::End
            } else {
                EdgeType::Mid
            };
            self.print_values(w, 0, &ended, edge, node)?;
        }
        if !node.is_leaf() {
            self.print_nodes(w, 0, &ended, node)?;
        }
        Ok(())
    }

    /// Display adapter, e.g. for `format!` or `to_string()`.
    pub fn display<'r, 'a>(&'r self, node: NodeRef<'a>) -> Rendered<'r, 'a> {
        Rendered {
            renderer: self,
            node,
        }
    }

    pub fn render_to_string(&self, node: NodeRef<'_>) -> String {
        self.display(node).to_string()
    }

    pub fn render_to_writer<W: io::Write + ?Sized>(
        &self,
        node: NodeRef<'_>,
        w: &mut W,
    ) -> io::Result<()> {
        write!(w, "{}", self.display(node))
    }

    fn print_nodes<W: fmt::Write + ?Sized>(
        &self,
        w: &mut W,
        level: usize,
        ended: &[usize],
        parent: NodeRef<'_>,
    ) -> fmt::Result {
        for (position, node) in parent.children().with_position() {
            match position {
                Position::Last | Position::Only => {
                    // ended levels are copied so siblings' subtrees never see them
                    let mut ended = ended.to_vec();
                    ended.push(level);
                    self.print_subtree(w, level, &ended, EdgeType::End, node)?;
                }
                Position::First | Position::Middle => {
                    self.print_subtree(w, level, ended, EdgeType::Mid, node)?;
                }
            }
        }
        Ok(())
    }

    fn print_subtree<W: fmt::Write + ?Sized>(
        &self,
        w: &mut W,
        level: usize,
        ended: &[usize],
        edge: EdgeType,
        node: NodeRef<'_>,
    ) -> fmt::Result {
        self.print_values(w, level, ended, edge, node)?;
        if !node.is_leaf() {
            self.print_nodes(w, level + 1, ended, node)?;
        }
        Ok(())
    }

    fn print_values<W: fmt::Write + ?Sized>(
        &self,
        w: &mut W,
        level: usize,
        ended: &[usize],
        edge: EdgeType,
        node: NodeRef<'_>,
    ) -> fmt::Result {
        for depth in 0..level {
            if ended.contains(&depth) {
                w.write_str(&self.blank)?;
            } else {
                w.write_str(&self.link)?;
            }
        }

        let value = self.render_value(level, node);
        let edge = self.config.glyphs.edge(edge);
        match node.meta() {
            Some(meta) => writeln!(w, "{} [{}]  {}", edge, meta, value),
            None => writeln!(w, "{} {}", edge, value),
        }
    }

    /// Textual value with continuation lines prefixed by [`Self::padding`].
    fn render_value(&self, level: usize, node: NodeRef<'_>) -> String {
        let text = node.value().to_string();
        if !node.value().is_multiline() {
            return text;
        }

        let pad = self.padding(level, node);
        trace!(level, pad = %pad, "padding multi-line value");
        text.split('\n')
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    line.to_string()
                } else {
                    format!("{}{}", pad, line)
                }
            })
            .join("\n")
    }

    /// Padding for continuation lines, one segment per depth `0..=level`.
    ///
    /// Built leaf-to-root: at each depth the segment is blank if the node on
    /// the path is the last of its siblings, a link otherwise. The walk stops
    /// at the first node without parent link or when depths run out.
    fn padding(&self, level: usize, node: NodeRef<'_>) -> String {
        let mut links = vec![""; level + 1];
        let mut depth = Some(level);
        let mut current = node;

        while let (Some(parent), Some(d)) = (current.parent(), depth) {
            links[d] = if current.is_last_sibling() {
                self.blank.as_str()
            } else {
                self.link.as_str()
            };
            depth = d.checked_sub(1);
            current = parent;
        }

        links.concat()
    }
}

/// [`fmt::Display`] adapter returned by [`Renderer::display`].
pub struct Rendered<'r, 'a> {
    renderer: &'r Renderer,
    node: NodeRef<'a>,
}

impl fmt::Display for Rendered<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.render(self.node, f)
    }
}
