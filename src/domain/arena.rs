use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::value::Value;
use crate::render::Renderer;

/// Value given to the root of a tree created with [`Tree::new`].
pub const DEFAULT_ROOT: &str = ".";

static NEXT_TREE_TAG: AtomicU64 = AtomicU64::new(0);

fn next_tree_tag() -> u64 {
    NEXT_TREE_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Handle of a node inside its [`Tree`].
///
/// Ids are bound to the tree instance that issued them; looking one up in
/// any other tree, including a clone, yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u64,
    index: Index,
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Payload shown on the node's line
    pub value: Value,
    /// Optional payload shown as a bracketed prefix
    pub meta: Option<Value>,
    /// Index of parent node in the arena, None for roots and detached branches
    pub parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in render order
    pub children: Vec<NodeId>,
}

impl TreeNode {
    fn new(meta: Option<Value>, value: Value, parent: Option<NodeId>) -> Self {
        Self {
            value,
            meta,
            parent,
            children: Vec::new(),
        }
    }
}

/// Arena-based tree of labeled nodes.
///
/// The arena owns every node. Children are held as indices in insertion
/// order and the parent link is a plain index, so nothing in the structure
/// owns its ancestors. Nodes are only ever appended; there is no removal or
/// re-parenting, which keeps the hierarchy acyclic.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<TreeNode>,
    root: NodeId,
    tag: u64,
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        let tag = next_tree_tag();
        let mut arena = self.arena.clone();
        for (_, node) in arena.iter_mut() {
            if let Some(parent) = node.parent.as_mut() {
                parent.tree = tag;
            }
            for child in node.children.iter_mut() {
                child.tree = tag;
            }
        }
        Self {
            arena,
            root: NodeId {
                tree: tag,
                index: self.root.index,
            },
            tag,
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree whose root displays `"."`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    pub fn with_root(value: impl Into<Value>) -> Self {
        let tag = next_tree_tag();
        let mut arena = Arena::new();
        let index = arena.insert(TreeNode::new(None, value.into(), None));
        Self {
            arena,
            root: NodeId { tree: tag, index },
            tag,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
            node: &self.arena[self.root.index],
        }
    }

    pub fn root_mut(&mut self) -> NodeMut<'_> {
        let id = self.root;
        NodeMut { tree: self, id }
    }

    /// Looks up a node; `None` if the id belongs to another tree.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|node| NodeRef {
            tree: self,
            id,
            node,
        })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        if self.get(id).is_some() {
            Some(NodeMut { tree: self, id })
        } else {
            None
        }
    }

    fn get(&self, id: NodeId) -> Option<&TreeNode> {
        if id.tree != self.tag {
            return None;
        }
        self.arena.get(id.index)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        if id.tree != self.tag {
            return None;
        }
        self.arena.get_mut(id.index)
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Renders the whole tree as raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.root().to_bytes()
    }

    /// Renders the whole tree into `w`.
    pub fn write_to<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        self.root().write_to(w)
    }

    #[instrument(level = "trace", skip(self))]
    fn insert_child(&mut self, parent: NodeId, meta: Option<Value>, value: Value) -> NodeId {
        let index = self.arena.insert(TreeNode::new(meta, value, Some(parent)));
        let id = NodeId {
            tree: self.tag,
            index,
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root(), f)
    }
}

/// Read-only view of a node and, through it, its subtree.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    node: &'a TreeNode,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &'a Value {
        &self.node.value
    }

    pub fn meta(&self) -> Option<&'a Value> {
        self.node.meta.as_ref()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        let node = self.node;
        node.children.iter().filter_map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.children.is_empty()
    }

    /// True when rendering starts a fresh diagram at this node (no parent link).
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Returns the most recently added child, `None` for a leaf.
    pub fn find_last_child(&self) -> Option<NodeRef<'a>> {
        self.node
            .children
            .last()
            .and_then(|&id| self.tree.node(id))
    }

    /// True if this node is the last child of its parent.
    pub fn is_last_sibling(&self) -> bool {
        self.parent()
            .and_then(|p| p.find_last_child())
            .is_some_and(|last| last.id == self.id)
    }

    /// Depth-first search over descendants by structural value equality.
    ///
    /// Each child is checked before its own subtree is searched, so the
    /// first pre-order match wins. The node itself is not a candidate.
    #[instrument(level = "trace", skip(self, value))]
    pub fn find_by_value(&self, value: impl Into<Value>) -> Option<NodeRef<'a>> {
        let target = value.into();
        self.find_first(&|n: &NodeRef<'a>| *n.value() == target)
    }

    /// Like [`find_by_value`](Self::find_by_value) but matches present metadata.
    #[instrument(level = "trace", skip(self, meta))]
    pub fn find_by_meta(&self, meta: impl Into<Value>) -> Option<NodeRef<'a>> {
        let target = meta.into();
        self.find_first(&|n: &NodeRef<'a>| n.meta() == Some(&target))
    }

    fn find_first(&self, pred: &dyn Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        for child in self.children() {
            if pred(&child) {
                return Some(child);
            }
            if let Some(found) = child.find_first(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Calls `visitor` for every descendant.
    ///
    /// Visits each child immediately followed by its full subtree, in child
    /// order. This is a per-branch depth-first walk, not level-by-level.
    pub fn visit_all<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeRef<'a>),
    {
        self.visit_with(&mut visitor);
    }

    fn visit_with<F>(&self, visitor: &mut F)
    where
        F: FnMut(NodeRef<'a>),
    {
        for child in self.children() {
            visitor(child);
            if !child.is_leaf() {
                child.visit_with(visitor);
            }
        }
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> TreeIterator<'a> {
        TreeIterator {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// Height of the subtree, 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self.children().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Values of all leaves below (or at) this node, in render order.
    pub fn leaf_values(&self) -> Vec<&'a Value> {
        self.iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.value())
            .collect()
    }

    pub fn render_with(&self, renderer: &Renderer) -> String {
        renderer.render_to_string(*self)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn write_to<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        Renderer::default().render_to_writer(*self, w)
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::default().render(*self, f)
    }
}

/// Mutable handle used to grow the tree below one node.
///
/// Leaf-adding methods return the same handle for chaining; branch-adding
/// methods return a handle to the new child.
#[derive(Debug)]
pub struct NodeMut<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn as_node_ref(&self) -> NodeRef<'_> {
        NodeRef {
            tree: &*self.tree,
            id: self.id,
            node: &self.tree.arena[self.id.index],
        }
    }

    pub fn add_node(self, value: impl Into<Value>) -> Self {
        self.tree.insert_child(self.id, None, value.into());
        self
    }

    pub fn add_meta_node(self, meta: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.tree.insert_child(self.id, Some(meta.into()), value.into());
        self
    }

    pub fn add_branch(self, value: impl Into<Value>) -> NodeMut<'a> {
        let id = self.tree.insert_child(self.id, None, value.into());
        NodeMut {
            tree: self.tree,
            id,
        }
    }

    pub fn add_meta_branch(self, meta: impl Into<Value>, value: impl Into<Value>) -> NodeMut<'a> {
        let id = self.tree.insert_child(self.id, Some(meta.into()), value.into());
        NodeMut {
            tree: self.tree,
            id,
        }
    }

    /// Detaches the parent link so this node renders as a standalone root.
    ///
    /// The node stays in its parent's children; only upward traversal from
    /// here stops. Idempotent.
    pub fn as_branch(self) -> Self {
        if let Some(node) = self.tree.get_mut(self.id) {
            node.parent = None;
        }
        self
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        if let Some(node) = self.tree.get_mut(self.id) {
            node.value = value.into();
        }
    }

    pub fn set_meta_value(&mut self, meta: impl Into<Value>) {
        if let Some(node) = self.tree.get_mut(self.id) {
            node.meta = Some(meta.into());
        }
    }
}

/// Pre-order iterator, left to right.
pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::new();
        tree.root_mut()
            .add_branch("a")
            .add_node("a1")
            .add_branch("a2")
            .add_node("a2x");
        tree.root_mut().add_node("b");
        tree
    }

    #[test]
    fn given_new_tree_when_created_then_root_is_dot() {
        let tree = Tree::new();
        assert_eq!(tree.root().value(), &Value::from("."));
        assert!(tree.root().is_root());
        assert!(tree.root().is_leaf());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_add_node_when_chained_then_appends_to_same_parent() {
        let mut tree = Tree::new();
        tree.root_mut().add_node("x").add_node("y").add_node("z");
        let values: Vec<String> = tree.root().children().map(|c| c.value().to_string()).collect();
        assert_eq!(values, ["x", "y", "z"]);
    }

    #[test]
    fn given_add_branch_when_chained_then_descends() {
        let mut tree = Tree::new();
        let id = tree.root_mut().add_branch("x").add_branch("y").id();
        let y = tree.node(id).unwrap();
        assert_eq!(y.parent().unwrap().value(), &Value::from("x"));
        assert_eq!(y.parent().unwrap().parent().unwrap().id(), tree.root_id());
    }

    #[test]
    fn given_children_when_linked_then_parent_owns_child() {
        let tree = sample();
        for node in tree.root().iter() {
            for child in node.children() {
                assert_eq!(child.parent().unwrap().id(), node.id());
            }
        }
    }

    #[test]
    fn given_node_when_find_last_child_then_returns_highest_index() {
        let tree = sample();
        assert_eq!(tree.root().find_last_child().unwrap().value(), &Value::from("b"));
        let b = tree.root().find_by_value("b").unwrap();
        assert!(b.find_last_child().is_none());
        assert!(b.is_last_sibling());
        assert!(!tree.root().find_by_value("a").unwrap().is_last_sibling());
    }

    #[test]
    fn given_as_branch_when_applied_twice_then_parent_stays_detached() {
        let mut tree = sample();
        let a = tree.root().find_by_value("a").unwrap().id();
        tree.node_mut(a).unwrap().as_branch().as_branch();
        let a = tree.node(a).unwrap();
        assert!(a.is_root());
        assert_eq!(a.child_count(), 2);
        assert_eq!(tree.root().child_count(), 2);
    }

    #[test]
    fn given_set_value_when_mutated_then_value_replaced() {
        let mut tree = sample();
        let b = tree.root().find_by_value("b").unwrap().id();
        let mut node = tree.node_mut(b).unwrap();
        node.set_value(7);
        node.set_meta_value("m");
        let b = tree.node(b).unwrap();
        assert_eq!(b.value(), &Value::Int(7));
        assert_eq!(b.meta(), Some(&Value::from("m")));
    }

    #[test]
    fn given_tree_when_iterating_then_pre_order() {
        let tree = sample();
        let values: Vec<String> = tree.root().iter().map(|n| n.value().to_string()).collect();
        assert_eq!(values, [".", "a", "a1", "a2", "a2x", "b"]);
    }

    #[test]
    fn given_tree_when_depth_then_counts_levels() {
        let tree = sample();
        assert_eq!(tree.root().depth(), 4);
        let leaves: Vec<String> = tree.root().leaf_values().iter().map(|v| v.to_string()).collect();
        assert_eq!(leaves, ["a1", "a2x", "b"]);
    }

    #[test]
    fn given_foreign_id_when_looked_up_then_none() {
        let mut big = sample();
        let id = big.root_mut().add_branch("extra").add_branch("deep").id();
        let small = Tree::new();
        assert!(big.node(id).is_some());
        assert!(small.node(id).is_none());
    }

    #[test]
    fn given_root_id_of_other_tree_when_looked_up_then_none() {
        let big = Tree::with_root("big");
        let mut small = Tree::with_root("small");
        assert!(small.node(big.root_id()).is_none());
        assert!(small.node_mut(big.root_id()).is_none());
        assert_eq!(small.node_count(), 1);
        assert_eq!(small.root().value(), &Value::from("small"));
    }

    #[test]
    fn given_cloned_tree_when_looking_up_original_ids_then_none() {
        let tree = sample();
        let a = tree.root().find_by_value("a").map(|n| n.id()).unwrap();
        let copy = tree.clone();
        assert!(copy.node(a).is_none());
        assert!(copy.node(tree.root_id()).is_none());

        let copied_a = copy.root().find_by_value("a").unwrap();
        assert_eq!(copied_a.parent().unwrap().id(), copy.root_id());
        assert_eq!(copy.to_string(), tree.to_string());
    }
}
