use generational_arena::{Arena, Index};
use log::trace;
use std::fmt;

use crate::connector::Connector;
use crate::geometry::{Point, Size};

/// Generational handle of a node. Handles of removed nodes never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl NodeId {
    /// Arena slot, stable for the lifetime of the node.
    pub fn slot(self) -> usize {
        self.0.into_raw_parts().0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "n{slot}g{generation}")
    }
}

/// One box of the chart.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) label: String,
    /// Top-left corner; relative to the parent, or surface coordinates for the root.
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) subtree_half_extent: f32,
    /// Downward shift applied by this node's last relocation, cleared by any
    /// other placement.
    pub(crate) relocation_shift: f32,
    pub(crate) draggable: bool,
    pub(crate) connector: Option<Connector>,
}

impl Node {
    fn new(label: String, size: Size, parent: Option<NodeId>) -> Self {
        Self {
            label,
            position: Point::ORIGIN,
            size,
            parent,
            children: Vec::new(),
            subtree_half_extent: 0.0,
            relocation_shift: 0.0,
            draggable: false,
            connector: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn subtree_half_extent(&self) -> f32 {
        self.subtree_half_extent
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn connector(&self) -> Option<&Connector> {
        self.connector.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Vertical center in the node's own frame.
    pub fn anchor_y(&self) -> f32 {
        self.size.height / 2.0
    }
}

/// Arena-backed rooted tree. Parent/child handles are the single source of
/// truth for structure; surfaces only mirror them.
#[derive(Debug, Default)]
pub struct Tree {
    arena: Arena<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Drops every node and installs a fresh root.
    pub(crate) fn reset_root(&mut self, label: String, size: Size) -> NodeId {
        // Removal bumps slot generations, so handles into the old tree stay dead.
        if let Some(root) = self.root {
            self.remove_subtree(root);
        }
        let id = NodeId(self.arena.insert(Node::new(label, size, None)));
        self.root = Some(id);
        id
    }

    /// Appends a new child, sized like its parent, at the end of `parent`'s children.
    pub(crate) fn insert_child(&mut self, parent: NodeId, label: String) -> Option<NodeId> {
        let size = self.node(parent)?.size;
        let id = NodeId(self.arena.insert(Node::new(label, size, Some(parent))));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        trace!(parent:% = parent, child:% = id; "Inserted child");
        Some(id)
    }

    /// Removes `id` and all its descendants, detaching `id` from its parent's
    /// child list. Returns the removed handles, descendants before ancestors.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let removed: Vec<NodeId> = self.iter_postorder_from(id).map(|(idx, _)| idx).collect();

        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        } else if self.root == Some(id) {
            self.root = None;
        }

        for &idx in &removed {
            self.arena.remove(idx.0);
        }
        removed
    }

    /// Surface coordinates of the node's top-left corner.
    pub fn absolute_position(&self, id: NodeId) -> Option<Point> {
        let mut node = self.node(id)?;
        let mut position = node.position;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            position = position + node.position;
        }
        Some(position)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.node(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Resolves a path of labels starting at the root label, e.g. `["A", "B"]`.
    /// The first matching child wins when siblings share a label.
    pub fn find_path<S: AsRef<str>>(&self, labels: &[S]) -> Option<NodeId> {
        let (first, rest) = labels.split_first()?;
        let mut current = self.root?;
        if self.node(current)?.label != first.as_ref() {
            return None;
        }
        for label in rest {
            current = self
                .children(current)
                .iter()
                .copied()
                .find(|&child| self.node(child).is_some_and(|n| n.label == label.as_ref()))?;
        }
        Some(current)
    }

    /// Pre-order traversal of the whole tree, siblings top to bottom.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn iter_from(&self, id: NodeId) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, Some(id))
    }

    pub fn iter_postorder_from(&self, id: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, Some(id))
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a Tree, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.node(current) {
                // Reverse so the first child is visited first.
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            let Some(node) = self.tree.node(current) else {
                continue;
            };
            if visited {
                return Some((current, node));
            }
            self.stack.push((current, true));
            for &child in node.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //   A
    //   ├── B
    //   │   └── D
    //   └── C
    fn sample() -> (Tree, [NodeId; 4]) {
        let mut tree = Tree::new();
        let a = tree.reset_root("A".into(), Size::new(200.0, 60.0));
        let b = tree.insert_child(a, "B".into()).unwrap();
        let c = tree.insert_child(a, "C".into()).unwrap();
        let d = tree.insert_child(b, "D".into()).unwrap();
        (tree, [a, b, c, d])
    }

    fn labels<'a>(iter: impl Iterator<Item = (NodeId, &'a Node)>) -> Vec<String> {
        iter.map(|(_, node)| node.label.clone()).collect()
    }

    #[test]
    fn children_keep_insertion_order_and_parent_size() {
        let (tree, [a, b, c, d]) = sample();
        assert_eq!(tree.children(a), &[b, c]);
        assert_eq!(tree.parent(d), Some(b));
        assert_eq!(tree.node(d).unwrap().size(), Size::new(200.0, 60.0));
        assert!(tree.node(a).unwrap().is_root());
    }

    #[test]
    fn traversals_visit_top_to_bottom() {
        let (tree, [_, b, _, _]) = sample();
        assert_eq!(labels(tree.iter()), ["A", "B", "D", "C"]);
        assert_eq!(labels(tree.iter_postorder_from(tree.root().unwrap())), ["D", "B", "C", "A"]);
        assert_eq!(labels(tree.iter_from(b)), ["B", "D"]);
    }

    #[test]
    fn remove_subtree_detaches_and_invalidates_handles() {
        let (mut tree, [a, b, c, d]) = sample();
        let removed = tree.remove_subtree(b);

        assert_eq!(removed, vec![d, b]);
        assert_eq!(tree.children(a), &[c]);
        assert!(tree.node(b).is_none());
        assert!(tree.node(d).is_none());
        assert_eq!(tree.len(), 2);

        // Slot reuse must not resurrect the old handle.
        let e = tree.insert_child(a, "E".into()).unwrap();
        assert_ne!(e, b);
        assert!(tree.node(b).is_none());
    }

    #[test]
    fn removing_root_empties_tree() {
        let (mut tree, [a, ..]) = sample();
        assert_eq!(tree.remove_subtree(a).len(), 4);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert!(tree.remove_subtree(a).is_empty());
    }

    #[test]
    fn absolute_position_accumulates_parent_frames() {
        let (mut tree, [a, b, _, d]) = sample();
        tree.node_mut(a).unwrap().position = Point::new(100.0, 200.0);
        tree.node_mut(b).unwrap().position = Point::new(250.0, -40.0);
        tree.node_mut(d).unwrap().position = Point::new(250.0, 0.0);

        assert_eq!(tree.absolute_position(d), Some(Point::new(600.0, 160.0)));
        assert_eq!(tree.depth(d), Some(2));
        assert_eq!(tree.depth(a), Some(0));
    }

    #[test]
    fn find_path_matches_labels_from_root() {
        let (tree, [a, _, c, d]) = sample();
        assert_eq!(tree.find_path(&["A"]), Some(a));
        assert_eq!(tree.find_path(&["A", "B", "D"]), Some(d));
        assert_eq!(tree.find_path(&["A", "C"]), Some(c));
        assert_eq!(tree.find_path(&["A", "X"]), None);
        assert_eq!(tree.find_path(&["B"]), None);
        assert_eq!(tree.find_path::<&str>(&[]), None);
    }
}
