//! Structural edits: seeding, inserting and removing nodes.

use log::debug;

use crate::config::ChartConfig;
use crate::connector::Connector;
use crate::geometry::Anchor;
use crate::layout::{refresh_connectors, relocate, set_position};
use crate::seed::Seed;
use crate::surface::Surface;
use crate::tree::{NodeId, Tree};

/// Replaces whatever the tree held with a single root box.
pub fn create_root<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    label: String,
) -> NodeId {
    if let Some(old) = tree.root() {
        for id in tree.iter_postorder_from(old).map(|(id, _)| id).collect::<Vec<_>>() {
            surface.detach_node(id);
        }
    }
    let root = tree.reset_root(label, config.node_size());
    if let Some(node) = tree.node(root) {
        surface.attach_node(root, None, node);
    }
    debug!(root:% = root; "Created root");
    root
}

/// Appends a child box to `parent` and seeds its own children from `seeds`.
///
/// The child starts at `parent.width + distance_x`, below the lowest existing
/// sibling. The caller decides when to relocate `parent`.
pub fn add_child<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    parent: NodeId,
    label: String,
    seeds: &[Seed],
) -> Option<NodeId> {
    let parent_node = tree.node(parent)?;
    let x = parent_node.size.width + config.distance_x;
    let y = parent_node
        .children
        .iter()
        .filter_map(|&sibling| tree.node(sibling).map(|s| s.position.y))
        .reduce(f32::max)
        .map_or(0.0, |lowest| lowest.max(0.0) + config.height + config.distance_y);

    let child = tree.insert_child(parent, label)?;
    if let Some(node) = tree.node(child) {
        surface.attach_node(child, Some(parent), node);
    }
    set_position(tree, surface, child, Anchor::TopLeft, x, y);
    joint(tree, surface, child);
    debug!(parent:% = parent, child:% = child, x, y; "Added child");

    add_children(tree, config, surface, child, seeds);
    Some(child)
}

/// Adds every seed under `parent` in order, then relocates `parent` once
/// without propagation. Returns `parent` for chaining.
pub fn add_children<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    parent: NodeId,
    seeds: &[Seed],
) -> Option<NodeId> {
    if !tree.contains(parent) {
        return None;
    }
    if seeds.is_empty() {
        return Some(parent);
    }
    for seed in seeds {
        add_child(tree, config, surface, parent, seed.label.clone(), &seed.children);
    }
    relocate(tree, config, surface, parent, false);
    Some(parent)
}

/// Pins the connector anchors between `child` and its parent and draws it.
pub fn joint<S: Surface + ?Sized>(tree: &mut Tree, surface: &mut S, child: NodeId) -> bool {
    let Some(parent) = tree.parent(child) else {
        return false;
    };
    let Some(parent_size) = tree.node(parent).map(|node| node.size) else {
        return false;
    };
    let connector = Connector::joint(parent_size);
    surface.attach_joint(child, parent, &connector);
    if let Some(node) = tree.node_mut(child) {
        node.connector = Some(connector);
    }
    refresh_connectors(tree, surface, child);
    true
}

/// Removes `id` with its whole subtree and re-lays out what remains above it.
///
/// A parent left without children drops its cached half-extent and the
/// relocation starts from the grandparent. Removing the root empties the tree.
pub fn remove<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    id: NodeId,
) -> bool {
    if !tree.contains(id) {
        return false;
    }
    let parent = tree.parent(id);
    let removed = tree.remove_subtree(id);
    for &gone in &removed {
        surface.detach_node(gone);
    }
    debug!(node:% = id, removed = removed.len(); "Removed subtree");

    let Some(parent) = parent else {
        return true;
    };
    let orphaned = tree.children(parent).is_empty();
    if !orphaned {
        relocate(tree, config, surface, parent, true);
        return true;
    }

    if let Some(node) = tree.node_mut(parent) {
        node.subtree_half_extent = 0.0;
    }
    if let Some(grandparent) = tree.parent(parent) {
        relocate(tree, config, surface, grandparent, true);
    }
    true
}

/// Replaces the label of `id`. Empty labels are ignored.
pub fn rename<S: Surface + ?Sized>(
    tree: &mut Tree,
    surface: &mut S,
    id: NodeId,
    label: &str,
) -> bool {
    if label.is_empty() {
        return false;
    }
    let Some(node) = tree.node_mut(id) else {
        return false;
    };
    node.label = label.to_string();
    surface.set_label(id, label);
    debug!(node:% = id, label; "Renamed node");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::surface::NullSurface;
    use float_cmp::approx_eq;
    use std::collections::HashMap;

    /// Records which frames were touched.
    #[derive(Default)]
    struct Recorder {
        moves: HashMap<NodeId, usize>,
        attached: Vec<NodeId>,
        detached: Vec<NodeId>,
        joints: Vec<(NodeId, NodeId)>,
    }

    impl Surface for Recorder {
        fn canvas_size(&self) -> Size {
            Size::new(1200.0, 800.0)
        }

        fn attach_node(&mut self, id: NodeId, _parent: Option<NodeId>, _node: &crate::tree::Node) {
            self.attached.push(id);
        }

        fn detach_node(&mut self, id: NodeId) {
            self.detached.push(id);
        }

        fn move_node(&mut self, id: NodeId, _position: Point) {
            *self.moves.entry(id).or_default() += 1;
        }

        fn attach_joint(&mut self, child: NodeId, parent: NodeId, _connector: &Connector) {
            self.joints.push((child, parent));
        }
    }

    fn y_of(tree: &Tree, id: NodeId) -> f32 {
        tree.node(id).unwrap().position.y
    }

    #[test]
    fn new_children_start_below_the_lowest_sibling() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());

        let b = add_child(&mut tree, &config, &mut surface, a, "B".into(), &[]).unwrap();
        assert_eq!(tree.node(b).unwrap().position, Point::new(250.0, 0.0));

        let c = add_child(&mut tree, &config, &mut surface, a, "C".into(), &[]).unwrap();
        assert_eq!(y_of(&tree, c), 80.0);

        // Siblings above the parent's top never pull the new child upward.
        set_position(&mut tree, &mut surface, b, Anchor::TopLeft, 250.0, -300.0);
        set_position(&mut tree, &mut surface, c, Anchor::TopLeft, 250.0, -100.0);
        let d = add_child(&mut tree, &config, &mut surface, a, "D".into(), &[]).unwrap();
        assert_eq!(y_of(&tree, d), 80.0);
        assert_eq!(tree.children(a), &[b, c, d]);
    }

    #[test]
    fn add_child_on_stale_parent_is_none() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        let b = add_child(&mut tree, &config, &mut surface, a, "B".into(), &[]).unwrap();
        remove(&mut tree, &config, &mut surface, b);

        assert!(add_child(&mut tree, &config, &mut surface, b, "X".into(), &[]).is_none());
        assert!(add_children(&mut tree, &config, &mut surface, b, &[Seed::leaf("X")]).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn batch_relocates_parent_once() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = Recorder::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        let seeds = [Seed::leaf("B"), Seed::leaf("C"), Seed::leaf("D")];

        assert_eq!(add_children(&mut tree, &config, &mut surface, a, &seeds), Some(a));
        assert_eq!(surface.moves.get(&a), Some(&1));
        assert_eq!(surface.attached.len(), 4);
        assert_eq!(surface.joints.len(), 3);

        assert_eq!(add_children(&mut tree, &config, &mut surface, a, &[]), Some(a));
        assert_eq!(surface.moves.get(&a), Some(&1));
    }

    #[test]
    fn joint_pins_anchors_on_parent_height() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        let b = add_child(&mut tree, &config, &mut surface, a, "B".into(), &[]).unwrap();

        let connector = tree.node(b).unwrap().connector().copied().unwrap();
        assert_eq!(connector.parent_anchor(), Point::new(200.0, 30.0));
        assert_eq!(connector.start(), Point::new(-50.0, 30.0));
        assert!(!joint(&mut tree, &mut surface, a));
    }

    #[test]
    fn removing_a_sibling_rebalances_the_parent() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        add_children(&mut tree, &config, &mut surface, a, &[Seed::leaf("B"), Seed::leaf("C")]);
        let (b, c) = (tree.children(a)[0], tree.children(a)[1]);
        assert!(approx_eq!(f32, y_of(&tree, a), 70.0));

        assert!(remove(&mut tree, &config, &mut surface, c));
        assert_eq!(tree.children(a), &[b]);
        assert!(approx_eq!(f32, y_of(&tree, b), 0.0));
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent(), 30.0));
        // The 70px shift is replaced by a 30px one.
        assert!(approx_eq!(f32, y_of(&tree, a), 30.0));
        assert!(!remove(&mut tree, &config, &mut surface, c));
    }

    #[test]
    fn removing_last_child_resets_half_extent() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        let seed = [
            Seed::new("B", vec![Seed::leaf("D"), Seed::leaf("E")]),
            Seed::leaf("C"),
        ];
        add_children(&mut tree, &config, &mut surface, a, &seed);
        let b = tree.children(a)[0];
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent(), 105.0));

        let d = tree.children(b)[0];
        let e = tree.children(b)[1];
        remove(&mut tree, &config, &mut surface, d);
        remove(&mut tree, &config, &mut surface, e);

        assert_eq!(tree.node(b).unwrap().subtree_half_extent(), 0.0);
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent(), 70.0));
        assert!(approx_eq!(f32, y_of(&tree, b), -40.0));
    }

    #[test]
    fn removal_detaches_descendants_first() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = Recorder::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());
        add_children(&mut tree, &config, &mut surface, a, &[Seed::new("B", vec![Seed::leaf("D")])]);
        let b = tree.children(a)[0];
        let d = tree.children(b)[0];

        remove(&mut tree, &config, &mut surface, a);
        assert_eq!(surface.detached, vec![d, b, a]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn rename_ignores_empty_labels() {
        let config = ChartConfig::default();
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let a = create_root(&mut tree, &config, &mut surface, "A".into());

        assert!(!rename(&mut tree, &mut surface, a, ""));
        assert!(rename(&mut tree, &mut surface, a, "Start"));
        assert_eq!(tree.node(a).unwrap().label(), "Start");
    }
}
