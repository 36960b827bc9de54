//! Relocation: vertical stacking of a node's children around its center.
//!
//! Positions are relative to the parent frame, so moving a node carries its
//! whole subtree along. Every placement refreshes the connectors of the
//! placed node and of all its descendants.

use log::{debug, trace};

use crate::config::ChartConfig;
use crate::geometry::{Anchor, Point};
use crate::surface::Surface;
use crate::tree::{Node, NodeId, Tree};

/// Height a child occupies in its parent's stack: its laid-out subtree when it
/// has one, otherwise the plain node height.
pub fn contribution(node: &Node, config: &ChartConfig) -> f32 {
    if node.subtree_half_extent > 0.0 {
        node.subtree_half_extent * 2.0
    } else {
        config.height
    }
}

/// Places `id` and refreshes the connectors below it. Clears any shift
/// remembered from the node's own relocation.
pub fn set_position<S: Surface + ?Sized>(
    tree: &mut Tree,
    surface: &mut S,
    id: NodeId,
    anchor: Anchor,
    x: f32,
    y: f32,
) -> bool {
    let Some(node) = tree.node_mut(id) else {
        return false;
    };
    let position = anchor.resolve(node.size, x, y);
    node.position = position;
    node.relocation_shift = 0.0;
    trace!(node:% = id, x = position.x, y = position.y; "Placed node");
    surface.move_node(id, position);
    refresh_connectors(tree, surface, id);
    true
}

/// Reroutes the connector of `id` and of every descendant.
pub fn refresh_connectors<S: Surface + ?Sized>(tree: &mut Tree, surface: &mut S, id: NodeId) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let Some(node) = tree.node_mut(current) else {
            continue;
        };
        let position = node.position;
        if let Some(connector) = node.connector.as_mut() {
            connector.route(position);
            surface.draw_connector(current, connector);
        }
        stack.extend(node.children.iter().rev().copied());
    }
}

/// Restacks the children of `id`, caches its subtree half-extent and shifts
/// it down by that amount. With `propagate`, repeats on every ancestor.
///
/// Returns `false` without touching anything when `id` has no children.
pub fn relocate<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    id: NodeId,
    propagate: bool,
) -> bool {
    let mut current = id;
    loop {
        let Some(node) = tree.node(current) else {
            return current != id;
        };
        if node.children.is_empty() {
            return current != id;
        }
        let parent = node.parent;
        let origin = node.position;
        let previous_shift = node.relocation_shift;

        let slots: Vec<(NodeId, f32, f32, f32)> = node
            .children
            .iter()
            .filter_map(|&child| {
                let c = tree.node(child)?;
                Some((child, c.position.x, c.subtree_half_extent, contribution(c, config)))
            })
            .collect();

        let gaps = config.distance_y * (slots.len() as f32 - 1.0);
        let combined: f32 = slots.iter().map(|&(_, _, _, extent)| extent).sum::<f32>() + gaps;
        let half_extent = combined / 2.0;

        let mut cursor = 0.0;
        for &(child, x, child_half, extent) in &slots {
            let offset = if child_half > 0.0 {
                child_half
            } else {
                config.height / 2.0
            };
            let y = cursor - half_extent + offset;
            cursor += extent + config.distance_y;
            set_position(tree, surface, child, Anchor::TopLeft, x, y);
        }

        let target = Point::new(origin.x, origin.y - previous_shift + half_extent);
        set_position(tree, surface, current, Anchor::TopLeft, target.x, target.y);
        if let Some(node) = tree.node_mut(current) {
            node.subtree_half_extent = half_extent;
            node.relocation_shift = half_extent;
        }
        debug!(node:% = current, children = slots.len(), half_extent; "Relocated children");

        match parent {
            Some(parent) if propagate => current = parent,
            _ => return true,
        }
    }
}

/// Centers `id` vertically on the canvas, keeping its x.
pub fn recenter_vertically<S: Surface + ?Sized>(
    tree: &mut Tree,
    config: &ChartConfig,
    surface: &mut S,
    id: NodeId,
) -> bool {
    let Some(node) = tree.node(id) else {
        return false;
    };
    let x = node.position.x;
    let y = surface.canvas_size().height / 2.0 - config.height / 2.0;
    set_position(tree, surface, id, Anchor::TopLeft, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{add_child, add_children};
    use crate::seed::Seed;
    use crate::surface::NullSurface;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    fn seeded(config: &ChartConfig, seed: &Seed) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let mut surface = NullSurface::default();
        let root = tree.reset_root(seed.label.clone(), config.node_size());
        add_children(&mut tree, config, &mut surface, root, &seed.children);
        (tree, root)
    }

    fn center_y(tree: &Tree, id: NodeId) -> f32 {
        let node = tree.node(id).unwrap();
        node.position.y + node.size.height / 2.0
    }

    fn snapshot(tree: &Tree) -> Vec<(NodeId, Point, f32)> {
        tree.iter()
            .map(|(id, node)| (id, node.position, node.subtree_half_extent))
            .collect()
    }

    #[test]
    fn two_leaves_stack_around_parent_center() {
        let config = ChartConfig::default();
        let seed = Seed::new("A", vec![Seed::leaf("B"), Seed::leaf("C")]);
        let (tree, a) = seeded(&config, &seed);
        let [b, c] = tree.children(a) else {
            panic!("expected two children");
        };
        let (b, c) = (*b, *c);

        assert_eq!(tree.node(b).unwrap().position, Point::new(250.0, -40.0));
        assert_eq!(tree.node(c).unwrap().position, Point::new(250.0, 40.0));
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent, 70.0));
        // A shifted down from its initial y of 0.
        assert!(approx_eq!(f32, tree.node(a).unwrap().position.y, 70.0));
        // Gap between the two boxes equals distance_y.
        let gap = tree.node(c).unwrap().position.y - (tree.node(b).unwrap().position.y + 60.0);
        assert!(approx_eq!(f32, gap, config.distance_y));
        // Children balanced around the parent's own center (local y = 30).
        assert!(approx_eq!(f32, (center_y(&tree, b) + center_y(&tree, c)) / 2.0, 30.0));
    }

    #[test]
    fn childless_node_is_a_no_op() {
        let config = ChartConfig::default();
        let (mut tree, a) = seeded(&config, &Seed::leaf("A"));
        let mut surface = NullSurface::default();

        assert!(!relocate(&mut tree, &config, &mut surface, a, true));
        let node = tree.node(a).unwrap();
        assert_eq!(node.position, Point::ORIGIN);
        assert_eq!(node.subtree_half_extent, 0.0);
    }

    #[test]
    fn leaf_gaining_first_child_switches_to_measured_height() {
        let config = ChartConfig {
            distance_y: 10.0,
            ..ChartConfig::default()
        };
        let seed = Seed::new("A", vec![Seed::leaf("B"), Seed::leaf("C")]);
        let (mut tree, a) = seeded(&config, &seed);
        let mut surface = NullSurface::default();
        let b = tree.children(a)[0];
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent, 65.0));

        // One grandchild: B's measured extent equals the default height, so
        // the spacing only changes once B holds two children.
        add_child(&mut tree, &config, &mut surface, b, "D".into(), &[]);
        relocate(&mut tree, &config, &mut surface, b, true);
        assert!(approx_eq!(f32, tree.node(b).unwrap().subtree_half_extent, 30.0));
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent, 65.0));

        add_child(&mut tree, &config, &mut surface, b, "E".into(), &[]);
        relocate(&mut tree, &config, &mut surface, b, true);
        assert!(approx_eq!(f32, tree.node(b).unwrap().subtree_half_extent, 65.0));
        assert!(approx_eq!(f32, tree.node(a).unwrap().subtree_half_extent, 100.0));
    }

    #[test]
    fn set_position_center_anchor_and_connector_refresh() {
        let config = ChartConfig::default();
        let seed = Seed::new("A", vec![Seed::new("B", vec![Seed::leaf("D")])]);
        let (mut tree, a) = seeded(&config, &seed);
        let mut surface = NullSurface::default();
        let b = tree.children(a)[0];
        let d = tree.children(b)[0];

        set_position(&mut tree, &mut surface, b, Anchor::Center, 350.0, 100.0);
        let node_b = tree.node(b).unwrap();
        assert_eq!(node_b.position, Point::new(250.0, 70.0));
        let connector = node_b.connector.unwrap();
        assert_eq!(connector.start(), Point::new(-50.0, -40.0));
        assert_eq!(connector.end(), Point::new(0.0, 30.0));
        // D's connector lives in B's frame and is unaffected by B moving.
        assert_eq!(tree.node(d).unwrap().connector.unwrap().end(), Point::new(0.0, 30.0));
    }

    #[test]
    fn recenter_uses_canvas_height() {
        let config = ChartConfig::default();
        let (mut tree, a) = seeded(&config, &Seed::leaf("A"));
        let mut surface = NullSurface::new(crate::geometry::Size::new(800.0, 500.0));
        tree.node_mut(a).unwrap().position = Point::new(100.0, 3.0);

        assert!(recenter_vertically(&mut tree, &config, &mut surface, a));
        assert_eq!(tree.node(a).unwrap().position, Point::new(100.0, 220.0));
    }

    // ===================
    // Property checks
    // ===================

    fn seed_strategy() -> impl Strategy<Value = Seed> {
        let leaf = "[a-z]{1,5}".prop_map(Seed::leaf);
        leaf.prop_recursive(4, 40, 4, |inner| {
            ("[a-z]{1,5}", prop::collection::vec(inner, 0..4))
                .prop_map(|(label, children)| Seed::new(label, children))
        })
    }

    fn check_spacing(tree: &Tree, config: &ChartConfig) -> Result<(), TestCaseError> {
        for (_, node) in tree.iter() {
            for pair in node.children.windows(2) {
                let upper = tree.node(pair[0]).unwrap();
                let lower = tree.node(pair[1]).unwrap();
                let expected = config.distance_y
                    + (contribution(upper, config) + contribution(lower, config)) / 2.0;
                let actual = center_y(tree, pair[1]) - center_y(tree, pair[0]);
                prop_assert!(
                    approx_eq!(f32, actual, expected, epsilon = 0.01),
                    "sibling centers {actual} apart, expected {expected}"
                );
            }
        }
        Ok(())
    }

    fn check_balance(tree: &Tree, config: &ChartConfig) -> Result<(), TestCaseError> {
        for (_, node) in tree.iter() {
            let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) else {
                continue;
            };
            let top = center_y(tree, first) - contribution(tree.node(first).unwrap(), config) / 2.0;
            let bottom = center_y(tree, last) + contribution(tree.node(last).unwrap(), config) / 2.0;
            prop_assert!(approx_eq!(f32, (top + bottom) / 2.0, node.anchor_y(), epsilon = 0.01));
            prop_assert!(approx_eq!(f32, (bottom - top) / 2.0, node.subtree_half_extent, epsilon = 0.01));
        }
        Ok(())
    }

    fn check_idempotent(seed: &Seed) -> Result<(), TestCaseError> {
        let config = ChartConfig::default();
        let (mut tree, root) = seeded(&config, seed);
        let mut surface = NullSurface::default();

        relocate(&mut tree, &config, &mut surface, root, false);
        let first = snapshot(&tree);
        relocate(&mut tree, &config, &mut surface, root, false);
        prop_assert_eq!(first, snapshot(&tree));
        Ok(())
    }

    proptest! {
        #[test]
        fn siblings_are_spaced_by_contribution(seed in seed_strategy()) {
            let config = ChartConfig::default();
            let (tree, _) = seeded(&config, &seed);
            check_spacing(&tree, &config)?;
        }

        #[test]
        fn children_are_balanced_around_parent(seed in seed_strategy()) {
            let config = ChartConfig::default();
            let (tree, _) = seeded(&config, &seed);
            check_balance(&tree, &config)?;
        }

        #[test]
        fn relocation_is_idempotent(seed in seed_strategy()) {
            check_idempotent(&seed)?;
        }
    }
}
