//! Parent/child joint geometry.
//!
//! A joint pins one anchor on the parent's right edge and one on the child's
//! left edge, both at half the *parent's* height. The connecting line is an
//! orthogonal elbow drawn in the child's local frame, so it only needs the
//! child's position relative to its parent to be rerouted.

use crate::geometry::{Point, Size};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connector {
    /// Anchor on the parent's right edge, in the parent's frame.
    parent_anchor: Point,
    /// Anchor on the child's left edge, in the child's frame.
    child_anchor: Point,
    /// Elbow path in the child's frame: start, two bends, end.
    path: [Point; 4],
}

impl Connector {
    /// Establishes the joint anchors for a child of a parent of `parent_size`.
    /// The path stays collapsed on the child anchor until the first `route`.
    pub fn joint(parent_size: Size) -> Self {
        let mid = parent_size.height / 2.0;
        let child_anchor = Point::new(0.0, mid);
        Self {
            parent_anchor: Point::new(parent_size.width, mid),
            child_anchor,
            path: [child_anchor; 4],
        }
    }

    /// Recomputes the elbow for a child box currently at `child_position`
    /// (relative to the parent).
    pub fn route(&mut self, child_position: Point) {
        let start = self.parent_anchor - child_position;
        let end = self.child_anchor;
        let mid_x = start.x + (end.x - start.x) / 2.0;
        self.path = [
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        ];
    }

    pub fn parent_anchor(&self) -> Point {
        self.parent_anchor
    }

    pub fn child_anchor(&self) -> Point {
        self.child_anchor
    }

    pub fn path(&self) -> &[Point; 4] {
        &self.path
    }

    pub fn start(&self) -> Point {
        self.path[0]
    }

    pub fn end(&self) -> Point {
        self.path[3]
    }
}
