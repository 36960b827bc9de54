//! Add/remove controls overlaid on every node box.

use crate::geometry::{Point, Size};

/// Radius of a control glyph's circle.
pub const CONTROL_RADIUS: f32 = 12.0;

/// Half length of the strokes drawn inside a control.
const GLYPH_ARM: f32 = 6.0;

/// Message shown when asking for a node label.
pub const LABEL_PROMPT: &str = "Please enter a label";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlStyle {
    #[default]
    Idle,
    Hover,
}

impl ControlKind {
    pub const ALL: [ControlKind; 2] = [ControlKind::Add, ControlKind::Remove];

    /// Center of the control in the owning node's frame.
    pub fn center(self, node_size: Size) -> Point {
        match self {
            ControlKind::Add => Point::new(node_size.width - 36.0, 2.0),
            ControlKind::Remove => Point::new(node_size.width - 10.0, 2.0),
        }
    }

    /// Whether `local` (in the owning node's frame) lies on the control.
    pub fn hit(self, node_size: Size, local: Point) -> bool {
        let delta = local - self.center(node_size);
        delta.x * delta.x + delta.y * delta.y <= CONTROL_RADIUS * CONTROL_RADIUS
    }

    /// Glyph strokes relative to the control center: a plus or a cross.
    pub fn glyph(self) -> [(Point, Point); 2] {
        let a = GLYPH_ARM;
        match self {
            ControlKind::Add => [
                (Point::new(0.0, a), Point::new(0.0, -a)),
                (Point::new(a, 0.0), Point::new(-a, 0.0)),
            ],
            ControlKind::Remove => [
                (Point::new(-a, a), Point::new(a, -a)),
                (Point::new(-a, -a), Point::new(a, a)),
            ],
        }
    }
}
