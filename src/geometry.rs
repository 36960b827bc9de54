//! Points, sizes and the anchor modes used when placing a node.
//!
//! Coordinates follow the surface convention: origin at the top-left, x grows
//! rightward, y grows downward.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether `point`, given relative to the box's top-left, falls inside it.
    pub fn contains(self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Which point of the node box a `set_position` call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    Center,
}

impl Anchor {
    /// Maps the textual placement modes (`"left"`, `"center"`).
    /// Anything unrecognised places by the top-left corner.
    pub fn from_mode(mode: &str) -> Self {
        match mode {
            "center" => Anchor::Center,
            _ => Anchor::TopLeft,
        }
    }

    /// Top-left corner of a box of `size` placed at `(x, y)` under this anchor.
    pub fn resolve(self, size: Size, x: f32, y: f32) -> Point {
        match self {
            Anchor::TopLeft => Point::new(x, y),
            Anchor::Center => Point::new(x - size.width / 2.0, y - size.height / 2.0),
        }
    }
}
