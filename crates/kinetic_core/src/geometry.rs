//! Geometry primitives
//!
//! All bounds are expressed in document coordinates: they do not move when the
//! page scrolls. The scroll offset is tracked separately by the host.

use serde::{Deserialize, Serialize};

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 2D size (used for the viewport)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Layout bounds of an element in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Distance from the top of the document
    pub top: f32,
    /// Distance from the left of the document
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// True when the element has no layout area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Half-open containment test (right and bottom edges are outside)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Leading edge and extent along a scroll axis
    pub fn span(&self, axis: ScrollAxis) -> (f32, f32) {
        match axis {
            ScrollAxis::Vertical => (self.top, self.height),
            ScrollAxis::Horizontal => (self.left, self.width),
        }
    }
}

/// The axis along which the document scrolls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    /// Extent of the viewport along this axis
    pub fn extent(&self, viewport: Size) -> f32 {
        match self {
            ScrollAxis::Vertical => viewport.height,
            ScrollAxis::Horizontal => viewport.width,
        }
    }
}
