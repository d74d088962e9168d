//! Annotation geometry.
//!
//! This module provides the core value types shared by every other module:
//! - Points and typed rectangles
//! - The rectangle kind drawn by each draw mode
//!
//! Rectangles carry no coordinate frame of their own. Whether a value is in
//! image space or view space is decided by whoever holds it; see
//! [`crate::transform`] for the conversions.

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The kind of region a rectangle marks.
///
/// Each draw mode produces one kind. The numeric code is what gets written
/// to save files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RectKind {
    #[default]
    Primary,
    Secondary,
}

impl RectKind {
    /// Numeric code used in save files.
    pub fn code(self) -> u8 {
        match self {
            RectKind::Primary => 0,
            RectKind::Secondary => 1,
        }
    }

    /// Inverse of [`RectKind::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RectKind::Primary),
            1 => Some(RectKind::Secondary),
            _ => None,
        }
    }

    /// Display name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            RectKind::Primary => "Primary",
            RectKind::Secondary => "Secondary",
        }
    }
}

/// An axis-aligned, typed rectangle.
///
/// Width and height are never negative; use [`Rect::from_corners`] when the
/// two corners may come in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
    /// Region kind
    pub kind: RectKind,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: RectKind) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
        }
    }

    /// Create a rectangle spanning two corner points.
    pub fn from_corners(p1: Point, p2: Point, kind: RectKind) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self::new(x, y, width, height, kind)
    }

    /// Check if a point lies inside the rectangle.
    ///
    /// The test is half-open: the left and top edges are inside, the right
    /// and bottom edges are not. An empty rectangle contains nothing.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Get the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Get the top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let r = Rect::from_corners(
            Point::new(50.0, 10.0),
            Point::new(20.0, 40.0),
            RectKind::Secondary,
        );
        assert_eq!(r, Rect::new(20.0, 10.0, 30.0, 30.0, RectKind::Secondary));
        assert_eq!(r.bottom_right(), Point::new(50.0, 40.0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0, RectKind::Primary);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 29.9)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(15.0, 30.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        let r = Rect::new(5.0, 5.0, 0.0, 10.0, RectKind::Primary);
        assert!(!r.contains(Point::new(5.0, 6.0)));
    }

    #[test]
    fn test_kind_codes() {
        for kind in [RectKind::Primary, RectKind::Secondary] {
            assert_eq!(RectKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(RectKind::from_code(7), None);
        assert_eq!(RectKind::default(), RectKind::Primary);
    }
}
