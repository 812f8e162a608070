#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Grid coordinates are logical and integer; screen points are `f32` and
//! live in the current viewport's coordinate space (origin top-left, y down).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A logical cell ("plot") identifier.
///
/// Ordered by `(x, y)`. This order is the stable order the layout engine uses
/// when zipping coordinates against ring positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[inline]
    #[must_use]
    pub fn offset(self, other: ScreenPoint) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Euclidean distance.
    #[inline]
    #[must_use]
    pub fn distance(self, other: ScreenPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared euclidean distance (no sqrt, for comparisons).
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: ScreenPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for ScreenPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero or negative (or non-finite) in either dimension.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Center of a viewport of this size.
    #[inline]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width * 0.5, self.height * 0.5)
    }

    /// The shorter side.
    #[inline]
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Axis-aligned square around a tile center, used for hit testing.
///
/// Containment is half-open: left/top inclusive, right/bottom exclusive, so
/// two tiles that exactly abut never both claim the shared edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl TileBounds {
    /// Bounds of a tile of side `extent` centered on `center`.
    #[inline]
    pub fn around(center: ScreenPoint, extent: f32) -> Self {
        let half = extent * 0.5;
        Self {
            left: center.x - half,
            top: center.y - half,
            right: center.x + half,
            bottom: center.y + half,
        }
    }

    /// Check if a point is inside the bounds.
    #[inline]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Center of the bounds.
    #[inline]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }
}
