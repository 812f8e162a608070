#![forbid(unsafe_code)]

//! Hit-testing capability.
//!
//! The gesture controller only needs to translate screen points into grid
//! coordinates. It depends on this trait rather than on the layout index so
//! tests and alternative layouts (e.g. a bucketed spatial index) can stand in.

use crate::geometry::{GridCoordinate, ScreenPoint};

/// Something that can resolve screen points to grid coordinates.
pub trait HitTestable {
    /// The coordinate whose tile contains `point`, if any.
    fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate>;

    /// Whether `coord` is part of the current layout.
    fn contains(&self, coord: GridCoordinate) -> bool;
}

impl<T: HitTestable + ?Sized> HitTestable for &T {
    #[inline]
    fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate> {
        (**self).hit_test(point)
    }

    #[inline]
    fn contains(&self, coord: GridCoordinate) -> bool {
        (**self).contains(coord)
    }
}
