#![forbid(unsafe_code)]

//! Parametric ring placement.
//!
//! Maps a cluster and a cell count to points on an oval ring around the
//! cluster center.
//!
//! # Algorithm
//!
//! 1. Semi-axes: `a = reference_radius × scale`, `b = a × aspect`.
//! 2. Points sit at equal angular steps `2π / n`, starting at the top of the
//!    ring and proceeding clockwise (screen y grows downward), rotated by a
//!    per-cluster phase in `[0, step)` derived from the cluster name.
//! 3. On an ellipse, two points `Δ` radians apart are at least
//!    `2 · min(a, b) · sin(Δ / 2)` apart, so the closest pair is an adjacent
//!    pair with distance ≥ `2 · min(a, b) · sin(π / n)`. If that bound is
//!    below `min_separation`, both semi-axes are inflated by the same factor
//!    until it is not.
//!
//! # Invariants
//!
//! - Output length equals `count`.
//! - For one call, every pair of points is at least `min_separation` apart.
//! - Same inputs produce the same points in the same order.
//! - `count == 1` returns the center; `count == 0` returns nothing.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use plotgrid_core::ScreenPoint;

/// Relative headroom applied when inflating a ring, so `f32` rounding of
/// the output cannot push adjacent points under `min_separation`.
const SEPARATION_SLACK: f64 = 1.0 + 1e-4;

/// Ring parameters shared by every cluster in a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParams {
    /// Radius a cluster with `scale == 1.0` gets on its horizontal axis.
    pub reference_radius: f32,
    /// Vertical/horizontal semi-axis ratio.
    pub aspect: f32,
    /// Minimum distance between any two points of one ring.
    pub min_separation: f32,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            reference_radius: 120.0,
            aspect: crate::config::DEFAULT_ASPECT,
            min_separation: crate::config::DEFAULT_TILE_EXTENT,
        }
    }
}

/// Semi-axes actually used for a ring after inflation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

/// Compute the semi-axes for `count` cells.
#[must_use]
pub fn ring_axes(count: usize, scale: f32, params: &RingParams) -> RingAxes {
    let aspect = f64::from(params.aspect.max(f32::EPSILON));
    let mut a = f64::from(params.reference_radius) * f64::from(scale.max(0.0));
    if !a.is_finite() {
        a = 0.0;
    }
    let mut b = a * aspect;

    if count >= 2 {
        let needed = f64::from(params.min_separation.max(0.0)) / (2.0 * (PI / count as f64).sin())
            * SEPARATION_SLACK;
        let minor = a.min(b);
        if minor < needed {
            if minor > 0.0 {
                let factor = needed / minor;
                a *= factor;
                b *= factor;
            } else {
                // Degenerate ring: build it from the aspect alone.
                let unit_minor = aspect.min(1.0);
                a = needed / unit_minor;
                b = a * aspect;
            }
        }
    }

    RingAxes {
        horizontal: a as f32,
        vertical: b as f32,
    }
}

/// Phase offset in `[0, 1)` derived from the cluster name (FNV-1a).
#[must_use]
pub fn cluster_phase(name: &str) -> f64 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let hash = name
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u32::from(b)).wrapping_mul(FNV_PRIME));
    f64::from(hash) / (f64::from(u32::MAX) + 1.0)
}

/// Place `count` cells of `cluster` on a ring around `center`.
#[must_use]
pub fn compute_positions(
    cluster: &str,
    count: usize,
    center: ScreenPoint,
    scale: f32,
    params: &RingParams,
) -> Vec<ScreenPoint> {
    match count {
        0 => return Vec::new(),
        1 => return vec![center],
        _ => {}
    }

    let axes = ring_axes(count, scale, params);
    let (a, b) = (f64::from(axes.horizontal), f64::from(axes.vertical));
    let step = TAU / count as f64;
    let start = -FRAC_PI_2 + cluster_phase(cluster) * step;
    let (cx, cy) = (f64::from(center.x), f64::from(center.y));

    (0..count)
        .map(|i| {
            let theta = start + step * i as f64;
            ScreenPoint::new((cx + a * theta.cos()) as f32, (cy + b * theta.sin()) as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_pair_distance(points: &[ScreenPoint]) -> f32 {
        let mut best = f32::INFINITY;
        for (i, p) in points.iter().enumerate() {
            for q in &points[i + 1..] {
                best = best.min(p.distance(*q));
            }
        }
        best
    }

    #[test]
    fn zero_cells_is_empty() {
        let pts = compute_positions("Alpha", 0, ScreenPoint::ZERO, 1.0, &RingParams::default());
        assert!(pts.is_empty());
    }

    #[test]
    fn single_cell_sits_on_center() {
        let center = ScreenPoint::new(300.0, 200.0);
        let pts = compute_positions("Alpha", 1, center, 1.0, &RingParams::default());
        assert_eq!(pts, vec![center]);
    }

    #[test]
    fn four_cells_are_distinct_and_separated() {
        let params = RingParams::default();
        let pts = compute_positions("Alpha", 4, ScreenPoint::new(400.0, 300.0), 1.0, &params);
        assert_eq!(pts.len(), 4);
        assert!(min_pair_distance(&pts) >= params.min_separation - 1e-3);
    }

    #[test]
    fn crowded_ring_inflates() {
        let params = RingParams {
            reference_radius: 50.0,
            aspect: 0.5,
            min_separation: 48.0,
        };
        let base = ring_axes(2, 1.0, &params);
        let crowded = ring_axes(40, 1.0, &params);
        assert!(crowded.horizontal > base.horizontal);
        assert!((crowded.vertical / crowded.horizontal - 0.5).abs() < 1e-4);

        let pts = compute_positions("Dense", 40, ScreenPoint::ZERO, 1.0, &params);
        assert!(min_pair_distance(&pts) >= params.min_separation - 1e-3);
    }

    #[test]
    fn zero_scale_still_separates() {
        let params = RingParams::default();
        let pts = compute_positions("Tiny", 6, ScreenPoint::ZERO, 0.0, &params);
        assert_eq!(pts.len(), 6);
        assert!(min_pair_distance(&pts) >= params.min_separation - 1e-3);
    }

    #[test]
    fn semi_axes_grow_with_scale() {
        let params = RingParams {
            min_separation: 1.0,
            ..RingParams::default()
        };
        let small = ring_axes(3, 1.0, &params);
        let large = ring_axes(3, 2.0, &params);
        assert!(large.horizontal > small.horizontal);
        assert!(large.vertical > small.vertical);
    }

    #[test]
    fn deterministic() {
        let params = RingParams::default();
        let a = compute_positions("Alpha", 9, ScreenPoint::new(10.0, 20.0), 1.3, &params);
        let b = compute_positions("Alpha", 9, ScreenPoint::new(10.0, 20.0), 1.3, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn phase_depends_on_name_and_stays_in_range() {
        for name in ["Alpha", "Beta", "default", ""] {
            let phase = cluster_phase(name);
            assert!((0.0..1.0).contains(&phase));
        }
        assert_ne!(cluster_phase("Alpha"), cluster_phase("Beta"));
    }
}
