#![forbid(unsafe_code)]

//! Spatial navigation: arrow-key focus movement between laid-out cells.
//!
//! # Algorithm
//!
//! 1. Filter candidates to the half-plane in the requested direction.
//! 2. Score each candidate: `10 × primary + 3 × orthogonal` distance.
//! 3. Return the candidate with the lowest score; ties go to the earliest
//!    entry in snapshot order.
//!
//! # Invariants
//!
//! - If no candidate exists in the direction, `None` is returned.
//! - Deterministic: same snapshot → same navigation path.

use plotgrid_core::{GridCoordinate, ScreenPoint};

use crate::index::LayoutSnapshot;

/// Direction for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Find the best target from `origin` in `dir`.
#[must_use]
pub fn navigate(
    snapshot: &LayoutSnapshot,
    origin: GridCoordinate,
    dir: NavDirection,
) -> Option<GridCoordinate> {
    let from = snapshot.position_of(origin)?;
    let mut best: Option<(GridCoordinate, f32)> = None;

    for entry in snapshot.entries() {
        if entry.coord == origin || !in_direction(from, entry.position, dir) {
            continue;
        }
        let score = distance_score(from, entry.position, dir);
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((entry.coord, score));
        }
    }

    best.map(|(coord, _)| coord)
}

fn in_direction(origin: ScreenPoint, candidate: ScreenPoint, dir: NavDirection) -> bool {
    match dir {
        NavDirection::Up => candidate.y < origin.y,
        NavDirection::Down => candidate.y > origin.y,
        NavDirection::Left => candidate.x < origin.x,
        NavDirection::Right => candidate.x > origin.x,
    }
}

/// `primary + 0.3 × ortho`, scaled by 10.
fn distance_score(origin: ScreenPoint, candidate: ScreenPoint, dir: NavDirection) -> f32 {
    let (primary, ortho) = match dir {
        NavDirection::Up => (origin.y - candidate.y, (origin.x - candidate.x).abs()),
        NavDirection::Down => (candidate.y - origin.y, (origin.x - candidate.x).abs()),
        NavDirection::Left => (origin.x - candidate.x, (origin.y - candidate.y).abs()),
        NavDirection::Right => (candidate.x - origin.x, (origin.y - candidate.y).abs()),
    };
    10.0 * primary + 3.0 * ortho
}
