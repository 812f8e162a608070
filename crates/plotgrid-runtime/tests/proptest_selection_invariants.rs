//! Property tests for selection and drag commitment.
//!
//! Invariants:
//! - Toggling a coordinate twice leaves the selection as it was.
//! - `restore_previous` after any single mutation yields the pre-mutation set.
//! - Every mutation emits exactly one notification carrying the new count.
//! - A drag touching one cell is a toggle; touching two or more adds them
//!   all and arms click suppression.
//! - The platform tap trailing a release never changes the selection again.

use std::collections::BTreeSet;

use plotgrid_core::{GridCoordinate, HitTestable, ScreenPoint};
use plotgrid_runtime::{DragGestureController, Notification, Notifier, SelectionState};
use proptest::prelude::*;

/// Unit cells on a 16×16 lattice: cell `(x, y)` covers `[x, x+1) × [y, y+1)`.
struct Lattice;

impl HitTestable for Lattice {
    fn hit_test(&self, p: ScreenPoint) -> Option<GridCoordinate> {
        let inside = (0.0..16.0).contains(&p.x) && (0.0..16.0).contains(&p.y);
        inside.then(|| GridCoordinate::new(p.x as i32, p.y as i32))
    }

    fn contains(&self, c: GridCoordinate) -> bool {
        (0..16).contains(&c.x) && (0..16).contains(&c.y)
    }
}

fn center(c: GridCoordinate) -> ScreenPoint {
    ScreenPoint::new(c.x as f32 + 0.5, c.y as f32 + 0.5)
}

fn coord() -> impl Strategy<Value = GridCoordinate> {
    (0i32..16, 0i32..16).prop_map(|(x, y)| GridCoordinate::new(x, y))
}

fn seeded(initial: &[GridCoordinate]) -> SelectionState {
    let mut sel = SelectionState::new(Notifier::new());
    sel.apply_batch(initial.iter().copied());
    sel
}

#[derive(Debug, Clone)]
enum Op {
    Toggle(GridCoordinate),
    Clear,
    Batch(Vec<GridCoordinate>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        coord().prop_map(Op::Toggle),
        Just(Op::Clear),
        prop::collection::vec(coord(), 1..8).prop_map(Op::Batch),
    ]
}

proptest! {
    #[test]
    fn double_toggle_is_identity(
        initial in prop::collection::vec(coord(), 0..20),
        target in coord(),
    ) {
        let mut sel = seeded(&initial);
        let before = sel.snapshot();
        sel.toggle(target);
        sel.toggle(target);
        prop_assert_eq!(sel.snapshot(), before);
    }

    #[test]
    fn restore_undoes_one_mutation(
        initial in prop::collection::vec(coord(), 0..20),
        op in op(),
    ) {
        let mut sel = seeded(&initial);
        let before = sel.snapshot();
        match op {
            Op::Toggle(c) => { sel.toggle(c); }
            Op::Clear => sel.clear_all(),
            Op::Batch(cs) => { sel.apply_batch(cs); }
        }
        prop_assert!(sel.restore_previous());
        prop_assert_eq!(sel.snapshot(), before);
        prop_assert!(!sel.restore_previous());
    }

    #[test]
    fn one_notification_per_mutation(ops in prop::collection::vec(op(), 1..12)) {
        let notifier = Notifier::new();
        let rec = notifier.recorder();
        let mut sel = SelectionState::new(notifier);
        for op in &ops {
            match op {
                Op::Toggle(c) => { sel.toggle(*c); }
                Op::Clear => sel.clear_all(),
                Op::Batch(cs) => { sel.apply_batch(cs.iter().copied()); }
            }
        }
        let events = rec.take();
        prop_assert_eq!(events.len(), ops.len());
        prop_assert_eq!(
            events.last(),
            Some(&Notification::SelectionChanged { count: sel.selected_count() })
        );
    }

    #[test]
    fn drag_commit_matches_touched_set(
        initial in prop::collection::vec(coord(), 0..10),
        path in prop::collection::vec(coord(), 1..12),
    ) {
        let mut sel = seeded(&initial);
        let before: BTreeSet<_> = sel.selected().collect();
        let mut gesture = DragGestureController::new();

        gesture.on_press(center(path[0]), &Lattice);
        for c in &path[1..] {
            gesture.on_move(center(*c), &Lattice).expect("dragging");
        }
        let touched: BTreeSet<_> = path.iter().copied().collect();
        gesture.on_release(&mut sel).expect("dragging");
        let after: BTreeSet<_> = sel.selected().collect();

        if touched.len() == 1 {
            let mut expected = before.clone();
            if !expected.remove(&path[0]) {
                expected.insert(path[0]);
            }
            prop_assert_eq!(&after, &expected);
            prop_assert!(!gesture.suppress_armed());
        } else {
            let expected: BTreeSet<_> = before.union(&touched).copied().collect();
            prop_assert_eq!(&after, &expected);
            prop_assert!(gesture.suppress_armed());
        }

        let release_point = center(path[path.len() - 1]);
        gesture.on_tap(release_point, &Lattice, &mut sel);
        let after_tap: BTreeSet<_> = sel.selected().collect();
        prop_assert_eq!(after_tap, after);
    }
}
