#![forbid(unsafe_code)]

//! Committed multi-selection with single-level restore.
//!
//! # Invariants
//!
//! 1. Every mutation emits exactly one [`Notification::SelectionChanged`]
//!    carrying the new count; queries and no-ops emit nothing.
//! 2. Every user mutation (`toggle`, `clear_all`, `apply_batch`) replaces
//!    the retained previous set with the set as it was just before.
//! 3. `restore_previous` consumes the retained set; a second restore in a
//!    row finds nothing and returns `false`.
//! 4. `retain` is layout maintenance, not a user mutation: it filters the
//!    current set, the retained set, and focus alike, so a restore can
//!    never bring back a coordinate the layout no longer has.

use std::collections::BTreeSet;

use plotgrid_core::GridCoordinate;
use tracing::debug;

use crate::notify::{Notification, Notifier};

/// The selected coordinates plus the last single focus.
#[derive(Debug)]
pub struct SelectionState {
    current: BTreeSet<GridCoordinate>,
    previous: Option<BTreeSet<GridCoordinate>>,
    focus: Option<GridCoordinate>,
    notifier: Notifier<Notification>,
}

impl SelectionState {
    /// An empty selection reporting to `notifier`.
    #[must_use]
    pub fn new(notifier: Notifier<Notification>) -> Self {
        Self {
            current: BTreeSet::new(),
            previous: None,
            focus: None,
            notifier,
        }
    }

    /// Flip membership of `coord`. Returns whether it is now selected.
    ///
    /// `coord` also becomes the focus.
    pub fn toggle(&mut self, coord: GridCoordinate) -> bool {
        self.previous = Some(self.current.clone());
        let selected = if self.current.remove(&coord) {
            false
        } else {
            self.current.insert(coord);
            true
        };
        self.focus = Some(coord);
        self.commit("toggle");
        selected
    }

    /// Deselect everything.
    pub fn clear_all(&mut self) {
        self.previous = Some(std::mem::take(&mut self.current));
        self.commit("clear_all");
    }

    /// Swap the retained previous set back in.
    ///
    /// Returns `false` (and emits nothing) when no previous set is retained.
    pub fn restore_previous(&mut self) -> bool {
        let Some(previous) = self.previous.take() else {
            debug!("restore with nothing retained");
            return false;
        };
        self.current = previous;
        self.commit("restore_previous");
        true
    }

    /// Add every coordinate in `coords` in one step.
    ///
    /// Returns how many were newly selected. An empty batch is not a
    /// mutation.
    pub fn apply_batch(&mut self, coords: impl IntoIterator<Item = GridCoordinate>) -> usize {
        let mut coords = coords.into_iter().peekable();
        if coords.peek().is_none() {
            return 0;
        }
        self.previous = Some(self.current.clone());
        let before = self.current.len();
        self.current.extend(coords);
        let added = self.current.len() - before;
        self.commit("apply_batch");
        added
    }

    /// Drop every coordinate for which `keep` returns `false`.
    ///
    /// Returns how many selected coordinates were dropped. Emits only when
    /// that is non-zero.
    pub fn retain(&mut self, mut keep: impl FnMut(GridCoordinate) -> bool) -> usize {
        let before = self.current.len();
        self.current.retain(|c| keep(*c));
        if let Some(previous) = self.previous.as_mut() {
            previous.retain(|c| keep(*c));
        }
        if self.focus.is_some_and(|f| !keep(f)) {
            self.focus = None;
        }
        let dropped = before - self.current.len();
        if dropped > 0 {
            self.commit("retain");
        }
        dropped
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self, coord: GridCoordinate) -> bool {
        self.current.contains(&coord)
    }

    #[inline]
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.current.len()
    }

    /// Selected coordinates in `Ord` order. The iterator is `Clone`, so it
    /// can be restarted without re-borrowing.
    pub fn selected(&self) -> impl Iterator<Item = GridCoordinate> + Clone + '_ {
        self.current.iter().copied()
    }

    /// Owned copy of the selection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<GridCoordinate> {
        self.current.iter().copied().collect()
    }

    /// Last single focus (set by `toggle` or keyboard navigation).
    #[inline]
    #[must_use]
    pub fn focus(&self) -> Option<GridCoordinate> {
        self.focus
    }

    /// Move focus without touching the selection.
    pub fn set_focus(&mut self, focus: Option<GridCoordinate>) {
        self.focus = focus;
    }

    /// Whether `restore_previous` would do anything.
    #[inline]
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    fn commit(&self, op: &'static str) {
        let count = self.current.len();
        debug!(op, count, "selection changed");
        self.notifier.emit(Notification::SelectionChanged { count });
    }
}
