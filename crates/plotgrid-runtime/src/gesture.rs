#![forbid(unsafe_code)]

//! Drag-to-select gesture state machine.
//!
//! # State machine
//!
//! ```text
//!   Idle ──press on cell──▶ Dragging(session)
//!     ▲                        │  move over new cell → touched += cell
//!     │                        │  press on cell      → restart session
//!     └──release / cancel──────┘
//! ```
//!
//! On release the touched list is committed to [`SelectionState`]: a single
//! touched cell toggles, two or more are added as one batch.
//!
//! Platforms follow a press/release pair with a click. Every committed
//! release guards against that trailing tap so the gesture is applied once:
//!
//! - after a batch, the next tap is swallowed wherever it lands;
//! - after a single-cell release, the next tap is swallowed only if it hits
//!   the released cell. A tap elsewhere, or a new press, drops the guard.
//!
//! A tap with no press/release before it (touch-only input) toggles.
//!
//! # Invariants
//!
//! 1. `touched` starts with the origin and never holds a duplicate.
//! 2. Nothing reaches `SelectionState` before release; `cancel` never
//!    partially applies a session.
//! 3. A guard swallows at most one tap; the post-batch guard swallows it
//!    however late it arrives.

use plotgrid_core::{GridCoordinate, GridError, HitTestable, ScreenPoint};
use tracing::{debug, trace};

use crate::selection::SelectionState;

/// One live drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    origin: GridCoordinate,
    touched: Vec<GridCoordinate>,
}

impl DragSession {
    fn start(origin: GridCoordinate) -> Self {
        Self {
            origin,
            touched: vec![origin],
        }
    }

    /// The coordinate the press landed on.
    #[must_use]
    pub fn origin(&self) -> GridCoordinate {
        self.origin
    }

    /// Coordinates touched so far, origin first, in touch order.
    #[must_use]
    pub fn touched(&self) -> &[GridCoordinate] {
        &self.touched
    }

    /// Whether `coord` has been touched in this session.
    #[must_use]
    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.touched.contains(&coord)
    }

    fn touch(&mut self, coord: GridCoordinate) -> bool {
        if self.contains(coord) {
            return false;
        }
        self.touched.push(coord);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
        }
    }
}

/// What a gesture step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A press on a cell opened a session.
    Started(GridCoordinate),
    /// A press during a live drag discarded it and opened a new one.
    Restarted(GridCoordinate),
    /// The drag reached a cell it had not touched yet.
    Touched(GridCoordinate),
    /// The drag moved without touching anything new.
    Unchanged,
    /// A single-cell release or a tap toggled `coord`.
    Toggled { coord: GridCoordinate, selected: bool },
    /// A multi-cell release added `touched` cells, `added` of them new.
    BatchApplied { touched: usize, added: usize },
    /// A tap trailing a committed release was swallowed.
    Suppressed,
    /// A live session was discarded.
    Cancelled,
    /// The press or tap hit no cell.
    Missed,
}

impl GestureOutcome {
    /// Whether the gesture layer claimed the event.
    #[must_use]
    pub const fn consumed(&self) -> bool {
        !matches!(self, Self::Missed)
    }
}

/// Which trailing tap, if any, belongs to the gesture just released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum TapGuard {
    #[default]
    Open,
    AfterBatch,
    AfterClick(GridCoordinate),
}

/// Turns press/move/release/tap into selection mutations.
#[derive(Debug, Default)]
pub struct DragGestureController {
    state: DragState,
    guard: TapGuard,
}

impl DragGestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Press at `point`. Opens (or restarts) a session when it hits a cell.
    pub fn on_press<H>(&mut self, point: ScreenPoint, hits: &H) -> GestureOutcome
    where
        H: HitTestable + ?Sized,
    {
        let was_dragging = self.is_dragging();
        if matches!(self.guard, TapGuard::AfterClick(_)) {
            self.guard = TapGuard::Open;
        }
        let Some(coord) = hits.hit_test(point) else {
            if was_dragging {
                debug!("press off-grid discarded live drag");
                self.state = DragState::Idle;
            }
            return GestureOutcome::Missed;
        };
        self.state = DragState::Dragging(DragSession::start(coord));
        if was_dragging {
            debug!(%coord, "drag restarted");
            GestureOutcome::Restarted(coord)
        } else {
            trace!(%coord, "drag started");
            GestureOutcome::Started(coord)
        }
    }

    /// Move to `point` during a drag.
    pub fn on_move<H>(&mut self, point: ScreenPoint, hits: &H) -> Result<GestureOutcome, GridError>
    where
        H: HitTestable + ?Sized,
    {
        let DragState::Dragging(session) = &mut self.state else {
            return Err(self.invalid("move"));
        };
        match hits.hit_test(point) {
            Some(coord) if session.touch(coord) => Ok(GestureOutcome::Touched(coord)),
            _ => Ok(GestureOutcome::Unchanged),
        }
    }

    /// End the drag and commit it to `selection`.
    pub fn on_release(&mut self, selection: &mut SelectionState) -> Result<GestureOutcome, GridError> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return Err(self.invalid("release"));
        };
        if session.touched.len() <= 1 {
            let selected = selection.toggle(session.origin);
            self.guard = TapGuard::AfterClick(session.origin);
            return Ok(GestureOutcome::Toggled {
                coord: session.origin,
                selected,
            });
        }
        let touched = session.touched.len();
        let added = selection.apply_batch(session.touched);
        self.guard = TapGuard::AfterBatch;
        debug!(touched, added, "drag committed");
        Ok(GestureOutcome::BatchApplied { touched, added })
    }

    /// A platform click or touch tap at `point`.
    pub fn on_tap<H>(
        &mut self,
        point: ScreenPoint,
        hits: &H,
        selection: &mut SelectionState,
    ) -> GestureOutcome
    where
        H: HitTestable + ?Sized,
    {
        let guard = std::mem::take(&mut self.guard);
        if guard == TapGuard::AfterBatch {
            trace!("post-drag click suppressed");
            return GestureOutcome::Suppressed;
        }
        match hits.hit_test(point) {
            Some(coord) if guard == TapGuard::AfterClick(coord) => {
                trace!(%coord, "click already applied on release");
                GestureOutcome::Suppressed
            }
            Some(coord) => {
                let selected = selection.toggle(coord);
                GestureOutcome::Toggled { coord, selected }
            }
            None => GestureOutcome::Missed,
        }
    }

    /// Discard the live session, if any. The selection is not touched.
    pub fn cancel(&mut self) -> Option<GestureOutcome> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging(session) => {
                debug!(touched = session.touched.len(), "drag cancelled");
                Some(GestureOutcome::Cancelled)
            }
        }
    }

    /// The live session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Whether `coord` is touched by the live drag.
    #[must_use]
    pub fn is_provisional(&self, coord: GridCoordinate) -> bool {
        self.session().is_some_and(|s| s.contains(coord))
    }

    /// Whether the next tap will be swallowed wherever it lands.
    #[inline]
    #[must_use]
    pub fn suppress_armed(&self) -> bool {
        self.guard == TapGuard::AfterBatch
    }

    /// The cell whose trailing tap will be swallowed after a single-cell
    /// release.
    #[inline]
    #[must_use]
    pub fn click_guard(&self) -> Option<GridCoordinate> {
        match self.guard {
            TapGuard::AfterClick(coord) => Some(coord),
            _ => None,
        }
    }

    fn invalid(&self, event: &'static str) -> GridError {
        let err = GridError::InvalidGestureTransition {
            event,
            state: self.state.label(),
        };
        trace!(kind = err.error_type(), %err, "gesture input dropped");
        err
    }
}
