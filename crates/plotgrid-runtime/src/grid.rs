#![forbid(unsafe_code)]

//! The grid consumer: the router's default layer.
//!
//! [`GridSurface`] owns the position index, the selection, the drag
//! controller, and the key map, and turns routed events into selection
//! changes. It is the only component that mutates the selection in
//! response to input.
//!
//! # Event handling
//!
//! | Event                       | Effect                                   |
//! |-----------------------------|------------------------------------------|
//! | pointer press/move/release  | drag gesture                             |
//! | pointer tap                 | toggle, unless it trails a release       |
//! | synthetic-from-touch pointer| dropped when configured                  |
//! | key                         | [`KeyMap`] action                        |
//! | resize                      | viewport change, rebuild, prune          |
//! | focus lost                  | cancel the live drag                     |

use std::sync::Arc;

use plotgrid_core::event::{DeviceOrigin, InputEvent, KeyEvent, PointerEvent, PointerKind};
use plotgrid_core::{GridCoordinate, GridError, ScreenPoint, Size};
use plotgrid_layout::{GridPositionIndex, LayoutConfig, LayoutSnapshot, navigate};
use tracing::{debug, trace};

use crate::config::{GridConfig, RuntimeConfig};
use crate::gesture::DragGestureController;
use crate::keymap::{GridAction, KeyMap};
use crate::notify::{Notification, Notifier};
use crate::router::{Handled, InputSurface, SurfaceId};
use crate::selection::SelectionState;

/// Id the grid reports when asked.
pub const GRID_SURFACE_ID: &str = "grid";

/// Selection-by-pointer-and-keyboard over a laid-out grid.
#[derive(Debug)]
pub struct GridSurface {
    id: SurfaceId,
    index: GridPositionIndex,
    selection: SelectionState,
    gesture: DragGestureController,
    keymap: KeyMap,
    ignore_synthetic_pointer: bool,
    notifier: Notifier<Notification>,
}

impl GridSurface {
    /// An unconfigured grid with default input policy.
    #[must_use]
    pub fn new(notifier: Notifier<Notification>) -> Self {
        Self::with_runtime(&RuntimeConfig::default(), notifier)
    }

    /// An unconfigured grid with the given input policy.
    #[must_use]
    pub fn with_runtime(runtime: &RuntimeConfig, notifier: Notifier<Notification>) -> Self {
        Self {
            id: SurfaceId::new(GRID_SURFACE_ID),
            index: GridPositionIndex::new(),
            selection: SelectionState::new(notifier.clone()),
            gesture: DragGestureController::new(),
            keymap: runtime.keymap(),
            ignore_synthetic_pointer: runtime.ignore_synthetic_pointer,
            notifier,
        }
    }

    /// Build and configure a grid in one step.
    ///
    /// The grid is returned even if the layout cannot be built yet; the
    /// error is reported alongside so the host can decide.
    pub fn from_config(
        config: GridConfig,
        notifier: Notifier<Notification>,
    ) -> (Self, Result<(), GridError>) {
        let mut grid = Self::with_runtime(&config.runtime, notifier);
        let result = grid.configure(config.layout);
        (grid, result)
    }

    /// Supply the layout and rebuild. Selected coordinates that are no
    /// longer laid out are dropped.
    pub fn configure(&mut self, layout: LayoutConfig) -> Result<(), GridError> {
        self.index.configure(layout)?;
        self.prune();
        Ok(())
    }

    /// Change the viewport and rebuild.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<(), GridError> {
        self.index.set_viewport(viewport)?;
        self.prune();
        Ok(())
    }

    /// Whether a layout has been built from a configuration.
    #[inline]
    #[must_use]
    pub fn layout_ready(&self) -> bool {
        self.index.layout_ready()
    }

    /// Read-only view of the current layout.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LayoutSnapshot> {
        self.index.snapshot()
    }

    #[must_use]
    pub fn position_of(&self, coord: GridCoordinate) -> Option<ScreenPoint> {
        self.index.position_of(coord)
    }

    #[must_use]
    pub fn selected_coordinates(&self) -> Vec<GridCoordinate> {
        self.selection.snapshot()
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }

    #[must_use]
    pub fn is_selected(&self, coord: GridCoordinate) -> bool {
        self.selection.is_selected(coord)
    }

    /// Committed, or touched by the live drag.
    #[must_use]
    pub fn is_highlighted(&self, coord: GridCoordinate) -> bool {
        self.selection.is_selected(coord) || self.gesture.is_provisional(coord)
    }

    #[must_use]
    pub fn focus(&self) -> Option<GridCoordinate> {
        self.selection.focus()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Toggle `coord` on behalf of a host command.
    ///
    /// Returns whether it is now selected. A coordinate the current layout
    /// does not have is rejected with [`GridError::UnknownCoordinate`] and
    /// the selection is left alone.
    pub fn toggle(&mut self, coord: GridCoordinate) -> Result<bool, GridError> {
        self.require_laid_out(coord)?;
        Ok(self.selection.toggle(coord))
    }

    /// Add `coords` as one batch (e.g. "select all ripe").
    ///
    /// All or nothing: if any coordinate is not laid out the whole batch is
    /// rejected. Returns how many were newly selected.
    pub fn apply_batch(
        &mut self,
        coords: impl IntoIterator<Item = GridCoordinate>,
    ) -> Result<usize, GridError> {
        let coords: Vec<GridCoordinate> = coords.into_iter().collect();
        for &coord in &coords {
            self.require_laid_out(coord)?;
        }
        Ok(self.selection.apply_batch(coords))
    }

    /// Move keyboard focus. `None` clears it.
    pub fn set_focus(&mut self, focus: Option<GridCoordinate>) -> Result<(), GridError> {
        if let Some(coord) = focus {
            self.require_laid_out(coord)?;
        }
        self.selection.set_focus(focus);
        Ok(())
    }

    #[must_use]
    pub fn gesture(&self) -> &DragGestureController {
        &self.gesture
    }

    #[must_use]
    pub fn index(&self) -> &GridPositionIndex {
        &self.index
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Run a grid command. Returns whether it did anything.
    pub fn perform(&mut self, action: GridAction) -> bool {
        match action {
            GridAction::MoveFocus(dir) => {
                let snapshot = self.index.current();
                let target = match self.selection.focus() {
                    Some(origin) if snapshot.contains(origin) => navigate(snapshot, origin, dir),
                    _ => snapshot.entries().first().map(|e| e.coord),
                };
                let Some(target) = target else {
                    return false;
                };
                trace!(%target, "focus moved");
                self.selection.set_focus(Some(target));
                true
            }
            GridAction::ToggleFocused => match self.selection.focus() {
                Some(coord) if self.index.current().contains(coord) => {
                    self.selection.toggle(coord);
                    true
                }
                _ => false,
            },
            GridAction::ClearSelection => {
                self.selection.clear_all();
                true
            }
            GridAction::RestorePrevious => self.selection.restore_previous(),
            GridAction::SelectCluster => {
                let Some(focus) = self.selection.focus() else {
                    return false;
                };
                let snapshot = self.index.current();
                let Some(cluster) = snapshot.cluster_of(focus) else {
                    return false;
                };
                let members = snapshot.coordinates_in(cluster).to_vec();
                self.selection.apply_batch(members);
                true
            }
            GridAction::Action(action) => {
                let mut targets = self.selection.snapshot();
                if targets.is_empty() {
                    targets.extend(self.selection.focus());
                }
                debug!(action = action.as_str(), targets = targets.len(), "action requested");
                self.notifier
                    .emit(Notification::ActionRequested { action, targets });
                true
            }
        }
    }

    fn on_pointer(&mut self, pointer: &PointerEvent) -> Handled {
        if self.ignore_synthetic_pointer && pointer.origin == DeviceOrigin::SyntheticFromTouch {
            trace!(kind = pointer.kind.label(), "synthetic pointer dropped");
            return Handled::Ignored;
        }
        let result = match pointer.kind {
            PointerKind::Press => Ok(self.gesture.on_press(pointer.point, &self.index)),
            PointerKind::Move => self.gesture.on_move(pointer.point, &self.index),
            PointerKind::Release => self.gesture.on_release(&mut self.selection),
            PointerKind::Tap => Ok(self.gesture.on_tap(
                pointer.point,
                &self.index,
                &mut self.selection,
            )),
        };
        // Invalid transitions were traced by the controller.
        result.is_ok_and(|outcome| outcome.consumed()).into()
    }

    fn on_key(&mut self, key: &KeyEvent) -> Handled {
        match self.keymap.resolve(key) {
            Some(action) => self.perform(action).into(),
            None => Handled::Ignored,
        }
    }

    fn require_laid_out(&self, coord: GridCoordinate) -> Result<(), GridError> {
        if self.index.current().contains(coord) {
            return Ok(());
        }
        let err = GridError::UnknownCoordinate(coord);
        debug!(kind = err.error_type(), %coord, "command ignored");
        Err(err)
    }

    fn prune(&mut self) {
        let snapshot = self.index.snapshot();
        let dropped = self.selection.retain(|c| snapshot.contains(c));
        if dropped > 0 {
            debug!(dropped, "selection pruned after rebuild");
        }
        if self
            .gesture
            .session()
            .is_some_and(|s| !s.touched().iter().all(|c| snapshot.contains(*c)))
        {
            self.gesture.cancel();
        }
    }
}

impl InputSurface for GridSurface {
    fn id(&self) -> &SurfaceId {
        &self.id
    }

    fn handle(&mut self, event: &InputEvent) -> Handled {
        match event {
            InputEvent::Pointer(pointer) => self.on_pointer(pointer),
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::Resize { width, height } => {
                self.set_viewport(Size::new(*width, *height)).is_ok().into()
            }
            InputEvent::FocusLost => {
                self.gesture.cancel();
                Handled::Consumed
            }
        }
    }

    fn interrupt(&mut self) {
        if self.gesture.cancel().is_some() {
            debug!("drag interrupted by overlay");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Recorder;
    use plotgrid_core::event::{KeyCode, Modifiers};
    use plotgrid_layout::ClusterParams;

    fn c(x: i32, y: i32) -> GridCoordinate {
        GridCoordinate::new(x, y)
    }

    fn layout() -> LayoutConfig {
        LayoutConfig::new(Size::new(800.0, 600.0))
            .with_cluster("Alpha", ClusterParams::new(ScreenPoint::new(-200.0, 0.0), 1.0))
            .with_cluster("Beta", ClusterParams::new(ScreenPoint::new(200.0, 0.0), 1.0))
            .assign_all((0..4).map(|x| c(x, 0)), "Alpha")
            .assign_all((0..3).map(|x| c(x, 1)), "Beta")
    }

    fn grid() -> (GridSurface, Recorder<Notification>) {
        let notifier = Notifier::new();
        let rec = notifier.recorder();
        let mut grid = GridSurface::new(notifier);
        grid.configure(layout()).expect("valid layout");
        (grid, rec)
    }

    fn at(grid: &GridSurface, coord: GridCoordinate) -> ScreenPoint {
        grid.position_of(coord).expect("laid out")
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    #[test]
    fn unconfigured_grid_ignores_pointer() {
        let mut grid = GridSurface::new(Notifier::new());
        assert!(!grid.layout_ready());
        let tap = InputEvent::Pointer(PointerEvent::tap(ScreenPoint::new(400.0, 300.0)));
        assert_eq!(grid.handle(&tap), Handled::Ignored);
    }

    #[test]
    fn tap_toggles_cell() {
        let (mut grid, rec) = grid();
        let p = at(&grid, c(1, 0));
        assert_eq!(
            grid.handle(&InputEvent::Pointer(PointerEvent::tap(p))),
            Handled::Consumed
        );
        assert_eq!(grid.selected_coordinates(), vec![c(1, 0)]);
        assert_eq!(rec.events(), vec![Notification::SelectionChanged { count: 1 }]);
    }

    #[test]
    fn synthetic_pointer_is_dropped_by_default() {
        let (mut grid, rec) = grid();
        let p = at(&grid, c(1, 0));
        let synthetic =
            InputEvent::Pointer(PointerEvent::tap(p).with_origin(DeviceOrigin::SyntheticFromTouch));
        assert_eq!(grid.handle(&synthetic), Handled::Ignored);
        assert_eq!(grid.selected_count(), 0);
        assert!(rec.is_empty());

        let touch = InputEvent::Pointer(PointerEvent::tap(p).with_origin(DeviceOrigin::Touch));
        assert_eq!(grid.handle(&touch), Handled::Consumed);
        assert_eq!(grid.selected_count(), 1);
    }

    #[test]
    fn synthetic_pointer_kept_when_configured() {
        let runtime = RuntimeConfig {
            ignore_synthetic_pointer: false,
            ..RuntimeConfig::default()
        };
        let mut grid = GridSurface::with_runtime(&runtime, Notifier::new());
        grid.configure(layout()).expect("valid layout");
        let p = at(&grid, c(0, 1));
        let synthetic =
            InputEvent::Pointer(PointerEvent::tap(p).with_origin(DeviceOrigin::SyntheticFromTouch));
        assert_eq!(grid.handle(&synthetic), Handled::Consumed);
        assert!(grid.is_selected(c(0, 1)));
    }

    #[test]
    fn live_drag_highlights_provisionally() {
        let (mut grid, rec) = grid();
        let p0 = at(&grid, c(0, 0));
        let p1 = at(&grid, c(1, 0));
        let _ = grid.handle(&InputEvent::Pointer(PointerEvent::press(p0)));
        let _ = grid.handle(&InputEvent::Pointer(PointerEvent::moved(p1)));
        assert!(grid.is_highlighted(c(1, 0)));
        assert!(!grid.is_selected(c(1, 0)));
        assert!(rec.is_empty());

        let _ = grid.handle(&InputEvent::FocusLost);
        assert!(!grid.is_dragging());
        assert!(!grid.is_highlighted(c(1, 0)));
        assert_eq!(grid.selected_count(), 0);
    }

    #[test]
    fn stray_release_is_not_consumed() {
        let (mut grid, _rec) = grid();
        let release = InputEvent::Pointer(PointerEvent::release(ScreenPoint::new(1.0, 1.0)));
        assert_eq!(grid.handle(&release), Handled::Ignored);
    }

    #[test]
    fn keyboard_focus_and_toggle() {
        let (mut grid, _rec) = grid();
        assert_eq!(grid.handle(&key(KeyCode::Right)), Handled::Consumed);
        let first = grid.focus().expect("focus seeded");
        assert_eq!(first, grid.snapshot().entries()[0].coord);

        assert_eq!(grid.handle(&key(KeyCode::Enter)), Handled::Consumed);
        assert!(grid.is_selected(first));

        assert_eq!(grid.handle(&key(KeyCode::Backspace)), Handled::Consumed);
        assert_eq!(grid.selected_count(), 0);

        let undo = InputEvent::Key(KeyEvent::new(KeyCode::Char('z')).with_modifiers(Modifiers::CTRL));
        assert_eq!(grid.handle(&undo), Handled::Consumed);
        assert!(grid.is_selected(first));
    }

    #[test]
    fn toggle_without_focus_declines() {
        let (mut grid, _rec) = grid();
        assert_eq!(grid.handle(&key(KeyCode::Char(' '))), Handled::Ignored);
    }

    #[test]
    fn select_cluster_batches_focused_cluster() {
        let (mut grid, rec) = grid();
        grid.set_focus(Some(c(1, 1))).expect("laid out");
        assert!(grid.perform(GridAction::SelectCluster));
        assert_eq!(grid.selected_coordinates(), vec![c(0, 1), c(1, 1), c(2, 1)]);
        assert_eq!(rec.events(), vec![Notification::SelectionChanged { count: 3 }]);
    }

    #[test]
    fn action_targets_selection_or_focus() {
        let notifier = Notifier::new();
        let rec = notifier.recorder();
        let runtime = RuntimeConfig::default().with_action('h', "harvest");
        let mut grid = GridSurface::with_runtime(&runtime, notifier);
        grid.configure(layout()).expect("valid layout");

        grid.set_focus(Some(c(2, 0))).expect("laid out");
        assert_eq!(grid.handle(&key(KeyCode::Char('h'))), Handled::Consumed);
        assert_eq!(
            rec.take(),
            vec![Notification::ActionRequested {
                action: "harvest".into(),
                targets: vec![c(2, 0)]
            }]
        );

        grid.apply_batch([c(0, 0), c(1, 0)]).expect("laid out");
        rec.take();
        let _ = grid.handle(&key(KeyCode::Char('h')));
        assert_eq!(
            rec.take(),
            vec![Notification::ActionRequested {
                action: "harvest".into(),
                targets: vec![c(0, 0), c(1, 0)]
            }]
        );
    }

    #[test]
    fn resize_moves_cells_and_keeps_selection() {
        let (mut grid, _rec) = grid();
        grid.toggle(c(0, 0)).expect("laid out");
        let before = at(&grid, c(0, 0));
        let resize = InputEvent::Resize {
            width: 1600.0,
            height: 1200.0,
        };
        assert_eq!(grid.handle(&resize), Handled::Consumed);
        assert_ne!(at(&grid, c(0, 0)), before);
        assert!(grid.is_selected(c(0, 0)));
    }

    #[test]
    fn degenerate_resize_keeps_previous_layout() {
        let (mut grid, _rec) = grid();
        let before = at(&grid, c(0, 0));
        let resize = InputEvent::Resize {
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(grid.handle(&resize), Handled::Ignored);
        assert_eq!(at(&grid, c(0, 0)), before);
    }

    #[test]
    fn reconfigure_prunes_removed_cells() {
        let (mut grid, rec) = grid();
        grid.apply_batch([c(0, 0), c(2, 1)]).expect("laid out");
        rec.take();
        let smaller = LayoutConfig::new(Size::new(800.0, 600.0))
            .assign_all((0..4).map(|x| c(x, 0)), "Alpha");
        grid.configure(smaller).expect("valid layout");
        assert_eq!(grid.selected_coordinates(), vec![c(0, 0)]);
        assert_eq!(rec.events(), vec![Notification::SelectionChanged { count: 1 }]);
    }

    #[test]
    fn from_config_builds_ready_grid() {
        let config = GridConfig {
            layout: layout(),
            runtime: RuntimeConfig::default(),
        };
        let (grid, result) = GridSurface::from_config(config, Notifier::new());
        assert!(result.is_ok());
        assert!(grid.layout_ready());
        assert_eq!(grid.snapshot().len(), 7);
    }

    #[test]
    fn commands_on_unknown_coordinates_change_nothing() {
        let (mut grid, rec) = grid();
        grid.set_focus(Some(c(1, 0))).expect("laid out");

        assert_eq!(grid.toggle(c(99, 99)), Err(GridError::UnknownCoordinate(c(99, 99))));
        assert_eq!(
            grid.apply_batch([c(0, 0), c(50, 50)]),
            Err(GridError::UnknownCoordinate(c(50, 50)))
        );
        assert_eq!(
            grid.set_focus(Some(c(7, 7))),
            Err(GridError::UnknownCoordinate(c(7, 7)))
        );

        assert_eq!(grid.selected_count(), 0);
        assert_eq!(grid.focus(), Some(c(1, 0)));
        assert!(!grid.selection().has_previous());
        assert!(rec.is_empty());
    }

    #[test]
    fn commands_on_laid_out_coordinates_apply() {
        let (mut grid, rec) = grid();
        assert_eq!(grid.toggle(c(2, 1)), Ok(true));
        assert_eq!(grid.apply_batch([c(2, 1), c(0, 0)]), Ok(1));
        grid.set_focus(None).expect("clearing focus");
        assert_eq!(grid.focus(), None);
        assert_eq!(
            rec.events(),
            vec![
                Notification::SelectionChanged { count: 1 },
                Notification::SelectionChanged { count: 2 },
            ]
        );
    }
}
