#![forbid(unsafe_code)]

//! plotgrid public facade crate.
//!
//! Re-exports the types a host needs to lay out a cluster grid, feed it
//! input, and listen for selection changes, plus a prelude for day-to-day
//! use.
//!
//! ```ignore
//! use plotgrid::prelude::*;
//!
//! let notifier = Notifier::new();
//! let _sub = notifier.subscribe(|n| println!("{n:?}"));
//! let (mut router, result) = plotgrid::router(GridConfig::from_toml_file("farm.toml")?, notifier);
//! result?;
//! router.dispatch(&InputEvent::Key(KeyEvent::new(KeyCode::Escape)));
//! ```

// --- Core re-exports -------------------------------------------------------

pub use plotgrid_core::event::{
    DeviceOrigin, InputEvent, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent,
    PointerKind,
};
pub use plotgrid_core::logging::{DEFAULT_FILTER, init_logging};
pub use plotgrid_core::{
    Degradation, GridCoordinate, GridError, HitTestable, Result, ScreenPoint, Size, TileBounds,
};

// --- Layout re-exports -----------------------------------------------------

pub use plotgrid_layout::{
    ClusterParams, GridPositionIndex, LayoutConfig, LayoutSnapshot, NavDirection,
};

// --- Runtime re-exports ----------------------------------------------------

pub use plotgrid_runtime::{
    Dispatch, GridAction, GridConfig, GridSurface, Handled, InputRouter, InputSurface, KeyMap,
    Notification, Notifier, RuntimeConfig, SelectionState, Subscription, SurfaceHandle,
    SurfaceId,
};

/// A grid built from `config` behind an empty surface stack.
///
/// The router is returned even when the layout cannot be built yet (for
/// example a zero viewport); the error is reported alongside and a later
/// resize can still bring the grid up.
pub fn router(
    config: GridConfig,
    notifier: Notifier<Notification>,
) -> (InputRouter<GridSurface>, Result<()>) {
    let (grid, result) = GridSurface::from_config(config, notifier.clone());
    (InputRouter::new(grid, notifier), result)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ClusterParams, DeviceOrigin, Dispatch, GridConfig, GridCoordinate, GridError, GridSurface,
        Handled, InputEvent, InputRouter, InputSurface, KeyCode, KeyEvent, LayoutConfig,
        Modifiers, Notification, Notifier, PointerEvent, ScreenPoint, Size, SurfaceId,
    };

    pub use crate::{core, layout, runtime};
}

pub use plotgrid_core as core;
pub use plotgrid_layout as layout;
pub use plotgrid_runtime as runtime;
