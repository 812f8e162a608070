#![forbid(unsafe_code)]

//! Runtime: selection, gestures, and input routing.
//!
//! # Role in plotgrid
//! `plotgrid-runtime` is the interactive half. It decides which layer an
//! input event belongs to and, when it is the grid's, what happens to the
//! selection.
//!
//! # Data flow
//! ```text
//! InputEvent ─▶ InputRouter ─▶ stacked surfaces (top-down)
//!                   │
//!                   └─▶ GridSurface ─▶ DragGestureController ─▶ SelectionState
//!                                                                  │
//!                                       Notifier ◀─────────────────┘
//! ```
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and synchronous.

pub mod config;
pub mod gesture;
pub mod grid;
pub mod keymap;
pub mod notify;
pub mod router;
pub mod selection;

pub use config::{GridConfig, RuntimeConfig};
pub use gesture::{DragGestureController, DragSession, GestureOutcome};
pub use grid::{GRID_SURFACE_ID, GridSurface};
pub use keymap::{GridAction, KeyMap};
pub use notify::{Notification, Notifier, Recorder, Subscription};
pub use router::{Dispatch, Handled, InputRouter, InputSurface, SurfaceHandle, SurfaceId, SurfaceStack};
pub use selection::SelectionState;
