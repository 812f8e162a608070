// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: coordinates, screen geometry, input events, and errors.
//!
//! # Role in plotgrid
//! `plotgrid-core` is the vocabulary shared by every other crate. It owns no
//! state; layout (`plotgrid-layout`) and the input runtime
//! (`plotgrid-runtime`) are built on top of it.
//!
//! # Primary responsibilities
//! - **Geometry**: [`GridCoordinate`](geometry::GridCoordinate),
//!   [`ScreenPoint`](geometry::ScreenPoint), tile bounds.
//! - **Events**: normalized pointer/touch/key input with device origin tags.
//! - **Capabilities**: the [`HitTestable`](hit::HitTestable) trait.
//! - **Errors**: [`GridError`](error::GridError) and its degradation mapping.

pub mod error;
pub mod event;
pub mod geometry;
pub mod hit;
pub mod logging;

pub use error::{Degradation, GridError, Result};
pub use geometry::{GridCoordinate, ScreenPoint, Size, TileBounds};
pub use hit::HitTestable;
