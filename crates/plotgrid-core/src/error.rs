#![forbid(unsafe_code)]

//! Error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Nothing here is fatal**: every variant maps to a [`Degradation`]
//!    that leaves the UI alive; worst case, selection or layout is stale
//!    until the next successful rebuild or gesture.
//! 2. **No panics on input**: malformed or out-of-order input is dropped.
//! 3. **Observability**: [`GridError::error_type`] gives a stable label for
//!    tracing fields without the error depending on tracing.

use thiserror::Error;

use crate::geometry::GridCoordinate;

/// Standard result type for plotgrid APIs.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised by layout, selection, and gesture handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A rebuild was requested before cluster configuration was supplied.
    #[error("layout configuration missing")]
    ConfigurationMissing,

    /// Configuration was present but cannot produce a layout.
    #[error("invalid geometry: {detail}")]
    InvalidGeometry { detail: String },

    /// A query or mutation named a coordinate absent from the current layout.
    #[error("unknown coordinate {0}")]
    UnknownCoordinate(GridCoordinate),

    /// A gesture event arrived in a state that cannot accept it
    /// (e.g. release with no active drag).
    #[error("invalid gesture transition: {event} while {state}")]
    InvalidGestureTransition {
        event: &'static str,
        state: &'static str,
    },

    /// Configuration text could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

/// What the caller should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Keep the previous layout snapshot.
    ReusePreviousLayout,
    /// Treat the request as a no-op returning "not found".
    Ignore,
    /// Drop the input event and continue processing.
    DropInput,
    /// Refuse the configuration; keep running on what was loaded before.
    Reject,
}

impl GridError {
    /// Shorthand for [`GridError::InvalidGeometry`].
    pub fn invalid_geometry(detail: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            detail: detail.into(),
        }
    }

    /// Determine the graceful degradation action for this error.
    #[must_use]
    pub fn degradation(&self) -> Degradation {
        match self {
            Self::ConfigurationMissing | Self::InvalidGeometry { .. } => {
                Degradation::ReusePreviousLayout
            }
            Self::UnknownCoordinate(_) => Degradation::Ignore,
            Self::InvalidGestureTransition { .. } => Degradation::DropInput,
            Self::Config(_) => Degradation::Reject,
        }
    }

    /// Error type label for tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing => "configuration_missing",
            Self::InvalidGeometry { .. } => "invalid_geometry",
            Self::UnknownCoordinate(_) => "unknown_coordinate",
            Self::InvalidGestureTransition { .. } => "invalid_gesture_transition",
            Self::Config(_) => "config",
        }
    }
}
