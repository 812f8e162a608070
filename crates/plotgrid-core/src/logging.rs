#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! host's job. [`init_logging`] is a convenience for demos and tests: it
//! installs a compact fmt subscriber filtered by `RUST_LOG` (falling back to
//! the given directive) and is safe to call more than once.

use tracing_subscriber::EnvFilter;

pub use tracing::{debug, debug_span, error, info, trace, warn};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "plotgrid=info";

/// Install a global fmt subscriber. Returns `false` if one was already set.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}

/// Test-friendly variant: writes through the libtest capture and never
/// fails when called from many tests.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
