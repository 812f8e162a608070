#![forbid(unsafe_code)]

//! Layout: where every plot lives on screen.
//!
//! # Role in plotgrid
//! `plotgrid-layout` turns a [`LayoutConfig`] (clusters, assignments, ring
//! tuning) into an immutable [`LayoutSnapshot`] and answers geometric
//! queries against it: position lookup, hit testing, and directional
//! keyboard navigation.
//!
//! # Modules
//! - [`ring`]: pure parametric oval placement for one cluster.
//! - [`config`]: serde-loadable layout configuration.
//! - [`index`]: [`GridPositionIndex`], the owner of the current snapshot.
//! - [`spatial`]: arrow-key navigation over a snapshot.

pub mod config;
pub mod index;
pub mod ring;
pub mod spatial;

pub use config::{ClusterAssignment, ClusterParams, DEFAULT_CLUSTER, LayoutConfig};
pub use index::{ClusterLayout, GridPositionIndex, LayoutEntry, LayoutSnapshot, build_snapshot};
pub use ring::{RingParams, compute_positions};
pub use spatial::{NavDirection, navigate};
