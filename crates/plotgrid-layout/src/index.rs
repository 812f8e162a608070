#![forbid(unsafe_code)]

//! Grid position index: the authoritative coordinate → screen mapping.
//!
//! [`GridPositionIndex`] owns the current [`LayoutSnapshot`] and rebuilds it
//! from a [`LayoutConfig`] whenever the configuration or viewport changes.
//!
//! # Two-phase protocol
//!
//! 1. [`configure`](GridPositionIndex::configure) supplies clusters and
//!    assignments and triggers the first rebuild.
//! 2. [`layout_ready`](GridPositionIndex::layout_ready) gates hit testing:
//!    until a snapshot has been built from a configuration, every hit test
//!    misses.
//!
//! # Invariants
//!
//! 1. A snapshot is either empty or complete; a rebuild computes the new
//!    snapshot in full and swaps it in with one assignment.
//! 2. A failed rebuild leaves the previous snapshot in place.
//! 3. Entry order is stable: clusters by name, members by coordinate order.
//!
//! # Failure Modes
//!
//! - Rebuild before `configure`: [`GridError::ConfigurationMissing`], logged
//!   at `warn`, previous (empty) snapshot kept.
//! - Invalid geometry (zero viewport, negative scale):
//!   [`GridError::InvalidGeometry`], same recovery.
//! - Two clusters whose tiles land within `min_separation` of each other:
//!   the snapshot is used, with one `warn` per crowded pair.

use std::sync::Arc;

use plotgrid_core::{GridCoordinate, GridError, HitTestable, ScreenPoint, Size, TileBounds};
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, warn};

use crate::config::LayoutConfig;
use crate::ring;

/// One positioned cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEntry {
    pub coord: GridCoordinate,
    pub position: ScreenPoint,
    /// Index into [`LayoutSnapshot::clusters`].
    pub cluster: usize,
}

/// A cluster as laid out in one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLayout {
    pub name: String,
    pub center: ScreenPoint,
    /// Members in ring order.
    pub members: Vec<GridCoordinate>,
}

/// Immutable coordinate → screen mapping for one layout generation.
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    entries: Vec<LayoutEntry>,
    lookup: FxHashMap<GridCoordinate, usize>,
    clusters: Vec<ClusterLayout>,
    tile_extent: f32,
    viewport: Size,
    generation: u64,
}

impl LayoutSnapshot {
    /// The empty snapshot (before any configuration).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of positioned coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no coordinates are positioned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild counter this snapshot was produced by (0 = never built).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Side length of each tile's hit box.
    #[inline]
    pub fn tile_extent(&self) -> f32 {
        self.tile_extent
    }

    /// Viewport the snapshot was computed for.
    #[inline]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// All entries in stable order.
    #[inline]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// All clusters, sorted by name.
    #[inline]
    pub fn clusters(&self) -> &[ClusterLayout] {
        &self.clusters
    }

    /// Whether `coord` has a position.
    #[inline]
    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.lookup.contains_key(&coord)
    }

    fn entry(&self, coord: GridCoordinate) -> Option<&LayoutEntry> {
        self.lookup.get(&coord).map(|&i| &self.entries[i])
    }

    /// Screen position of `coord`.
    pub fn position_of(&self, coord: GridCoordinate) -> Option<ScreenPoint> {
        self.entry(coord).map(|e| e.position)
    }

    /// Hit box of `coord`.
    pub fn tile_bounds(&self, coord: GridCoordinate) -> Option<TileBounds> {
        self.position_of(coord)
            .map(|p| TileBounds::around(p, self.tile_extent))
    }

    /// Name of the cluster owning `coord`.
    pub fn cluster_of(&self, coord: GridCoordinate) -> Option<&str> {
        self.entry(coord)
            .map(|e| self.clusters[e.cluster].name.as_str())
    }

    /// Cluster by name.
    pub fn cluster(&self, name: &str) -> Option<&ClusterLayout> {
        self.clusters
            .binary_search_by(|c| c.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.clusters[i])
    }

    /// Coordinates of the named cluster (empty if unknown).
    pub fn coordinates_in(&self, name: &str) -> &[GridCoordinate] {
        self.cluster(name).map_or(&[], |c| c.members.as_slice())
    }

    /// Resolve a screen point to a coordinate.
    ///
    /// Scans every tile (O(n)). When tiles overlap, the tile whose center is
    /// nearest to `point` wins; ties go to the earliest entry.
    pub fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate> {
        if !point.is_finite() {
            return None;
        }
        let mut best: Option<(GridCoordinate, f32)> = None;
        for entry in &self.entries {
            if !TileBounds::around(entry.position, self.tile_extent).contains(point) {
                continue;
            }
            let d = entry.position.distance_squared(point);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((entry.coord, d));
            }
        }
        best.map(|(coord, _)| coord)
    }
}

impl HitTestable for LayoutSnapshot {
    fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate> {
        LayoutSnapshot::hit_test(self, point)
    }

    fn contains(&self, coord: GridCoordinate) -> bool {
        LayoutSnapshot::contains(self, coord)
    }
}

impl LayoutSnapshot {
    /// Pairs of clusters (by name, in cluster order) that have a tile from
    /// each closer together than `min_separation`.
    ///
    /// The ring solver keeps members of one cluster apart; it knows nothing
    /// of other clusters. Two rings placed on the same spot share hit boxes,
    /// and a hit test can then only ever return one of the overlapping
    /// cells. O(n²) in the number of entries.
    #[must_use]
    pub fn crowded_clusters(&self, min_separation: f32) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.cluster == b.cluster {
                    continue;
                }
                let pair = (a.cluster.min(b.cluster), a.cluster.max(b.cluster));
                if !pairs.contains(&pair) && a.position.distance(b.position) < min_separation {
                    pairs.push(pair);
                }
            }
        }
        pairs.sort_unstable();
        pairs
            .into_iter()
            .map(|(a, b)| (self.clusters[a].name.as_str(), self.clusters[b].name.as_str()))
            .collect()
    }
}

/// Compute a complete snapshot from `config`.
///
/// Pure: no logging, no state. `generation` is stamped on the result.
pub fn build_snapshot(config: &LayoutConfig, generation: u64) -> Result<LayoutSnapshot, GridError> {
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(GridError::invalid_geometry(problems.join("; ")));
    }

    let params = config.ring_params();
    let viewport_center = config.viewport.center();
    let groups = config.cluster_groups();

    let total: usize = groups.values().map(Vec::len).sum();
    let mut entries = Vec::with_capacity(total);
    let mut lookup = FxHashMap::with_capacity_and_hasher(total, Default::default());
    let mut clusters = Vec::with_capacity(groups.len());

    for (cluster_index, (name, members)) in groups.into_iter().enumerate() {
        let cluster_params = config.params_for(&name);
        let center = viewport_center.offset(cluster_params.center_offset);
        let points =
            ring::compute_positions(&name, members.len(), center, cluster_params.scale, &params);
        debug_assert_eq!(points.len(), members.len());

        for (&coord, &position) in members.iter().zip(&points) {
            if !position.is_finite() {
                return Err(GridError::invalid_geometry(format!(
                    "non-finite position for {coord} in cluster {name}"
                )));
            }
            lookup.insert(coord, entries.len());
            entries.push(LayoutEntry {
                coord,
                position,
                cluster: cluster_index,
            });
        }
        clusters.push(ClusterLayout {
            name,
            center,
            members,
        });
    }

    Ok(LayoutSnapshot {
        entries,
        lookup,
        clusters,
        tile_extent: config.tile_extent,
        viewport: config.viewport,
        generation,
    })
}

/// Owner of the current layout snapshot.
#[derive(Debug, Default)]
pub struct GridPositionIndex {
    config: Option<LayoutConfig>,
    snapshot: Arc<LayoutSnapshot>,
    ready: bool,
    generation: u64,
}

impl GridPositionIndex {
    /// An unconfigured index with an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the layout configuration and rebuild.
    ///
    /// The configuration is kept even if this rebuild fails, so a later
    /// viewport change can still produce a layout.
    pub fn configure(&mut self, config: LayoutConfig) -> Result<(), GridError> {
        self.config = Some(config);
        self.try_rebuild()
    }

    /// Whether a configuration has been supplied.
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// The active configuration.
    pub fn config(&self) -> Option<&LayoutConfig> {
        self.config.as_ref()
    }

    /// Update the viewport and rebuild.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<(), GridError> {
        match self.config.as_mut() {
            Some(config) => config.viewport = viewport,
            None => {
                let err = GridError::ConfigurationMissing;
                warn!(kind = err.error_type(), "viewport change before configure");
                return Err(err);
            }
        }
        self.try_rebuild()
    }

    /// Recompute the snapshot from the stored configuration.
    ///
    /// On failure the previous snapshot stays current.
    pub fn try_rebuild(&mut self) -> Result<(), GridError> {
        let next_generation = self.generation + 1;
        let _span = debug_span!("layout.rebuild", generation = next_generation).entered();

        let (result, min_separation) = match self.config.as_ref() {
            Some(config) => (
                build_snapshot(config, next_generation),
                config.ring_params().min_separation,
            ),
            None => (Err(GridError::ConfigurationMissing), 0.0),
        };

        match result {
            Ok(snapshot) => {
                debug!(
                    entries = snapshot.len(),
                    clusters = snapshot.clusters().len(),
                    "layout rebuilt"
                );
                for (first, second) in snapshot.crowded_clusters(min_separation) {
                    warn!(
                        kind = "crowded_clusters",
                        first,
                        second,
                        min_separation,
                        "tiles of two clusters overlap; hit tests pick one of them"
                    );
                }
                self.generation = next_generation;
                self.snapshot = Arc::new(snapshot);
                self.ready = true;
                Ok(())
            }
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.error_type(),
                    kept_generation = self.snapshot.generation(),
                    "layout rebuild failed; keeping previous snapshot"
                );
                Err(err)
            }
        }
    }

    /// Fail-soft rebuild: logs on failure and returns whichever snapshot is
    /// current afterwards.
    pub fn rebuild(&mut self) -> Arc<LayoutSnapshot> {
        // Failure is already logged by try_rebuild.
        let _ = self.try_rebuild();
        self.snapshot()
    }

    /// Whether a snapshot has been built from a configuration.
    #[inline]
    pub fn layout_ready(&self) -> bool {
        self.ready
    }

    /// Read-only view of the current snapshot.
    #[inline]
    pub fn snapshot(&self) -> Arc<LayoutSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Borrow the current snapshot without bumping the refcount.
    #[inline]
    pub fn current(&self) -> &LayoutSnapshot {
        &self.snapshot
    }

    /// Screen position of `coord`.
    pub fn position_of(&self, coord: GridCoordinate) -> Option<ScreenPoint> {
        self.snapshot.position_of(coord)
    }

    /// Name of the cluster owning `coord`.
    pub fn cluster_of(&self, coord: GridCoordinate) -> Option<&str> {
        self.snapshot.cluster_of(coord)
    }

    /// Coordinates of the named cluster.
    pub fn coordinates_in(&self, name: &str) -> &[GridCoordinate] {
        self.snapshot.coordinates_in(name)
    }

    /// Resolve a screen point; always misses until the layout is ready.
    pub fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate> {
        if !self.ready {
            return None;
        }
        self.snapshot.hit_test(point)
    }
}

impl HitTestable for GridPositionIndex {
    fn hit_test(&self, point: ScreenPoint) -> Option<GridCoordinate> {
        GridPositionIndex::hit_test(self, point)
    }

    fn contains(&self, coord: GridCoordinate) -> bool {
        self.snapshot.contains(coord)
    }
}
