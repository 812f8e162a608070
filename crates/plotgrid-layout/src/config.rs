#![forbid(unsafe_code)]

//! Layout configuration: clusters, coordinate assignments, and ring tuning.
//!
//! Captures everything the position index needs to compute a snapshot as a
//! single [`LayoutConfig`] that can be loaded from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! viewport = { width = 1280.0, height = 720.0 }
//! tile_extent = 48.0
//!
//! [clusters.Alpha]
//! center_offset = { x = -300.0, y = 0.0 }
//! scale = 1.0
//!
//! [[assignments]]
//! coord = { x = 0, y = 0 }
//! cluster = "Alpha"
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so a config listing only assignments is valid:
//! all coordinates land in the `"default"` cluster at the viewport center.

use std::collections::BTreeMap;
use std::path::Path;

use plotgrid_core::{GridCoordinate, GridError, ScreenPoint, Size};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ring::RingParams;

/// Name of the implicit cluster for unassigned coordinates.
pub const DEFAULT_CLUSTER: &str = "default";

/// Default side length of a tile's hit box.
pub const DEFAULT_TILE_EXTENT: f32 = 48.0;

/// Default ratio of the ring's vertical to horizontal semi-axis.
pub const DEFAULT_ASPECT: f32 = 0.6;

/// Default reference radius as a fraction of the viewport's shorter side.
pub const DEFAULT_RADIUS_FRACTION: f32 = 0.18;

/// Placement parameters for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Offset of the cluster center from the viewport center.
    pub center_offset: ScreenPoint,
    /// Ring size relative to the shared reference radius.
    pub scale: f32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            center_offset: ScreenPoint::ZERO,
            scale: 1.0,
        }
    }
}

impl ClusterParams {
    /// Create cluster parameters.
    pub const fn new(center_offset: ScreenPoint, scale: f32) -> Self {
        Self {
            center_offset,
            scale,
        }
    }
}

/// One coordinate and the cluster it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub coord: GridCoordinate,
    /// `None` places the coordinate in [`DEFAULT_CLUSTER`].
    #[serde(default)]
    pub cluster: Option<String>,
}

/// Complete layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewport the layout is computed for.
    pub viewport: Size,
    /// Explicit reference radius; derived from the viewport when absent.
    pub reference_radius: Option<f32>,
    /// Fraction of the viewport's shorter side used when `reference_radius`
    /// is absent.
    pub radius_fraction: f32,
    /// Side length of each tile's square hit box.
    pub tile_extent: f32,
    /// Minimum distance between tile centers in one cluster; defaults to
    /// `tile_extent`.
    pub min_separation: Option<f32>,
    /// Vertical/horizontal semi-axis ratio of every ring.
    pub aspect: f32,
    /// Per-cluster placement.
    pub clusters: BTreeMap<String, ClusterParams>,
    /// Coordinate → cluster assignments.
    pub assignments: Vec<ClusterAssignment>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 720.0),
            reference_radius: None,
            radius_fraction: DEFAULT_RADIUS_FRACTION,
            tile_extent: DEFAULT_TILE_EXTENT,
            min_separation: None,
            aspect: DEFAULT_ASPECT,
            clusters: BTreeMap::new(),
            assignments: Vec::new(),
        }
    }
}

impl LayoutConfig {
    /// Create an empty configuration for the given viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Add or replace a cluster.
    #[must_use]
    pub fn with_cluster(mut self, name: impl Into<String>, params: ClusterParams) -> Self {
        self.clusters.insert(name.into(), params);
        self
    }

    /// Assign a coordinate to a cluster (`None` for the default cluster).
    #[must_use]
    pub fn assign(mut self, coord: GridCoordinate, cluster: Option<&str>) -> Self {
        self.assignments.push(ClusterAssignment {
            coord,
            cluster: cluster.map(str::to_owned),
        });
        self
    }

    /// Assign several coordinates to one cluster.
    #[must_use]
    pub fn assign_all(
        mut self,
        coords: impl IntoIterator<Item = GridCoordinate>,
        cluster: &str,
    ) -> Self {
        for coord in coords {
            self = self.assign(coord, Some(cluster));
        }
        self
    }

    /// Set an explicit reference radius.
    #[must_use]
    pub fn with_reference_radius(mut self, radius: f32) -> Self {
        self.reference_radius = Some(radius);
        self
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GridError> {
        toml::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GridError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, GridError> {
        serde_json::from_str(s).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Validate parameters.
    ///
    /// Returns a list of problems. An empty list means the config can
    /// produce a layout.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.viewport.is_empty() {
            errors.push(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            ));
        }
        if let Some(radius) = self.reference_radius
            && !(radius.is_finite() && radius >= 0.0)
        {
            errors.push(format!("reference_radius must be >= 0, got {radius}"));
        }
        if !(self.radius_fraction.is_finite() && self.radius_fraction >= 0.0) {
            errors.push(format!(
                "radius_fraction must be >= 0, got {}",
                self.radius_fraction
            ));
        }
        if !(self.tile_extent.is_finite() && self.tile_extent > 0.0) {
            errors.push(format!("tile_extent must be > 0, got {}", self.tile_extent));
        }
        if let Some(sep) = self.min_separation
            && !(sep.is_finite() && sep >= 0.0)
        {
            errors.push(format!("min_separation must be >= 0, got {sep}"));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            errors.push(format!("aspect must be > 0, got {}", self.aspect));
        }
        for (name, params) in &self.clusters {
            if !(params.scale.is_finite() && params.scale >= 0.0) {
                errors.push(format!(
                    "clusters.{name}.scale must be >= 0, got {}",
                    params.scale
                ));
            }
            if !params.center_offset.is_finite() {
                errors.push(format!("clusters.{name}.center_offset must be finite"));
            }
        }

        errors
    }

    /// The reference radius rings are scaled against.
    #[must_use]
    pub fn resolved_reference_radius(&self) -> f32 {
        self.reference_radius
            .unwrap_or(self.viewport.min_side() * self.radius_fraction)
    }

    /// Ring parameters shared by every cluster.
    #[must_use]
    pub fn ring_params(&self) -> RingParams {
        RingParams {
            reference_radius: self.resolved_reference_radius(),
            aspect: self.aspect,
            min_separation: self.min_separation.unwrap_or(self.tile_extent),
        }
    }

    /// Parameters for `name`, falling back to the default cluster's entry
    /// (or [`ClusterParams::default`]).
    #[must_use]
    pub fn params_for(&self, name: &str) -> ClusterParams {
        self.clusters
            .get(name)
            .or_else(|| self.clusters.get(DEFAULT_CLUSTER))
            .copied()
            .unwrap_or_default()
    }

    /// Partition the assigned coordinates by cluster.
    ///
    /// Clusters are keyed by name (sorted); members are sorted and unique.
    /// A coordinate assigned twice keeps its last assignment. Coordinates
    /// naming a cluster without parameters move to [`DEFAULT_CLUSTER`].
    #[must_use]
    pub fn cluster_groups(&self) -> BTreeMap<String, Vec<GridCoordinate>> {
        let mut owner: BTreeMap<GridCoordinate, &str> = BTreeMap::new();
        for assignment in &self.assignments {
            let name = match assignment.cluster.as_deref() {
                Some(name) if self.clusters.contains_key(name) => name,
                Some(name) => {
                    warn!(
                        cluster = name,
                        coord = %assignment.coord,
                        "cluster has no parameters; using default cluster"
                    );
                    DEFAULT_CLUSTER
                }
                None => DEFAULT_CLUSTER,
            };
            if let Some(previous) = owner.insert(assignment.coord, name)
                && previous != name
            {
                warn!(
                    coord = %assignment.coord,
                    from = previous,
                    to = name,
                    "coordinate reassigned"
                );
            }
        }

        let mut groups: BTreeMap<String, Vec<GridCoordinate>> = BTreeMap::new();
        // BTreeMap iteration keeps members sorted.
        for (coord, name) in owner {
            groups.entry(name.to_owned()).or_default().push(coord);
        }
        groups
    }
}
