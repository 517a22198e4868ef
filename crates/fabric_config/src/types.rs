//! Configuration types deserialized from `fabric.toml`.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

/// The top-level run configuration parsed from `fabric.toml`.
#[derive(Debug, Deserialize)]
pub struct FabricConfig {
    /// Which device database to load.
    pub device: DeviceConfig,
    /// Placement settings.
    #[serde(default)]
    pub place: PlaceConfig,
    /// Routing settings.
    #[serde(default)]
    pub route: RouteConfig,
    /// Delay and cost estimator tuning.
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

/// The `[device]` section.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Path to the binary chip database, relative to the configuration directory.
    pub chipdb: String,
}

/// The `[place]` section.
#[derive(Debug, Deserialize)]
pub struct PlaceConfig {
    /// The placer name, `"sa"` or `"heap"`.
    #[serde(default = "default_placer")]
    pub placer: String,
}

fn default_placer() -> String {
    PlacerKind::Sa.name().to_string()
}

impl Default for PlaceConfig {
    fn default() -> Self {
        Self {
            placer: default_placer(),
        }
    }
}

/// The `[route]` section.
#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    /// Base penalty, in picoseconds, for ripping up a routed wire.
    #[serde(default = "default_ripup_penalty")]
    pub ripup_delay_penalty: i32,
}

fn default_ripup_penalty() -> i32 {
    250
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            ripup_delay_penalty: default_ripup_penalty(),
        }
    }
}

/// The `[estimator]` section.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EstimatorConfig {
    /// Number of bel z-slots grouped into one placement sub-cluster.
    #[serde(default = "default_cluster_bels")]
    pub cluster_bels: u32,
    /// Distance below which the bounding-box cost is always zero.
    #[serde(default = "default_bbox_threshold")]
    pub bbox_cost_threshold: i32,
    /// Cost per unit of distance above the threshold.
    #[serde(default)]
    pub bbox_cost_per_unit: i32,
}

fn default_cluster_bels() -> u32 {
    16
}

fn default_bbox_threshold() -> i32 {
    5
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            cluster_bels: default_cluster_bels(),
            bbox_cost_threshold: default_bbox_threshold(),
            bbox_cost_per_unit: 0,
        }
    }
}

/// The placement engine selected for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacerKind {
    /// Simulated annealing.
    Sa,
    /// Analytical heap placement.
    Heap,
}

impl PlacerKind {
    /// Parses a placer name; any name other than `"sa"` or `"heap"` is rejected.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "sa" => Ok(PlacerKind::Sa),
            "heap" => Ok(PlacerKind::Heap),
            other => Err(ConfigError::UnknownPlacer(other.to_string())),
        }
    }

    /// The name used in configuration files and settings.
    pub fn name(self) -> &'static str {
        match self {
            PlacerKind::Sa => "sa",
            PlacerKind::Heap => "heap",
        }
    }
}

impl fmt::Display for PlacerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FabricConfig {
    /// Returns the configured placer.
    pub fn placer(&self) -> Result<PlacerKind, ConfigError> {
        PlacerKind::parse(&self.place.placer)
    }
}
