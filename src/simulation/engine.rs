//! High-level runtime engine settings
//!
//! Selects the force model, the optional merge and bounce rules, and how a
//! tick is subdivided

use serde::Deserialize;

use crate::simulation::states::NVec2;

/// How gravitational acceleration is gathered for each body
/// `mode: "dominant"`, `"pairwise"` or `"barnes_hut"` in YAML
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    #[serde(rename = "dominant")] // every body feels the fixed star only
    Dominant,

    #[serde(rename = "pairwise")] // direct n^2 sum, star (if any) as an extra fixed source
    Pairwise,

    #[serde(rename = "barnes_hut")] // quadtree approximation of the pairwise sum
    BarnesHut,
}

/// Distance below which two bodies merge
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeThreshold {
    #[serde(rename = "first_radius")] // radius of the lower-index body
    FirstRadius,

    #[serde(rename = "radius_sum")]
    RadiusSum,
}

/// Simplified merge rule from the two-body demo
///
/// The merged body keeps the first body's position, sums the masses, grows
/// the first radius by `growth` and starts at rest. Momentum is not
/// conserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePolicy {
    pub threshold: MergeThreshold,
    pub growth: f64,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            threshold: MergeThreshold::FirstRadius,
            growth: 1.44,
        }
    }
}

/// Axis-aligned box used for edge bouncing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: NVec2,
    pub max: NVec2,
}

impl Bounds {
    pub fn new(min: NVec2, max: NVec2) -> Self {
        Self { min, max }
    }

    /// Box from the origin to `(width, height)`, screen style
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(NVec2::zeros(), NVec2::new(width, height))
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub mode: ForceMode,
    pub theta: f64, // Barnes-Hut opening angle
    pub substeps: u32, // integration passes per tick, 1 = plain tick
    pub merge: Option<MergePolicy>,
    pub bounds: Option<Bounds>,
}

impl Engine {
    pub fn new(mode: ForceMode) -> Self {
        Self {
            mode,
            theta: 0.7,
            substeps: 1,
            merge: None,
            bounds: None,
        }
    }

    pub fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps;
        self
    }
}
