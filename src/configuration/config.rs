//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force mode, Barnes–Hut angle, substeps, merge and bounce rules
//! - [`ParametersConfig`] – unit system, separation clamp, time scale, frame time
//! - [`BodyConfig`]       – initial state for the star and each literal body
//! - [`BeltConfig`]       – optional randomly sampled ring of bodies around the star
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! The single-orbit demo:
//!
//! ```yaml
//! engine:
//!   mode: "dominant"        # "dominant", "pairwise" or "barnes_hut"
//!
//! parameters:
//!   G: 6.674e-11            # gravitational constant
//!   scale: 1.0              # meters per distance unit (default 1)
//!   min_separation: 1.0e-3  # distance clamp
//!   time_scale: 5.0         # RATE
//!   dt: 0.01                # frame time of the host loop
//!   t_end: 150.0            # simulated time to run
//!
//! star:
//!   x: [ 500.0, 360.0 ]
//!   m: 6.5e15
//!   radius: 20.0
//!
//! bodies:
//!   - x: [ 750.0, 360.0 ]
//!     v: [   0.0,  45.0 ]
//!     m: 5.0
//!     radius: 10.0
//! ```
//!
//! Optional engine keys: `theta` (Barnes–Hut, default 0.7), `substeps`
//! (default 1), `merge: { threshold: "first_radius" | "radius_sum", growth }`
//! and `bounds: { min: [x, y], max: [x, y] }`. A `belt` section samples
//! `count` extra bodies around the star (see [`BeltConfig`]).

use serde::Deserialize;

use crate::simulation::engine::{ForceMode, MergeThreshold};

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub mode: ForceMode, // which force policy the engine runs
    pub theta: Option<f64>, // Barnes-Hut opening angle
    pub substeps: Option<u32>, // integration passes per tick, opt-in
    pub merge: Option<MergeConfig>, // merge touching bodies
    pub bounds: Option<BoundsConfig>, // bounce off the box edges
}

/// Merge rule, both keys default to the two-body demo's values
#[derive(Deserialize, Debug, Clone)]
pub struct MergeConfig {
    pub threshold: Option<MergeThreshold>,
    pub growth: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoundsConfig {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

fn default_scale() -> f64 {
    1.0
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    #[serde(default = "default_scale")]
    pub scale: f64, // meters per distance unit
    pub min_separation: f64, // clamp on distance before the inverse square
    pub time_scale: f64, // RATE
    pub dt: f64, // fixed frame time
    pub t_end: f64, // simulated run length
    pub seed: Option<u64>, // deterministic seed for the belt
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // position in distance units
    #[serde(default)]
    pub v: Vec<f64>, // velocity, omitted means at rest (always ignored for the star)
    pub m: f64, // mass
    pub radius: f64, // merge / bounce / drawing radius
}

/// Ring of bodies sampled around the star
///
/// Each body gets a uniform angle, a Gaussian orbital radius and a Gaussian
/// speed along the tangent, all drawn from one seeded generator.
#[derive(Deserialize, Debug, Clone)]
pub struct BeltConfig {
    pub count: usize,
    pub mean_radius: f64,
    pub radius_sigma: f64,
    pub mean_speed: f64,
    pub speed_sigma: f64,
    pub mass: f64, // per body
    pub radius: f64, // per body
    pub center: Option<Vec<f64>>, // defaults to the star position
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub star: Option<BodyConfig>, // fixed attractor
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // literal bodies, in drawing order
    pub belt: Option<BeltConfig>, // sampled bodies, appended after `bodies`
}
