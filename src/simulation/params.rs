//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - the unit convention (`UnitSystem`: gravitational constant and scale),
//! - the separation clamp that keeps close encounters finite,
//! - the time scale applied to every tick,
//! - fixed frame time, run length and belt seed for the headless host

/// Real gravitational constant in N m^2 kg^-2
pub const G_SI: f64 = 6.674e-11;

/// Unit convention shared by every force evaluation
///
/// Separations are converted with `scale` (meters per distance unit) before
/// the inverse-square law is applied. The resulting acceleration is used
/// directly in distance units per second squared, so the belt demos can keep
/// positions in pixels while masses and `g` stay in SI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSystem {
    pub g: f64, // gravitational constant
    pub scale: f64, // meters per distance unit
}

impl UnitSystem {
    /// Real `G` with an explicit distance scale (1.0 means 1 unit = 1 m)
    pub fn physical(scale: f64) -> Self {
        Self { g: G_SI, scale }
    }

    /// Inflated, non-physical `g` in abstract units
    pub fn toy(g: f64) -> Self {
        Self { g, scale: 1.0 }
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::physical(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub units: UnitSystem, // G and distance scale
    pub min_separation: f64, // distance clamp (epsilon)
    pub time_scale: f64, // RATE, multiplies every tick's dt
    pub dt: f64, // fixed frame time used by the host loop
    pub t_end: f64, // simulated time the host loop runs for
    pub seed: u64, // deterministic seed for sampled scenarios
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            min_separation: 1.0e-3,
            time_scale: 1.0,
            dt: 0.01,
            t_end: 10.0,
            seed: 42,
        }
    }
}
