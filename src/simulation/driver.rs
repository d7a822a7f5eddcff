//! Tick-driven simulation handle
//!
//! `Simulation` owns the bodies, the fixed star, the active force set and
//! the numeric parameters. The host loop calls [`Simulation::tick`] once per
//! frame with the real elapsed time and reads [`Simulation::bodies`] to draw.

use anyhow::{ensure, Result};
use log::{debug, info, warn};

use crate::simulation::engine::{Bounds, Engine, ForceMode, MergePolicy, MergeThreshold};
use crate::simulation::forces::AccelSet;
use crate::simulation::integrator::euler_integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, System};

pub struct Simulation {
    engine: Engine,
    parameters: Parameters,
    system: System,
    forces: AccelSet,
    scratch: Vec<NVec2>, // acceleration buffer reused every pass
    merge_count: usize,
}

impl Simulation {
    /// Validate the configuration and build a simulation at `t = 0`
    ///
    /// Rejects non-positive or non-finite masses and radii, non-finite
    /// initial states, unusable parameters, and dominant mode without a star.
    /// Initial accelerations are computed so the first frame can be drawn
    /// with them.
    pub fn initialize(bodies: Vec<Body>, star: Option<Body>, engine: Engine, parameters: Parameters) -> Result<Self> {
        for (i, b) in bodies.iter().enumerate() {
            validate_body(b).map_err(|e| e.context(format!("body {i}")))?;
        }
        if let Some(s) = &star {
            validate_body(s).map_err(|e| e.context("star"))?;
        }
        validate_parameters(&parameters)?;
        validate_engine(&engine, star.is_some())?;

        let forces = AccelSet::for_engine(&engine, &parameters);
        let system = System::new(bodies, star);

        info!(
            "initialized {:?} simulation with {} bodies{}",
            engine.mode,
            system.bodies.len(),
            if system.star.is_some() { " around a fixed star" } else { "" },
        );

        let mut sim = Self {
            engine,
            parameters,
            system,
            forces,
            scratch: Vec::new(),
            merge_count: 0,
        };
        sim.refresh_accelerations();
        Ok(sim)
    }

    /// Advance by one frame of `dt` real seconds
    ///
    /// The simulated step is `dt * time_scale`, split into `substeps` equal
    /// passes. Each pass computes every acceleration from one snapshot before
    /// any body moves. Merge and bounce rules run once after integration.
    /// A zero step leaves every body untouched.
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("ignoring tick with invalid dt {dt}");
            0.0
        };

        let h = dt * self.parameters.time_scale;
        if h == 0.0 {
            return;
        }

        let h_sub = h / self.engine.substeps as f64;
        let t_start = self.system.t;
        for _ in 0..self.engine.substeps {
            euler_integrator(&mut self.system, &self.forces, h_sub, &mut self.scratch);
        }
        // keep the clock exact regardless of how the step was split
        self.system.t = t_start + h;

        if let Some(policy) = self.engine.merge {
            self.resolve_merges(policy);
        }
        if let Some(bounds) = self.engine.bounds {
            bounce(&mut self.system.bodies, &bounds);
        }
    }

    /// Number of fixed frames of `dt` needed to cover `duration` simulated
    /// time, 0 when the frames do not advance the clock
    pub fn ticks_for(&self, duration: f64, dt: f64) -> usize {
        let h = dt * self.parameters.time_scale;
        if h.is_nan() || h <= 0.0 || !duration.is_finite() || duration <= 0.0 {
            return 0;
        }
        (duration / h).round() as usize
    }

    /// Read-only view for drawing
    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    pub fn star(&self) -> Option<&Body> {
        self.system.star.as_ref()
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Accumulated `time_scale * dt`, for diagnostics only
    pub fn simulation_time(&self) -> f64 {
        self.system.t
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn merge_count(&self) -> usize {
        self.merge_count
    }

    /// true once any merge has happened, never reset
    pub fn is_merged(&self) -> bool {
        self.merge_count > 0
    }

    /// Recompute the stored acceleration of every body without moving it
    fn refresh_accelerations(&mut self) {
        let n = self.system.bodies.len();
        self.scratch.clear();
        self.scratch.resize(n, NVec2::zeros());
        self.forces.accumulate_accels(self.system.t, &self.system, &mut self.scratch);
        for (b, a) in self.system.bodies.iter_mut().zip(self.scratch.iter()) {
            b.a = *a;
        }
    }

    /// Replace each touching pair by one merged body
    ///
    /// Pairs are scanned in index order and a body takes part in at most one
    /// merge per tick. The merged body sits at the lower index.
    fn resolve_merges(&mut self, policy: MergePolicy) {
        let bodies = &mut self.system.bodies;
        let n = bodies.len();
        let mut consumed = vec![false; n];
        let mut merged_any = false;

        for i in 0..n {
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..n {
                if consumed[j] {
                    continue;
                }
                let threshold = match policy.threshold {
                    MergeThreshold::FirstRadius => bodies[i].radius,
                    MergeThreshold::RadiusSum => bodies[i].radius + bodies[j].radius,
                };
                if bodies[i].distance_to(&bodies[j]) < threshold {
                    let merged = merge_bodies(&bodies[i], &bodies[j], policy.growth);
                    debug!(
                        "merged bodies {i} and {j} at t = {:.3}: mass {} radius {}",
                        self.system.t, merged.m, merged.radius
                    );
                    bodies[i] = merged;
                    consumed[j] = true;
                    merged_any = true;
                    self.merge_count += 1;
                    break;
                }
            }
        }

        if merged_any {
            let mut idx = 0;
            bodies.retain(|_| {
                let keep = !consumed[idx];
                idx += 1;
                keep
            });
        }
    }
}

/// Merged body of the two-body demo: masses add, the first body's radius
/// grows by `growth`, it keeps the first position and starts at rest
pub fn merge_bodies(a: &Body, b: &Body, growth: f64) -> Body {
    Body::new(a.x, a.m + b.m, a.radius * growth)
}

/// Reverse a velocity component when the body's edge crosses the bounds on
/// that axis; positions are left as they are
pub fn bounce(bodies: &mut [Body], bounds: &Bounds) {
    for b in bodies.iter_mut() {
        for axis in 0..2 {
            if b.x[axis] - b.radius < bounds.min[axis] || b.x[axis] + b.radius > bounds.max[axis] {
                b.v[axis] = -b.v[axis];
            }
        }
    }
}

fn validate_body(b: &Body) -> Result<()> {
    ensure!(b.m.is_finite() && b.m > 0.0, "mass must be positive and finite, got {}", b.m);
    ensure!(b.radius.is_finite() && b.radius > 0.0, "radius must be positive and finite, got {}", b.radius);
    ensure!(b.is_finite(), "position, velocity and acceleration must be finite");
    Ok(())
}

fn validate_parameters(p: &Parameters) -> Result<()> {
    ensure!(p.units.g.is_finite() && p.units.g > 0.0, "G must be positive and finite, got {}", p.units.g);
    ensure!(p.units.scale.is_finite() && p.units.scale > 0.0, "scale must be positive and finite, got {}", p.units.scale);
    ensure!(
        p.min_separation.is_finite() && p.min_separation > 0.0,
        "min_separation must be positive and finite, got {}",
        p.min_separation
    );
    ensure!(
        p.time_scale.is_finite() && p.time_scale >= 0.0,
        "time_scale must be non-negative and finite, got {}",
        p.time_scale
    );
    ensure!(p.dt.is_finite() && p.dt >= 0.0, "dt must be non-negative and finite, got {}", p.dt);
    Ok(())
}

fn validate_engine(engine: &Engine, has_star: bool) -> Result<()> {
    ensure!(engine.substeps >= 1, "substeps must be at least 1");
    if engine.mode == ForceMode::Dominant {
        ensure!(has_star, "dominant mode needs a star");
    }
    if engine.mode == ForceMode::BarnesHut {
        ensure!(engine.theta.is_finite() && engine.theta >= 0.0, "theta must be non-negative, got {}", engine.theta);
    }
    if let Some(merge) = &engine.merge {
        ensure!(merge.growth.is_finite() && merge.growth > 0.0, "merge growth must be positive, got {}", merge.growth);
    }
    if let Some(bounds) = &engine.bounds {
        ensure!(
            bounds.min.x < bounds.max.x && bounds.min.y < bounds.max.y,
            "bounds min must be below max on both axes"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_flips_only_the_crossing_axis() {
        let bounds = Bounds::from_size(100.0, 100.0);
        let mut bodies = vec![
            Body::new(NVec2::new(98.0, 50.0), 1.0, 5.0).with_velocity(NVec2::new(3.0, 2.0)),
            Body::new(NVec2::new(50.0, 50.0), 1.0, 5.0).with_velocity(NVec2::new(3.0, 2.0)),
            Body::new(NVec2::new(2.0, 2.0), 1.0, 5.0).with_velocity(NVec2::new(-1.0, -1.0)),
        ];
        bounce(&mut bodies, &bounds);
        assert_eq!(bodies[0].v, NVec2::new(-3.0, 2.0));
        assert_eq!(bodies[1].v, NVec2::new(3.0, 2.0));
        assert_eq!(bodies[2].v, NVec2::new(1.0, 1.0));
    }

    fn lone_body(time_scale: f64) -> Simulation {
        let params = Parameters {
            time_scale,
            ..Parameters::default()
        };
        let bodies = vec![Body::new(NVec2::new(1.0, 0.0), 1.0, 1.0)];
        Simulation::initialize(bodies, None, Engine::new(ForceMode::Pairwise), params).unwrap()
    }

    #[test]
    fn ticks_for_covers_the_duration() {
        let mut sim = lone_body(1.0);
        let ticks = sim.ticks_for(1.0, 0.01);
        assert_eq!(ticks, 100);
        for _ in 0..ticks {
            sim.tick(0.01);
        }
        assert!((sim.simulation_time() - 1.0).abs() < 1e-9);

        assert_eq!(lone_body(5.0).ticks_for(150.0, 0.01), 3000);
    }

    #[test]
    fn ticks_for_frozen_clock_is_zero() {
        assert_eq!(lone_body(0.0).ticks_for(10.0, 0.01), 0);
        assert_eq!(lone_body(1.0).ticks_for(10.0, -0.01), 0);
        assert_eq!(lone_body(1.0).ticks_for(f64::INFINITY, 0.01), 0);
    }

    #[test]
    fn merged_body_follows_the_demo_rule() {
        let a = Body::new(NVec2::new(1.0, 2.0), 150.0, 5.0).with_velocity(NVec2::new(0.0, 50.0));
        let b = Body::new(NVec2::new(1.5, 2.0), 150.0, 5.0).with_velocity(NVec2::new(0.0, -50.0));
        let m = merge_bodies(&a, &b, 1.44);
        assert_eq!(m.m, 300.0);
        assert_eq!(m.radius, 5.0 * 1.44);
        assert_eq!(m.x, a.x);
        assert_eq!(m.v, NVec2::zeros());
    }
}
