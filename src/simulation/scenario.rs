//! Build runnable scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario` holding:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the fixed star and the moving bodies at t = 0, including any sampled belt
//!
//! [`Scenario::into_simulation`] validates the bundle and hands it to the
//! tick driver.

use std::f64::consts::TAU;

use anyhow::{bail, ensure, Context, Result};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::configuration::config::{BeltConfig, BodyConfig, EngineConfig, ParametersConfig, ScenarioConfig};
use crate::simulation::driver::Simulation;
use crate::simulation::engine::{Bounds, Engine, MergePolicy};
use crate::simulation::params::{Parameters, UnitSystem};
use crate::simulation::states::{Body, NVec2};

/// Seed used when the scenario does not set one
pub const DEFAULT_SEED: u64 = 42;

/// Fully mapped scenario, not yet validated
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub star: Option<Body>,
    pub bodies: Vec<Body>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let engine = build_engine(&cfg.engine)?;
        let parameters = build_parameters(&cfg.parameters);

        // Star: fixed, so any configured velocity is dropped
        let star = match &cfg.star {
            Some(sc) => Some(Body::new(vec2(&sc.x, "star position")?, sc.m, sc.radius)),
            None => None,
        };

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let mut bodies = cfg
            .bodies
            .iter()
            .enumerate()
            .map(|(i, bc)| build_body(bc).with_context(|| format!("body {i}")))
            .collect::<Result<Vec<_>>>()?;

        if let Some(belt) = &cfg.belt {
            let center = match (&belt.center, &star) {
                (Some(c), _) => vec2(c, "belt center")?,
                (None, Some(s)) => s.x,
                (None, None) => bail!("belt needs a center or a star"),
            };
            bodies.extend(sample_belt(belt, center, parameters.seed)?);
        }

        Ok(Self {
            engine,
            parameters,
            star,
            bodies,
        })
    }

    /// Validate and start the simulation
    pub fn into_simulation(self) -> Result<Simulation> {
        Simulation::initialize(self.bodies, self.star, self.engine, self.parameters)
    }
}

/// Sample `belt.count` bodies on near-circular orbits around `center`
///
/// Angle is uniform in [0, 2pi), orbital radius and speed are Gaussian. The
/// body sits at `center + (-r sin(angle), r cos(angle))` and moves along the
/// tangent `(c.y, -c.x) / |c|` with `c = center - x`.
pub fn sample_belt(belt: &BeltConfig, center: NVec2, seed: u64) -> Result<Vec<Body>> {
    ensure!(belt.mass.is_finite() && belt.mass > 0.0, "belt mass must be positive, got {}", belt.mass);
    ensure!(belt.radius.is_finite() && belt.radius > 0.0, "belt body radius must be positive, got {}", belt.radius);
    ensure!(belt.mean_radius.is_finite(), "belt mean radius must be finite, got {}", belt.mean_radius);
    ensure!(belt.mean_speed.is_finite(), "belt mean speed must be finite, got {}", belt.mean_speed);
    // Normal::new accepts a negative sigma, so check here
    ensure!(
        belt.radius_sigma.is_finite() && belt.radius_sigma >= 0.0,
        "belt radius sigma must be non-negative, got {}",
        belt.radius_sigma
    );
    ensure!(
        belt.speed_sigma.is_finite() && belt.speed_sigma >= 0.0,
        "belt speed sigma must be non-negative, got {}",
        belt.speed_sigma
    );

    let radius_dist = Normal::new(belt.mean_radius, belt.radius_sigma)
        .with_context(|| format!("belt radius distribution ({}, {})", belt.mean_radius, belt.radius_sigma))?;
    let speed_dist = Normal::new(belt.mean_speed, belt.speed_sigma)
        .with_context(|| format!("belt speed distribution ({}, {})", belt.mean_speed, belt.speed_sigma))?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bodies = Vec::with_capacity(belt.count);

    for _ in 0..belt.count {
        let angle: f64 = rng.gen_range(0.0..TAU);
        let r = radius_dist.sample(&mut rng);
        let x = center + NVec2::new(-r * angle.sin(), r * angle.cos());

        let speed = speed_dist.sample(&mut rng);
        let c = center - x;
        let dist = c.norm();
        let v = if dist > 0.0 {
            speed * NVec2::new(c.y, -c.x) / dist
        } else {
            NVec2::zeros()
        };

        bodies.push(Body::new(x, belt.mass, belt.radius).with_velocity(v));
    }

    info!("sampled {} belt bodies around ({:.1}, {:.1}) with seed {seed}", belt.count, center.x, center.y);

    Ok(bodies)
}

fn build_engine(cfg: &EngineConfig) -> Result<Engine> {
    let mut engine = Engine::new(cfg.mode);
    if let Some(theta) = cfg.theta {
        engine.theta = theta;
    }
    if let Some(substeps) = cfg.substeps {
        engine.substeps = substeps;
    }
    if let Some(m) = &cfg.merge {
        let defaults = MergePolicy::default();
        engine.merge = Some(MergePolicy {
            threshold: m.threshold.unwrap_or(defaults.threshold),
            growth: m.growth.unwrap_or(defaults.growth),
        });
    }
    if let Some(b) = &cfg.bounds {
        engine.bounds = Some(Bounds::new(vec2(&b.min, "bounds min")?, vec2(&b.max, "bounds max")?));
    }
    Ok(engine)
}

fn build_parameters(cfg: &ParametersConfig) -> Parameters {
    Parameters {
        units: UnitSystem {
            g: cfg.g,
            scale: cfg.scale,
        },
        min_separation: cfg.min_separation,
        time_scale: cfg.time_scale,
        dt: cfg.dt,
        t_end: cfg.t_end,
        seed: cfg.seed.unwrap_or(DEFAULT_SEED),
    }
}

fn build_body(bc: &BodyConfig) -> Result<Body> {
    let x = vec2(&bc.x, "position")?;
    let v = if bc.v.is_empty() {
        NVec2::zeros()
    } else {
        vec2(&bc.v, "velocity")?
    };
    Ok(Body::new(x, bc.m, bc.radius).with_velocity(v))
}

fn vec2(values: &[f64], what: &str) -> Result<NVec2> {
    match values {
        [x, y] => Ok(NVec2::new(*x, *y)),
        _ => bail!("{what} needs 2 components, got {}", values.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn belt(count: usize) -> BeltConfig {
        BeltConfig {
            count,
            mean_radius: 300.0,
            radius_sigma: 5.0,
            mean_speed: 37.0,
            speed_sigma: 1.0,
            mass: 1000.0,
            radius: 1.0,
            center: None,
        }
    }

    #[test]
    fn belt_is_reproducible_per_seed() {
        let center = NVec2::new(450.0, 450.0);
        let a = sample_belt(&belt(64), center, 7).unwrap();
        let b = sample_belt(&belt(64), center, 7).unwrap();
        let c = sample_belt(&belt(64), center, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn belt_velocity_is_tangential() {
        let center = NVec2::new(450.0, 450.0);
        for b in sample_belt(&belt(200), center, 1).unwrap() {
            let r = b.x - center;
            assert!(r.dot(&b.v).abs() < 1e-9 * r.norm() * b.v.norm().max(1.0));
            assert!((r.norm() - 300.0).abs() < 40.0);
        }
    }

    #[test]
    fn negative_sigma_is_rejected() {
        let mut cfg = belt(1);
        cfg.radius_sigma = -1.0;
        assert!(sample_belt(&cfg, NVec2::zeros(), 1).is_err());

        let mut cfg = belt(1);
        cfg.speed_sigma = -0.5;
        assert!(sample_belt(&cfg, NVec2::zeros(), 1).is_err());
    }

    #[test]
    fn non_finite_belt_parameters_are_rejected() {
        let mut cfg = belt(1);
        cfg.mean_radius = f64::NAN;
        assert!(sample_belt(&cfg, NVec2::zeros(), 1).is_err());

        let mut cfg = belt(1);
        cfg.mean_speed = f64::INFINITY;
        assert!(sample_belt(&cfg, NVec2::zeros(), 1).is_err());

        let mut cfg = belt(1);
        cfg.speed_sigma = f64::NAN;
        assert!(sample_belt(&cfg, NVec2::zeros(), 1).is_err());
    }

    #[test]
    fn zero_sigma_gives_a_perfect_ring() {
        let mut cfg = belt(16);
        cfg.radius_sigma = 0.0;
        cfg.speed_sigma = 0.0;
        let center = NVec2::new(10.0, -5.0);
        for b in sample_belt(&cfg, center, 3).unwrap() {
            assert!(((b.x - center).norm() - 300.0).abs() < 1e-9);
            assert!((b.v.norm() - 37.0).abs() < 1e-9);
        }
    }

    #[test]
    fn vector_arity_is_checked() {
        assert!(vec2(&[1.0, 2.0, 3.0], "position").is_err());
        assert_eq!(vec2(&[1.0, 2.0], "position").unwrap(), NVec2::new(1.0, 2.0));
    }
}
