//! Force / acceleration contributors for the n-body engine
//!
//! [`GravityLaw`] is the inverse-square law with the separation clamp. The
//! [`Acceleration`] terms apply it under one of the force policies and are
//! summed by an [`AccelSet`] into one acceleration per moving body.

use crate::simulation::barnes_hut::BarnesHutTree;
use crate::simulation::engine::{Engine, ForceMode};
use crate::simulation::params::{Parameters, UnitSystem};
use crate::simulation::states::{Body, NVec2, System};

/// Newtonian gravity in a fixed unit system
///
/// Distances below `min_separation` (in distance units, before scaling) are
/// clamped so that close encounters stay finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLaw {
    pub units: UnitSystem,
    pub min_separation: f64,
}

impl GravityLaw {
    pub fn new(units: UnitSystem, min_separation: f64) -> Self {
        Self {
            units,
            min_separation,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Self {
        Self::new(params.units, params.min_separation)
    }

    /// Acceleration on a body at `x` due to a source of mass `m` at `source`
    ///
    /// `a = -(G m / (scale d)^2) r_hat` with `r = x - source` and
    /// `d = max(|r|, min_separation)`. Coincident points have no defined
    /// direction and contribute nothing.
    pub fn acceleration_toward(&self, x: NVec2, source: NVec2, m: f64) -> NVec2 {
        let r = x - source;
        let dist = r.norm();
        if dist == 0.0 {
            return NVec2::zeros();
        }
        -(self.coefficient(dist) * m) * r
    }

    /// Superposition of [`GravityLaw::acceleration_toward`] over every body
    /// except `bodies[i]`
    pub fn acceleration_from(&self, i: usize, bodies: &[Body]) -> NVec2 {
        let xi = bodies[i].x;
        bodies
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .fold(NVec2::zeros(), |acc, (_, b)| acc + self.acceleration_toward(xi, b.x, b.m))
    }

    /// `G / ((scale d)^2 |r|)`, multiply by mass and `r` to get the pull
    fn coefficient(&self, dist: f64) -> f64 {
        let d = dist.max(self.min_separation) * self.units.scale;
        self.units.g / (d * d) / dist
    }
}

/// Collection of acceleration terms
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Gravity term matching the engine's force mode
    pub fn for_engine(engine: &Engine, params: &Parameters) -> Self {
        let law = GravityLaw::from_parameters(params);
        match engine.mode {
            ForceMode::Dominant => Self::new().with(DominantGravity { law }),
            ForceMode::Pairwise => Self::new().with(PairwiseGravity { law }),
            ForceMode::BarnesHut => Self::new().with(BarnesHutGravity {
                law,
                theta: engine.theta,
            }),
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t` for all moving bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, sys: &System, out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

/// Acceleration sources operating on a [`System`]
/// Implementations add their contribution into `out[i]` for each moving body
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &System, out: &mut [NVec2]);
}

/// Star-dominated gravity: each body feels only the fixed star
/// Mutual attraction between the moving bodies is ignored
pub struct DominantGravity {
    pub law: GravityLaw,
}

impl Acceleration for DominantGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let Some(star) = &sys.star else {
            return;
        };
        for (b, a) in sys.bodies.iter().zip(out.iter_mut()) {
            *a += self.law.acceleration_toward(b.x, star.x, star.m);
        }
    }
}

/// Direct n^2 gravity between all moving bodies
/// A star, when present, pulls on everyone but is never pulled back
pub struct PairwiseGravity {
    pub law: GravityLaw,
}

impl Acceleration for PairwiseGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let n = sys.bodies.len();

        // each unordered pair (i, j) with i < j once
        for i in 0..n {
            let bi = &sys.bodies[i];
            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let dist = r.norm();
                if dist == 0.0 {
                    continue;
                }
                let coef = self.law.coefficient(dist);

                // equal and opposite
                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }

        add_star_pull(&self.law, sys, out);
    }
}

/// Pairwise gravity evaluated through a Barnes-Hut quadtree
/// `theta` trades accuracy for speed (0 reproduces the direct sum)
pub struct BarnesHutGravity {
    pub law: GravityLaw,
    pub theta: f64,
}

impl Acceleration for BarnesHutGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        if !sys.bodies.is_empty() {
            let tree = BarnesHutTree::build(&sys.bodies);
            for (i, a) in out.iter_mut().enumerate().take(sys.bodies.len()) {
                *a += tree.acceleration_on(i, &sys.bodies, &self.law, self.theta);
            }
        }
        add_star_pull(&self.law, sys, out);
    }
}

fn add_star_pull(law: &GravityLaw, sys: &System, out: &mut [NVec2]) {
    if let Some(star) = &sys.star {
        for (b, a) in sys.bodies.iter().zip(out.iter_mut()) {
            *a += law.acceleration_toward(b.x, star.x, star.m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn law(g: f64) -> GravityLaw {
        GravityLaw::new(UnitSystem::toy(g), 1e-6)
    }

    #[test]
    fn pull_points_at_source() {
        let a = law(1.0).acceleration_toward(NVec2::new(2.0, 0.0), NVec2::zeros(), 4.0);
        assert_relative_eq!(a.x, -1.0);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn scale_applies_to_distance_only() {
        let units = UnitSystem { g: 1.0, scale: 10.0 };
        let a = GravityLaw::new(units, 1e-6).acceleration_toward(NVec2::new(0.0, 1.0), NVec2::zeros(), 100.0);
        // 1 * 100 / (10 * 1)^2
        assert_relative_eq!(a.y, -1.0);
    }

    #[test]
    fn clamp_caps_magnitude() {
        let l = GravityLaw::new(UnitSystem::toy(1.0), 0.5);
        let near = l.acceleration_toward(NVec2::new(1e-9, 0.0), NVec2::zeros(), 1.0);
        let at_clamp = l.acceleration_toward(NVec2::new(0.5, 0.0), NVec2::zeros(), 1.0);
        assert_relative_eq!(near.norm(), at_clamp.norm(), max_relative = 1e-12);
        assert_relative_eq!(near.norm(), 4.0, max_relative = 1e-12);
    }

    #[test]
    fn pairwise_matches_per_body_sum() {
        let bodies = vec![
            Body::new(NVec2::new(0.0, 0.0), 1.0, 0.1),
            Body::new(NVec2::new(3.0, 0.5), 2.0, 0.1),
            Body::new(NVec2::new(-1.0, 2.0), 0.5, 0.1),
            Body::new(NVec2::new(1.5, -2.5), 4.0, 0.1),
        ];
        let sys = System::new(bodies, None);
        let l = law(0.3);
        let set = AccelSet::new().with(PairwiseGravity { law: l });
        let mut out = vec![NVec2::zeros(); 4];
        set.accumulate_accels(0.0, &sys, &mut out);

        for (i, a) in out.iter().enumerate() {
            let expected = l.acceleration_from(i, &sys.bodies);
            assert_relative_eq!(a.x, expected.x, max_relative = 1e-12);
            assert_relative_eq!(a.y, expected.y, max_relative = 1e-12);
        }
    }

    #[test]
    fn dominant_without_star_adds_nothing() {
        let sys = System::new(vec![Body::new(NVec2::new(1.0, 1.0), 1.0, 1.0)], None);
        let set = AccelSet::new().with(DominantGravity { law: law(1.0) });
        let mut out = vec![NVec2::new(5.0, 5.0)];
        set.accumulate_accels(0.0, &sys, &mut out);
        assert_eq!(out[0], NVec2::zeros());
    }
}
