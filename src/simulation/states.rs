//! Core state types for the N-body simulation.
//!
//! - `Body`   a point mass with position, velocity and the acceleration
//!   computed for it on the last tick
//! - `System` the moving bodies, the optional fixed star, and the
//!   accumulated simulation time `t`

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub a: NVec2, // acceleration from the last force evaluation
    pub m: f64, // mass
    pub radius: f64, // merge / bounce / drawing size, never enters the force law
}

impl Body {
    /// A body at rest with zero acceleration
    pub fn new(x: NVec2, m: f64, radius: f64) -> Self {
        Self {
            x,
            v: NVec2::zeros(),
            a: NVec2::zeros(),
            m,
            radius,
        }
    }

    pub fn with_velocity(mut self, v: NVec2) -> Self {
        self.v = v;
        self
    }

    pub fn momentum(&self) -> NVec2 {
        self.m * self.v
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.x - other.x).norm()
    }

    /// z-component of `m (r × v)` with `r` measured from `origin`
    pub fn angular_momentum_about(&self, origin: &NVec2) -> f64 {
        let r = self.x - origin;
        self.m * (r.x * self.v.y - r.y * self.v.x)
    }

    /// true when position, velocity and acceleration are all finite
    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).chain(self.a.iter()).all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // moving bodies, order is drawing order only
    pub star: Option<Body>, // fixed attractor, never integrated
    pub t: f64, // simulated time
}

impl System {
    pub fn new(bodies: Vec<Body>, star: Option<Body>) -> Self {
        Self {
            bodies,
            star,
            t: 0.0,
        }
    }

    /// Sum of `m v` over the moving bodies (the fixed star carries none)
    pub fn total_momentum(&self) -> NVec2 {
        self.bodies.iter().fold(NVec2::zeros(), |p, b| p + b.momentum())
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_momentum_of_circular_motion() {
        // m |v| |r| for a tangential velocity
        let b = Body::new(NVec2::new(3.0, 0.0), 2.0, 1.0).with_velocity(NVec2::new(0.0, 4.0));
        assert_eq!(b.angular_momentum_about(&NVec2::zeros()), 24.0);
        assert_eq!(b.angular_momentum_about(&NVec2::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn momentum_skips_star() {
        let star = Body::new(NVec2::zeros(), 1e9, 5.0).with_velocity(NVec2::new(10.0, 0.0));
        let a = Body::new(NVec2::new(1.0, 0.0), 1.0, 1.0).with_velocity(NVec2::new(0.0, 2.0));
        let b = Body::new(NVec2::new(-1.0, 0.0), 3.0, 1.0).with_velocity(NVec2::new(1.0, 0.0));
        let sys = System::new(vec![a, b], Some(star));
        assert_eq!(sys.total_momentum(), NVec2::new(3.0, 2.0));
        assert_eq!(sys.total_mass(), 4.0);
    }

    #[test]
    fn non_finite_state_is_detected() {
        let mut b = Body::new(NVec2::zeros(), 1.0, 1.0);
        assert!(b.is_finite());
        b.a.x = f64::NAN;
        assert!(!b.is_finite());
    }
}
