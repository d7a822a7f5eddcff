//! Fixed-step semi-implicit (symplectic) Euler integration
//!
//! Velocity is advanced first, then position with the new velocity. Keeping
//! that order is what keeps closed orbits closed at the frame rates the demos
//! run at.

use super::forces::AccelSet;
use super::states::{Body, NVec2, System};

/// Advance one body by `dt` under acceleration `a`
/// v_n+1 = v_n + dt a_n
/// x_n+1 = x_n + dt v_n+1
/// The acceleration is stored on the body for drawing and diagnostics
pub fn semi_implicit_euler(body: &mut Body, a: NVec2, dt: f64) {
    body.a = a;
    body.v += dt * a;
    body.x += dt * body.v;
}

/// Integrate every moving body with accelerations computed beforehand
/// `accels[i]` belongs to `sys.bodies[i]`; `sys.t` is advanced by `dt`
pub fn step(sys: &mut System, accels: &[NVec2], dt: f64) {
    for (b, a) in sys.bodies.iter_mut().zip(accels.iter()) {
        semi_implicit_euler(b, *a, dt);
    }
    sys.t += dt;
}

/// Two-pass step: all accelerations from the current snapshot, then all
/// updates. `scratch` is resized to the body count and reused between calls
pub fn euler_integrator(sys: &mut System, forces: &AccelSet, dt: f64, scratch: &mut Vec<NVec2>) {
    let n = sys.bodies.len();
    if n == 0 { // no bodies, only time moves
        sys.t += dt;
        return;
    }

    scratch.clear();
    scratch.resize(n, NVec2::zeros());

    // a_n for every body at x_n, before anybody moves
    forces.accumulate_accels(sys.t, &*sys, scratch);

    step(sys, scratch, dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_uses_updated_velocity() {
        let mut b = Body::new(NVec2::zeros(), 1.0, 1.0);
        semi_implicit_euler(&mut b, NVec2::new(1.0, 0.0), 1.0);
        assert_eq!(b.v, NVec2::new(1.0, 0.0));
        assert_eq!(b.x, NVec2::new(1.0, 0.0));
        assert_eq!(b.a, NVec2::new(1.0, 0.0));
    }

    #[test]
    fn zero_dt_keeps_kinematics() {
        let mut b = Body::new(NVec2::new(3.0, -2.0), 1.0, 1.0).with_velocity(NVec2::new(0.5, 0.25));
        let before = b.clone();
        semi_implicit_euler(&mut b, NVec2::new(7.0, 7.0), 0.0);
        assert_eq!(b.x, before.x);
        assert_eq!(b.v, before.v);
    }

    #[test]
    fn empty_system_only_advances_time() {
        let mut sys = System::new(Vec::new(), None);
        let mut scratch = Vec::new();
        euler_integrator(&mut sys, &AccelSet::new(), 0.25, &mut scratch);
        assert_eq!(sys.t, 0.25);
    }
}
