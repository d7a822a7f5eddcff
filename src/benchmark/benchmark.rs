use std::time::Instant;

use crate::simulation::engine::{Engine, ForceMode};
use crate::simulation::forces::{Acceleration, BarnesHutGravity, DominantGravity, GravityLaw, PairwiseGravity};
use crate::simulation::driver::Simulation;
use crate::simulation::params::{Parameters, UnitSystem};
use crate::simulation::states::{Body, NVec2, System};

/// Helper to build a deterministic ring-ish system of size `n` around a star
fn make_system(n: usize) -> System {
    let bodies = (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec2::new((i_f * 0.37).sin() * 300.0, (i_f * 0.13).cos() * 300.0);
            Body::new(x, 1000.0, 1.0)
        })
        .collect();
    System::new(bodies, Some(Body::new(NVec2::zeros(), 6.5e31, 20.0)))
}

fn make_params() -> Parameters {
    Parameters {
        units: UnitSystem::physical(1e8),
        min_separation: 1.0,
        time_scale: 10.0,
        dt: 0.01,
        ..Parameters::default()
    }
}

/// Time one force evaluation per model for growing `n`
pub fn bench_gravity() {
    let ns = [250, 500, 1000, 2000, 4000, 8000];
    let law = GravityLaw::from_parameters(&make_params());

    let dominant = DominantGravity { law };
    let direct = PairwiseGravity { law };
    let bh = BarnesHutGravity { law, theta: 0.7 };

    for n in ns {
        let sys = make_system(n);
        let mut out = vec![NVec2::zeros(); n];

        // Warm up
        direct.acceleration(0.0, &sys, &mut out);
        bh.acceleration(0.0, &sys, &mut out);

        let dt_dominant = time_term(&dominant, &sys, &mut out);
        let dt_direct = time_term(&direct, &sys, &mut out);
        let dt_bh = time_term(&bh, &sys, &mut out);

        println!("N = {n:5}, dominant = {dt_dominant:8.6} s, direct = {dt_direct:8.6} s, BH = {dt_bh:8.6} s");
    }
}

fn time_term(term: &dyn Acceleration, sys: &System, out: &mut [NVec2]) -> f64 {
    let t0 = Instant::now();
    term.acceleration(0.0, sys, out);
    t0.elapsed().as_secs_f64()
}

/// Milliseconds per full tick for each force mode, CSV for plotting
pub fn bench_tick_curve() {
    println!("N,dominant_ms,direct_ms,bh_ms");

    for n in (500..=10_000).step_by(500) {
        // Small n: average a few ticks, large n: one tick
        let ticks = if n <= 2000 { 5 } else { 1 };

        let mut row = Vec::with_capacity(3);
        for mode in [ForceMode::Dominant, ForceMode::Pairwise, ForceMode::BarnesHut] {
            let sys = make_system(n);
            let params = make_params();
            let dt = params.dt;
            let mut sim = match Simulation::initialize(sys.bodies, sys.star, Engine::new(mode), params) {
                Ok(sim) => sim,
                Err(e) => {
                    eprintln!("benchmark setup failed: {e:#}");
                    return;
                }
            };

            let t0 = Instant::now();
            for _ in 0..ticks {
                sim.tick(dt);
            }
            row.push(t0.elapsed().as_secs_f64() * 1000.0 / ticks as f64);
        }

        println!("{},{:.6},{:.6},{:.6}", n, row[0], row[1], row[2]);
    }
}
