use orbitsim::{Axis, PeriodEstimator, Scenario, ScenarioConfig, Simulation};
use orbitsim::{bench_gravity, bench_tick_curve};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Headless host loop: runs a scenario at a fixed frame time and logs what a
/// window would have shown
#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML, looked up under `scenarios/` when not found as given
    #[arg(short, long, default_value = "single_orbit.yaml")]
    file_name: String,

    /// Number of ticks to run instead of `t_end`
    #[arg(long)]
    steps: Option<usize>,

    /// Body whose x-velocity feeds the orbital period estimate
    #[arg(long, default_value_t = 0)]
    track: usize,

    /// Log a progress line every this many ticks
    #[arg(long, default_value_t = 1000)]
    report_every: usize,

    /// Run the force-model benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let mut config_path = PathBuf::from(file_name);
    if !config_path.exists() {
        config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    }

    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn run(sim: &mut Simulation, ticks: usize, track: usize, report_every: usize) {
    let dt = sim.parameters().dt;
    let mut period = PeriodEstimator::new(Axis::X);

    for tick in 1..=ticks {
        let before = sim.bodies().get(track).cloned();
        let time = sim.simulation_time();
        sim.tick(dt);
        if let (Some(before), Some(after)) = (before, sim.bodies().get(track)) {
            period.observe_body(&before, after, time);
        }

        if report_every > 0 && tick % report_every == 0 {
            let period_text = match period.period() {
                Some(p) => format!("{p:.2}"),
                None => "calculating".to_string(),
            };
            info!(
                "tick {tick}: t = {:.2}, bodies = {}, orbital period = {period_text}",
                sim.simulation_time(),
                sim.bodies().len(),
            );
        }
    }

    let sys = sim.system();
    info!("finished at t = {:.3} after {ticks} ticks", sys.t);
    info!("bodies: {} (merges: {})", sys.bodies.len(), sim.merge_count());
    info!("total momentum: ({:.6e}, {:.6e})", sys.total_momentum().x, sys.total_momentum().y);
    info!("kinetic energy: {:.6e}", sys.kinetic_energy());
    if let Some(p) = period.period() {
        info!("estimated orbital period of body {track}: {p:.3} ({} half periods)", period.half_periods());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_tick_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("building scenario")?;
    let mut sim = scenario.into_simulation().context("invalid scenario")?;

    let p = sim.parameters();
    let ticks = args.steps.unwrap_or_else(|| sim.ticks_for(p.t_end, p.dt));
    info!(
        "running {ticks} ticks in {:?} mode (substeps {}, merge {}, bounds {})",
        sim.engine().mode,
        sim.engine().substeps,
        sim.engine().merge.is_some(),
        sim.engine().bounds.is_some(),
    );

    run(&mut sim, ticks, args.track, args.report_every);

    Ok(())
}
