pub mod simulation;
pub mod configuration;
pub mod diagnostics;
pub mod benchmark;

pub use simulation::states::{Body, System, NVec2};
pub use simulation::forces::{Acceleration, AccelSet, GravityLaw, DominantGravity, PairwiseGravity, BarnesHutGravity};
pub use simulation::integrator::{semi_implicit_euler, euler_integrator};
pub use simulation::engine::{Engine, ForceMode, MergePolicy, MergeThreshold, Bounds};
pub use simulation::params::{Parameters, UnitSystem, G_SI};
pub use simulation::driver::Simulation;
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, BeltConfig, ScenarioConfig};

pub use diagnostics::period::{Axis, PeriodEstimator};

pub use benchmark::benchmark::{bench_gravity, bench_tick_curve};
