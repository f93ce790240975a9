pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Body, Sample, SystemState, Trajectory};
pub use simulation::params::{BodyParams, Coupling, Parameters};
pub use simulation::forces::{CoupledForce, FnForce, ForceModel, Forcing, OscillatorForce, ParallelCoupledForce};
pub use simulation::integrator::{rk4_step, rk4_step_into, Rk4Workspace};
pub use simulation::oscillator::MechanicalSystem;
pub use simulation::coupled::CoupledSystem;
pub use simulation::backend::{CpuBackend, ParallelBackend, StepBackend};
pub use simulation::modal::ModalAnalysis;
pub use simulation::scenario::Scenario;

pub use configuration::config::{BackendConfig, BodyConfig, CouplingConfig, EngineConfig, ParametersConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_backends, bench_backends_curve};
