//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – execution backend for the coupled stepper
//! - [`ParametersConfig`] – run length and fixed step size
//! - [`BodyConfig`]       – initial state and coefficients of each body
//! - [`CouplingConfig`]   – springs between pairs of bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! Three masses in a chain:
//!
//! ```yaml
//! engine:
//!   backend: "cpu"          # or "parallel"
//!
//! parameters:
//!   t_end: 10.0             # total simulation time
//!   h0: 0.01                # fixed step size
//!
//! bodies:
//!   - { x: 1.0,  v: 0.0, m: 1.0, c: 0.1, k: 2.0 }
//!   - { x: 0.0,  v: 0.0, m: 1.0, c: 0.1, k: 2.0 }
//!   - { x: -1.0, v: 0.0, m: 1.0, c: 0.1, k: 2.0 }
//!
//! couplings:
//!   - { a: 0, b: 1, k: 1.0 }
//!   - { a: 1, b: 2, k: 1.0 }
//!
//! modal: true               # also report natural frequencies
//! ```
//!
//! Nothing here is validated; [`Scenario::build_scenario`](crate::Scenario::build_scenario)
//! does that while mapping into runtime types.

use serde::Deserialize;

/// Which backend steps the coupled system
/// `backend: "cpu"` or `backend: "parallel"`
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendConfig {
    #[default]
    #[serde(rename = "cpu")] // Sequential derivative evaluation on the calling thread
    Cpu,

    #[serde(rename = "parallel")] // Per-body derivatives on the rayon pool
    Parallel,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub backend: BackendConfig, // how each step is evaluated
    pub min_len: Option<usize>, // smallest rayon task, in bodies (parallel only)
}

/// Global numerical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64,    // time step size
}

/// Configuration for a single body's initial state and coefficients
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: f64, // initial position
    #[serde(default)]
    pub v: f64, // initial velocity
    pub m: f64, // mass
    #[serde(default)]
    pub c: f64, // damping coefficient
    pub k: f64, // spring constant to the fixed point
}

/// Spring between bodies `a` and `b`
#[derive(Deserialize, Debug, Clone)]
pub struct CouplingConfig {
    pub a: usize,
    pub b: usize,
    pub k: f64,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // backend selection
    pub parameters: ParametersConfig, // run length and step size
    pub bodies: Vec<BodyConfig>, // bodies that define the initial state of the system
    #[serde(default)]
    pub couplings: Vec<CouplingConfig>, // springs between bodies
    #[serde(default)]
    pub modal: bool, // report natural frequencies
}
