//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the coupled system with its initial state (`CoupledSystem`)
//!
//! All validation happens here, through the same constructors the library
//! API uses.

use tracing::info;

use crate::configuration::config::{BodyConfig, CouplingConfig, ScenarioConfig};
use crate::error::SimResult;
use crate::simulation::coupled::CoupledSystem;
use crate::simulation::engine::Engine;
use crate::simulation::modal::ModalAnalysis;
use crate::simulation::params::{BodyParams, Coupling, Parameters};
use crate::simulation::states::{Body, Trajectory};

/// Runtime bundle constructed from a [`ScenarioConfig`]
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: CoupledSystem,
    pub modal: bool,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        // Bodies: map `BodyConfig` -> runtime `Body`
        let bodies = cfg
            .bodies
            .iter()
            .map(|bc: &BodyConfig| {
                Ok(Body {
                    x: bc.x,
                    v: bc.v,
                    params: BodyParams::new(bc.m, bc.c, bc.k)?,
                })
            })
            .collect::<SimResult<Vec<_>>>()?;

        let couplings = cfg
            .couplings
            .iter()
            .map(|cc: &CouplingConfig| Coupling::new(cc.a, cc.b, cc.k))
            .collect();

        let system = CoupledSystem::from_bodies(bodies, couplings)?;
        let parameters = Parameters::new(cfg.parameters.t_end, cfg.parameters.h0)?;
        let engine = Engine::from_config(&cfg.engine);

        info!(
            bodies = system.num_bodies(),
            couplings = system.couplings().len(),
            backend = ?engine.backend,
            steps = parameters.steps(),
            "scenario built"
        );

        Ok(Self {
            engine,
            parameters,
            system,
            modal: cfg.modal,
        })
    }

    /// Simulate `t_end` with step `h0` on the configured backend
    pub fn run(&self) -> SimResult<Trajectory> {
        let backend = self.engine.backend();
        self.system
            .simulate_with(backend.as_ref(), self.parameters.t_end, self.parameters.h0)
    }

    /// Natural frequencies of the coupled network, if requested
    pub fn modal_analysis(&self) -> SimResult<Option<ModalAnalysis>> {
        if self.modal {
            ModalAnalysis::from_coupled(&self.system).map(Some)
        } else {
            Ok(None)
        }
    }
}
