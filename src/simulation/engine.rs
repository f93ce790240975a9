//! High-level runtime engine settings
//!
//! Selects the backend used when running a `Scenario`

use crate::configuration::config::{BackendConfig, EngineConfig};
use crate::simulation::backend::{CpuBackend, ParallelBackend, StepBackend};

#[derive(Debug, Clone)]
pub struct Engine {
    pub backend: BackendConfig, // cpu or parallel
    pub min_len: usize,         // rayon task granularity for the parallel backend
}

impl Engine {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            backend: cfg.backend,
            min_len: cfg.min_len.unwrap_or(ParallelBackend::default().min_len),
        }
    }

    /// Instantiate the selected backend
    pub fn backend(&self) -> Box<dyn StepBackend> {
        match self.backend {
            BackendConfig::Cpu => Box::new(CpuBackend),
            BackendConfig::Parallel => Box::new(ParallelBackend { min_len: self.min_len }),
        }
    }
}
