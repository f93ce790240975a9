//! Interchangeable execution backends for coupled systems
//!
//! Every backend takes the same inputs (force model, time, state, step)
//! and applies the same RK4 formula through [`rk4_step_into`]; they only
//! differ in how the derivative is evaluated. Results agree up to
//! floating-point rounding.

use crate::error::SimResult;
use crate::simulation::forces::{CoupledForce, ParallelCoupledForce};
use crate::simulation::integrator::{check_step_size, rk4_step_into, Rk4Workspace};

/// Strategy for advancing a coupled state
pub trait StepBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// One RK4 step of `y` from `t` to `t + h`, written into `out`
    fn step_into(
        &self,
        model: &CoupledForce,
        t: f64,
        y: &[f64],
        h: f64,
        out: &mut [f64],
        ws: &mut Rk4Workspace,
    ) -> SimResult<()>;

    /// `steps` consecutive steps from `t0`; step `n` starts at `t0 + n h`
    fn advance(&self, model: &CoupledForce, t0: f64, y: &[f64], h: f64, steps: usize) -> SimResult<Vec<f64>> {
        let h = check_step_size(h)?;
        let mut cur = y.to_vec();
        let mut next = vec![0.0; y.len()];
        let mut ws = Rk4Workspace::new(y.len());
        for n in 0..steps {
            let t = t0 + n as f64 * h;
            self.step_into(model, t, &cur, h, &mut next, &mut ws)?;
            std::mem::swap(&mut cur, &mut next);
        }
        Ok(cur)
    }
}

/// Sequential evaluation on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl StepBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn step_into(
        &self,
        model: &CoupledForce,
        t: f64,
        y: &[f64],
        h: f64,
        out: &mut [f64],
        ws: &mut Rk4Workspace,
    ) -> SimResult<()> {
        rk4_step_into(model, t, y, h, out, ws)
    }
}

/// Per-body derivatives spread over the rayon thread pool
#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    /// Fewest bodies handed to one rayon task
    pub min_len: usize,
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self { min_len: 256 }
    }
}

impl StepBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn step_into(
        &self,
        model: &CoupledForce,
        t: f64,
        y: &[f64],
        h: f64,
        out: &mut [f64],
        ws: &mut Rk4Workspace,
    ) -> SimResult<()> {
        let par = ParallelCoupledForce::new(model, self.min_len);
        rk4_step_into(&par, t, y, h, out, ws)
    }
}
