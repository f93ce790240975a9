//! N scalar oscillators joined by pairwise coupling springs
//!
//! Each body has its own mass, damper and spring to a fixed point; every
//! coupling `(a, b, K)` adds `-K (x_a - x_b)` to `a` and the opposite to
//! `b`. The whole network is stepped as one 2N-dimensional state.

use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::simulation::backend::{CpuBackend, StepBackend};
use crate::simulation::forces::CoupledForce;
use crate::simulation::integrator::{rk4_step_into, Rk4Workspace};
use crate::simulation::params::{
    check_coefficient, check_finite, check_mass, checked_steps, BodyParams, Coupling,
};
use crate::simulation::states::{Body, SystemState, Trajectory};

/// Coupled spring-mass network with its initial state
#[derive(Debug, Clone)]
pub struct CoupledSystem {
    force: CoupledForce,
    initial: SystemState,
}

impl CoupledSystem {
    /// Build from parallel per-body sequences plus the coupling set
    ///
    /// # Errors
    /// `InvalidTopology` if the per-body sequences differ in length, N is
    /// zero, `coupling_constants` does not match `couplings`, or a coupling
    /// is out of range or self-referencing. `InvalidParameter` for bad values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        masses: &[f64],
        dampings: &[f64],
        stiffnesses: &[f64],
        initial_positions: &[f64],
        initial_velocities: &[f64],
        couplings: &[(usize, usize)],
        coupling_constants: &[f64],
    ) -> SimResult<Self> {
        let n = masses.len();
        let lengths = [
            ("dampings", dampings.len()),
            ("stiffnesses", stiffnesses.len()),
            ("initial positions", initial_positions.len()),
            ("initial velocities", initial_velocities.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(SimError::InvalidTopology(format!("{n} masses but {len} {name}")));
            }
        }
        if couplings.len() != coupling_constants.len() {
            return Err(SimError::InvalidTopology(format!(
                "{} couplings but {} coupling constants",
                couplings.len(),
                coupling_constants.len()
            )));
        }

        let bodies = (0..n)
            .map(|i| {
                Ok(Body {
                    x: initial_positions[i],
                    v: initial_velocities[i],
                    params: BodyParams::new(masses[i], dampings[i], stiffnesses[i])?,
                })
            })
            .collect::<SimResult<Vec<_>>>()?;
        let couplings = couplings
            .iter()
            .zip(coupling_constants)
            .map(|(&(a, b), &k)| Coupling::new(a, b, k))
            .collect();

        Self::from_bodies(bodies, couplings)
    }

    /// Build from structured bodies and couplings
    pub fn from_bodies(bodies: Vec<Body>, couplings: Vec<Coupling>) -> SimResult<Self> {
        if bodies.is_empty() {
            return Err(SimError::InvalidTopology("system has no bodies".into()));
        }
        for b in &bodies {
            check_finite("initial position", b.x)?;
            check_finite("initial velocity", b.v)?;
        }

        let initial = SystemState::from_pairs(bodies.iter().map(|b| (b.x, b.v)));
        let params = bodies.iter().map(|b| b.params).collect();
        let force = CoupledForce::new(params, couplings)?;

        debug!(
            bodies = force.num_bodies(),
            couplings = force.couplings().len(),
            "built coupled system"
        );
        Ok(Self { force, initial })
    }

    pub fn num_bodies(&self) -> usize {
        self.force.num_bodies()
    }

    pub fn bodies(&self) -> &[BodyParams] {
        self.force.bodies()
    }

    pub fn couplings(&self) -> &[Coupling] {
        self.force.couplings()
    }

    pub fn force_model(&self) -> &CoupledForce {
        &self.force
    }

    pub fn initial_state(&self) -> &SystemState {
        &self.initial
    }

    fn body_mut(&mut self, i: usize) -> SimResult<&mut BodyParams> {
        let n = self.num_bodies();
        self.force
            .body_mut(i)
            .ok_or_else(|| SimError::InvalidTopology(format!("body {i} out of range 0..{n}")))
    }

    pub fn set_mass(&mut self, i: usize, m: f64) -> SimResult<()> {
        let m = check_mass(m)?;
        self.body_mut(i)?.m = m;
        Ok(())
    }

    pub fn set_damping(&mut self, i: usize, c: f64) -> SimResult<()> {
        let c = check_coefficient("damping", c)?;
        self.body_mut(i)?.c = c;
        Ok(())
    }

    pub fn set_stiffness(&mut self, i: usize, k: f64) -> SimResult<()> {
        let k = check_coefficient("stiffness", k)?;
        self.body_mut(i)?.k = k;
        Ok(())
    }

    /// One RK4 step of every body from `t` to `t + h`
    pub fn step(&self, t: f64, state: &SystemState, h: f64) -> SimResult<SystemState> {
        let mut out = vec![0.0; state.as_slice().len()];
        let mut ws = Rk4Workspace::new(out.len());
        rk4_step_into(&self.force, t, state.as_slice(), h, &mut out, &mut ws)?;
        Ok(SystemState::wrap(out))
    }

    /// `steps` fixed steps from `t0` on the given backend
    pub fn advance(
        &self,
        backend: &dyn StepBackend,
        t0: f64,
        state: &SystemState,
        h: f64,
        steps: usize,
    ) -> SimResult<SystemState> {
        self.check_state(state)?;
        debug!(backend = backend.name(), steps, h, "advancing coupled system");
        let y = backend.advance(&self.force, t0, state.as_slice(), h, steps)?;
        Ok(SystemState::wrap(y))
    }

    /// Run from the initial state at t = 0 on the CPU backend
    pub fn simulate(&self, total_time: f64, h: f64) -> SimResult<Trajectory> {
        self.simulate_with(&CpuBackend, total_time, h)
    }

    /// Run from the initial state at t = 0 for `floor(total_time / h)` steps
    ///
    /// Records the initial sample plus one per step, at times `k h`.
    pub fn simulate_with(&self, backend: &dyn StepBackend, total_time: f64, h: f64) -> SimResult<Trajectory> {
        let steps = checked_steps(total_time, h)?;
        info!(
            backend = backend.name(),
            bodies = self.num_bodies(),
            steps,
            h,
            "simulating coupled system"
        );

        let mut traj = Trajectory::for_steps(steps);
        let mut y = self.initial.as_slice().to_vec();
        let mut next = vec![0.0; y.len()];
        let mut ws = Rk4Workspace::new(y.len());

        traj.push(0.0, self.initial.clone());
        for n in 0..steps {
            let t = n as f64 * h;
            backend.step_into(&self.force, t, &y, h, &mut next, &mut ws)?;
            std::mem::swap(&mut y, &mut next);
            traj.push((n + 1) as f64 * h, SystemState::wrap(y.clone()));
        }

        if let Some(last) = traj.last() {
            if !last.state.is_finite() {
                warn!(t = last.t, "state left the finite range; step size may be too large");
            }
        }
        Ok(traj)
    }

    /// Kinetic energy plus the potential stored in every spring and coupling
    ///
    /// # Errors
    /// `InvalidTopology` if `state` does not hold one slot per body.
    pub fn energy(&self, state: &SystemState) -> SimResult<f64> {
        self.check_state(state)?;
        let own: f64 = self
            .bodies()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = state.position(i);
                let v = state.velocity(i);
                0.5 * p.m * v * v + 0.5 * p.k * x * x
            })
            .sum();
        let coupled: f64 = self
            .couplings()
            .iter()
            .map(|c| {
                let stretch = state.position(c.a) - state.position(c.b);
                0.5 * c.k * stretch * stretch
            })
            .sum();
        Ok(own + coupled)
    }

    fn check_state(&self, state: &SystemState) -> SimResult<()> {
        if state.num_bodies() == self.num_bodies() {
            Ok(())
        } else {
            Err(SimError::InvalidTopology(format!(
                "state has {} bodies, system has {}",
                state.num_bodies(),
                self.num_bodies()
            )))
        }
    }
}
