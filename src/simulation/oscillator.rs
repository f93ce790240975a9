//! Single damped spring-mass with optional external force and gravity
//!
//! The body may move in d dimensions; each component obeys
//! `m x'' = -k x - c x' + F(t) + m g(t)` on its own. Position and velocity
//! queries go through one RK4 step of the shared integrator.

use nalgebra::DVector;
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::simulation::forces::{Forcing, OscillatorForce};
use crate::simulation::integrator::{rk4_step_into, Rk4Workspace};
use crate::simulation::params::{check_coefficient, check_finite, check_mass, checked_steps, BodyParams};
use crate::simulation::states::{SystemState, Trajectory};

/// One mass on a spring to a fixed point, with a damper
#[derive(Debug, Clone)]
pub struct MechanicalSystem {
    force: OscillatorForce,
    x0: DVector<f64>, // initial position
    v0: DVector<f64>, // initial velocity
}

impl MechanicalSystem {
    /// Build a body with mass `m`, damping `c`, stiffness `k` and initial
    /// state `(x0, v0)`
    ///
    /// # Errors
    /// `InvalidParameter` for a bad coefficient or non-finite initial state,
    /// `InvalidTopology` if `x0` and `v0` differ in length or are empty.
    pub fn new(m: f64, c: f64, k: f64, x0: DVector<f64>, v0: DVector<f64>) -> SimResult<Self> {
        let params = BodyParams::new(m, c, k)?;
        if x0.len() != v0.len() || x0.is_empty() {
            return Err(SimError::InvalidTopology(format!(
                "initial position has {} components, velocity has {}",
                x0.len(),
                v0.len()
            )));
        }
        for (&x, &v) in x0.iter().zip(v0.iter()) {
            check_finite("initial position", x)?;
            check_finite("initial velocity", v)?;
        }
        let dim = x0.len();
        Ok(Self {
            force: OscillatorForce::new(params, dim)?,
            x0,
            v0,
        })
    }

    /// Classic one-dimensional oscillator
    pub fn scalar(m: f64, c: f64, k: f64, x0: f64, v0: f64) -> SimResult<Self> {
        Self::new(m, c, k, DVector::from_element(1, x0), DVector::from_element(1, v0))
    }

    pub fn mass(&self) -> f64 {
        self.force.params.m
    }

    pub fn damping(&self) -> f64 {
        self.force.params.c
    }

    pub fn stiffness(&self) -> f64 {
        self.force.params.k
    }

    pub fn params(&self) -> BodyParams {
        self.force.params
    }

    /// Number of spatial components
    pub fn dimension(&self) -> usize {
        self.x0.len()
    }

    pub fn initial_position(&self) -> &DVector<f64> {
        &self.x0
    }

    pub fn initial_velocity(&self) -> &DVector<f64> {
        &self.v0
    }

    pub fn external_force(&self) -> &Forcing {
        &self.force.external
    }

    pub fn gravity(&self) -> &Forcing {
        &self.force.gravity
    }

    /// Force model this body integrates, for use with other steppers
    pub fn force_model(&self) -> &OscillatorForce {
        &self.force
    }

    pub fn set_mass(&mut self, m: f64) -> SimResult<()> {
        self.force.params.m = check_mass(m)?;
        Ok(())
    }

    pub fn set_damping(&mut self, c: f64) -> SimResult<()> {
        self.force.params.c = check_coefficient("damping", c)?;
        Ok(())
    }

    pub fn set_stiffness(&mut self, k: f64) -> SimResult<()> {
        self.force.params.k = check_coefficient("stiffness", k)?;
        Ok(())
    }

    pub fn set_external_force(&mut self, force: Forcing) -> SimResult<()> {
        force.validate("external force", self.dimension())?;
        self.force.external = force;
        Ok(())
    }

    pub fn set_gravity(&mut self, gravity: Forcing) -> SimResult<()> {
        gravity.validate("gravity", self.dimension())?;
        self.force.gravity = gravity;
        Ok(())
    }

    /// One RK4 step from `(x, v)` at time `t`; returns `(x, v)` at `t + h`
    ///
    /// Both components come from the same k1..k4.
    pub fn advance(
        &self,
        t: f64,
        x: &DVector<f64>,
        v: &DVector<f64>,
        h: f64,
    ) -> SimResult<(DVector<f64>, DVector<f64>)> {
        if x.len() != self.dimension() || v.len() != self.dimension() {
            return Err(SimError::InvalidTopology(format!(
                "state ({}, {}) does not match body dimension {}",
                x.len(),
                v.len(),
                self.dimension()
            )));
        }
        let y = SystemState::from_vectors(x, v)?;
        let next = self.step(t, &y, h)?;
        Ok(next.to_vectors())
    }

    /// Position at `t + h`
    pub fn position(&self, t: f64, x: &DVector<f64>, v: &DVector<f64>, h: f64) -> SimResult<DVector<f64>> {
        self.advance(t, x, v, h).map(|(x, _)| x)
    }

    /// Velocity at `t + h`
    pub fn velocity(&self, t: f64, x: &DVector<f64>, v: &DVector<f64>, h: f64) -> SimResult<DVector<f64>> {
        self.advance(t, x, v, h).map(|(_, v)| v)
    }

    /// One RK4 step on the interleaved state
    pub fn step(&self, t: f64, state: &SystemState, h: f64) -> SimResult<SystemState> {
        let mut out = vec![0.0; state.as_slice().len()];
        let mut ws = Rk4Workspace::new(out.len());
        rk4_step_into(&self.force, t, state.as_slice(), h, &mut out, &mut ws)?;
        Ok(SystemState::wrap(out))
    }

    pub fn initial_state(&self) -> SystemState {
        SystemState::from_pairs(self.x0.iter().copied().zip(self.v0.iter().copied()))
    }

    /// Mechanical energy `1/2 m |v|^2 + 1/2 k |x|^2`
    pub fn energy(&self, x: &DVector<f64>, v: &DVector<f64>) -> f64 {
        let BodyParams { m, k, .. } = self.force.params;
        0.5 * m * v.norm_squared() + 0.5 * k * x.norm_squared()
    }

    /// Energy of an interleaved state
    pub fn state_energy(&self, state: &SystemState) -> f64 {
        let (x, v) = state.to_vectors();
        self.energy(&x, &v)
    }

    /// Step from the initial state at t = 0 for `floor(total_time / h)` steps
    ///
    /// The trajectory holds the initial sample plus one per step, at times `k h`.
    pub fn simulate(&self, total_time: f64, h: f64) -> SimResult<Trajectory> {
        let steps = checked_steps(total_time, h)?;
        debug!(steps, h, dim = self.dimension(), "simulating single body");

        let mut traj = Trajectory::for_steps(steps);
        let mut y = self.initial_state().into_inner();
        let mut next = vec![0.0; y.len()];
        let mut ws = Rk4Workspace::new(y.len());

        traj.push(0.0, SystemState::wrap(y.clone()));
        for n in 0..steps {
            let t = n as f64 * h;
            rk4_step_into(&self.force, t, &y, h, &mut next, &mut ws)?;
            std::mem::swap(&mut y, &mut next);
            traj.push((n + 1) as f64 * h, SystemState::wrap(y.clone()));
        }
        Ok(traj)
    }
}
