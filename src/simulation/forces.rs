//! Force models for the oscillator engine
//!
//! A [`ForceModel`] maps `(t, y)` to `dy/dt` over the interleaved state
//! layout of [`SystemState`](crate::simulation::states::SystemState).
//! Implementations:
//! - [`OscillatorForce`]: one damped spring-mass in d dimensions with
//!   external force and gravity
//! - [`CoupledForce`]: N scalar oscillators joined by coupling springs
//! - [`ParallelCoupledForce`]: same physics, per-body terms on the rayon pool
//! - [`FnForce`]: any closure

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{SimError, SimResult};
use crate::simulation::params::{BodyParams, Coupling};

/// Right-hand side of `dy/dt = f(t, y)`
///
/// Must be a pure function of its inputs. `y` and `dydt` both have
/// length [`ForceModel::dimension`].
pub trait ForceModel {
    /// Length of the state vector this model acts on
    fn dimension(&self) -> usize;

    /// Write `dy/dt` at `(t, y)` into `dydt`
    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]);
}

impl<M: ForceModel + ?Sized> ForceModel for &M {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        (**self).derivative(t, y, dydt)
    }
}

/// Closure-backed force model
pub struct FnForce<F> {
    dim: usize,
    f: F,
}

impl<F> FnForce<F>
where
    F: Fn(f64, &[f64], &mut [f64]),
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> ForceModel for FnForce<F>
where
    F: Fn(f64, &[f64], &mut [f64]),
{
    fn dimension(&self) -> usize {
        self.dim
    }

    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        (self.f)(t, y, dydt)
    }
}

// =========================================================================================
// Single body
// =========================================================================================

/// Additive forcing term: fixed vector or function of time
#[derive(Clone)]
pub enum Forcing {
    Constant(DVector<f64>),
    TimeVarying(Arc<dyn Fn(f64) -> DVector<f64> + Send + Sync>),
}

impl Forcing {
    /// No forcing in `dim` dimensions
    pub fn zeros(dim: usize) -> Self {
        Forcing::Constant(DVector::zeros(dim))
    }

    pub fn constant(v: DVector<f64>) -> Self {
        Forcing::Constant(v)
    }

    pub fn time_varying<F>(f: F) -> Self
    where
        F: Fn(f64) -> DVector<f64> + Send + Sync + 'static,
    {
        Forcing::TimeVarying(Arc::new(f))
    }

    /// Value at time `t`
    pub fn at(&self, t: f64) -> Cow<'_, DVector<f64>> {
        match self {
            Forcing::Constant(v) => Cow::Borrowed(v),
            Forcing::TimeVarying(f) => Cow::Owned(f(t)),
        }
    }

    /// Check the term against a body of `dim` components.
    ///
    /// Time-varying terms are probed at t = 0 only. A closure must keep
    /// returning `dim` components afterwards; debug builds assert it during
    /// stepping, release builds treat missing components as zero and ignore
    /// extra ones.
    pub fn validate(&self, name: &str, dim: usize) -> SimResult<()> {
        let probe = self.at(0.0);
        if probe.len() != dim {
            return Err(SimError::InvalidParameter(format!(
                "{name} has {} components, body has {dim}",
                probe.len()
            )));
        }
        if probe.iter().any(|c| !c.is_finite()) {
            return Err(SimError::InvalidParameter(format!("{name} must be finite")));
        }
        Ok(())
    }
}

impl fmt::Debug for Forcing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Forcing::Constant(v) => f.debug_tuple("Constant").field(&v.as_slice()).finish(),
            Forcing::TimeVarying(_) => f.write_str("TimeVarying(..)"),
        }
    }
}

/// Damped spring-mass acting independently on each spatial component:
/// `m x'' = -k x - c x' + F(t) + m g(t)`
#[derive(Debug, Clone)]
pub struct OscillatorForce {
    pub(crate) params: BodyParams,
    pub(crate) external: Forcing,
    pub(crate) gravity: Forcing,
    dim: usize,
}

impl OscillatorForce {
    /// Unforced oscillator in `dim` dimensions
    pub fn new(params: BodyParams, dim: usize) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            external: Forcing::zeros(dim),
            gravity: Forcing::zeros(dim),
            dim,
        })
    }

    pub fn params(&self) -> BodyParams {
        self.params
    }

    pub fn external(&self) -> &Forcing {
        &self.external
    }

    pub fn gravity(&self) -> &Forcing {
        &self.gravity
    }
}

impl ForceModel for OscillatorForce {
    fn dimension(&self) -> usize {
        2 * self.dim
    }

    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        let BodyParams { m, c, k } = self.params;
        let f_ext = self.external.at(t);
        let g = self.gravity.at(t);
        debug_assert_eq!(f_ext.len(), self.dim, "external force changed dimension at t = {t}");
        debug_assert_eq!(g.len(), self.dim, "gravity changed dimension at t = {t}");

        for j in 0..self.dim {
            let x = y[2 * j];
            let v = y[2 * j + 1];
            // missing components read as zero in release builds
            let f = f_ext.get(j).copied().unwrap_or(0.0);
            let gj = g.get(j).copied().unwrap_or(0.0);

            dydt[2 * j] = v;
            dydt[2 * j + 1] = (-k * x - c * v + f + m * gj) / m;
        }
    }
}

// =========================================================================================
// Coupled network
// =========================================================================================

/// N scalar oscillators joined by linear coupling springs
#[derive(Debug, Clone)]
pub struct CoupledForce {
    bodies: Vec<BodyParams>,
    couplings: Vec<Coupling>,
    // neighbours[i]: (other body, constant) for every coupling touching i, in coupling order
    neighbours: Vec<Vec<(usize, f64)>>,
}

impl CoupledForce {
    /// Validate `bodies` and the coupling set, and index couplings per body
    pub fn new(bodies: Vec<BodyParams>, couplings: Vec<Coupling>) -> SimResult<Self> {
        for p in &bodies {
            p.validate()?;
        }
        let n = bodies.len();
        let mut neighbours = vec![Vec::new(); n];
        for c in &couplings {
            c.validate(n)?;
            neighbours[c.a].push((c.b, c.k));
            neighbours[c.b].push((c.a, c.k));
        }
        Ok(Self {
            bodies,
            couplings,
            neighbours,
        })
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &[BodyParams] {
        &self.bodies
    }

    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    /// Mutable access for validated setters on the owning system
    pub(crate) fn body_mut(&mut self, i: usize) -> Option<&mut BodyParams> {
        self.bodies.get_mut(i)
    }

    /// Net force on body `i` from its own spring and damper plus every coupling
    fn body_force(&self, i: usize, y: &[f64]) -> f64 {
        let p = &self.bodies[i];
        let x = y[2 * i];
        let v = y[2 * i + 1];
        let mut f = -p.k * x - p.c * v;
        for &(j, k) in &self.neighbours[i] {
            f += -k * (x - y[2 * j]);
        }
        f
    }
}

impl ForceModel for CoupledForce {
    fn dimension(&self) -> usize {
        2 * self.bodies.len()
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        // Own spring and damper
        for (i, p) in self.bodies.iter().enumerate() {
            let x = y[2 * i];
            let v = y[2 * i + 1];
            dydt[2 * i] = v;
            dydt[2 * i + 1] = -p.k * x - p.c * v;
        }

        // Each coupling pushes its two ends apart/together, equal and opposite
        for c in &self.couplings {
            let stretch = y[2 * c.a] - y[2 * c.b];
            dydt[2 * c.a + 1] -= c.k * stretch;
            dydt[2 * c.b + 1] += c.k * stretch;
        }

        for (i, p) in self.bodies.iter().enumerate() {
            dydt[2 * i + 1] /= p.m;
        }
    }
}

/// [`CoupledForce`] with each body's derivative evaluated on the rayon pool
pub struct ParallelCoupledForce<'a> {
    inner: &'a CoupledForce,
    min_len: usize,
}

impl<'a> ParallelCoupledForce<'a> {
    /// `min_len` is the smallest number of bodies a rayon task will take
    pub fn new(inner: &'a CoupledForce, min_len: usize) -> Self {
        Self {
            inner,
            min_len: min_len.max(1),
        }
    }
}

impl ForceModel for ParallelCoupledForce<'_> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let model = self.inner;
        dydt.par_chunks_mut(2)
            .with_min_len(self.min_len)
            .enumerate()
            .for_each(|(i, d)| {
                d[0] = y[2 * i + 1];
                d[1] = model.body_force(i, y) / model.bodies[i].m;
            });
    }
}
