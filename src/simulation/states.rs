//! Core state types for the oscillator simulation.
//!
//! - `SystemState`: flat interleaved `(x0, v0, x1, v1, ...)` state vector
//! - `Body`: one scalar body (initial state + parameters) used to build a
//!   coupled system
//! - `Sample` / `Trajectory`: time-stamped states recorded by `simulate`
//!
//! A d-dimensional single body uses the same layout, with one slot per
//! spatial component.

use nalgebra::DVector;

use crate::error::{SimError, SimResult};
use crate::simulation::params::BodyParams;

/// Position/velocity state of every slot in a system, interleaved
#[derive(Debug, Clone, PartialEq)]
pub struct SystemState {
    y: Vec<f64>, // x0, v0, x1, v1, ...
}

impl SystemState {
    /// Wrap an interleaved vector; its length must be even
    pub fn from_interleaved(y: Vec<f64>) -> SimResult<Self> {
        if y.len() % 2 != 0 {
            return Err(SimError::InvalidTopology(format!(
                "interleaved state must have even length, got {}",
                y.len()
            )));
        }
        Ok(Self { y })
    }

    /// Interleave (position, velocity) pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let y = pairs.into_iter().flat_map(|(x, v)| [x, v]).collect();
        Self { y }
    }

    /// Wrap a buffer produced by stepping a state that was already valid
    pub(crate) fn wrap(y: Vec<f64>) -> Self {
        debug_assert!(y.len() % 2 == 0);
        Self { y }
    }

    /// Build from parallel position and velocity sequences of equal length
    pub fn from_parallel(x: &[f64], v: &[f64]) -> SimResult<Self> {
        if x.len() != v.len() {
            return Err(SimError::InvalidTopology(format!(
                "{} positions but {} velocities",
                x.len(),
                v.len()
            )));
        }
        Ok(Self::from_pairs(x.iter().copied().zip(v.iter().copied())))
    }

    /// Build a single body state from nalgebra vectors
    pub fn from_vectors(x: &DVector<f64>, v: &DVector<f64>) -> SimResult<Self> {
        Self::from_parallel(x.as_slice(), v.as_slice())
    }

    /// Split back into (positions, velocities)
    pub fn to_parallel(&self) -> (Vec<f64>, Vec<f64>) {
        let x = self.y.iter().step_by(2).copied().collect();
        let v = self.y.iter().skip(1).step_by(2).copied().collect();
        (x, v)
    }

    /// Split into nalgebra (position, velocity) vectors
    pub fn to_vectors(&self) -> (DVector<f64>, DVector<f64>) {
        let (x, v) = self.to_parallel();
        (DVector::from_vec(x), DVector::from_vec(v))
    }

    /// Number of (position, velocity) slots
    pub fn num_bodies(&self) -> usize {
        self.y.len() / 2
    }

    pub fn position(&self, i: usize) -> f64 {
        self.y[2 * i]
    }

    pub fn velocity(&self, i: usize) -> f64 {
        self.y[2 * i + 1]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.y
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.y
    }

    /// True if every component is finite; a step that blows up is not an
    /// error, so callers check this when they care
    pub fn is_finite(&self) -> bool {
        self.y.iter().all(|c| c.is_finite())
    }
}

/// One scalar body of a coupled system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f64, // initial position
    pub v: f64, // initial velocity
    pub params: BodyParams,
}

/// State at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub state: SystemState,
}

/// Append-only record of a run, owned by whoever drives the simulation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    /// Room for the initial sample plus `steps` more; large runs grow as they go
    pub fn for_steps(steps: usize) -> Self {
        const PREALLOC_SAMPLES: usize = 1 << 16;
        Self::with_capacity(steps.saturating_add(1).min(PREALLOC_SAMPLES))
    }

    pub fn push(&mut self, t: f64, state: SystemState) {
        self.samples.push(Sample { t, state });
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    /// Position history of slot `i`
    pub fn positions(&self, i: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.state.position(i)).collect()
    }

    /// Velocity history of slot `i`
    pub fn velocities(&self, i: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.state.velocity(i)).collect()
    }
}
