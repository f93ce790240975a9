//! Physical and numerical parameters for the simulation
//!
//! - `BodyParams`: mass, damping and spring constant of one oscillator
//! - `Coupling`: a spring between two distinct bodies
//! - `Parameters`: run length and fixed step size
//!
//! All checks live here so constructors and setters reject bad values
//! the same way

use crate::error::{SimError, SimResult};

/// Mass must be finite, strictly positive and have a finite reciprocal
pub fn check_mass(m: f64) -> SimResult<f64> {
    if m.is_finite() && m > 0.0 && m.recip().is_finite() {
        Ok(m)
    } else {
        Err(SimError::InvalidParameter(format!("mass must be > 0, got {m}")))
    }
}

/// Damping and stiffness coefficients must be finite and non-negative
pub fn check_coefficient(name: &str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter(format!("{name} must be finite and >= 0, got {value}")))
    }
}

/// Initial conditions only need to be finite
pub fn check_finite(name: &str, value: f64) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter(format!("{name} must be finite, got {value}")))
    }
}

/// Mass, damping and spring constant of one oscillator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    pub m: f64, // mass
    pub c: f64, // damping coefficient
    pub k: f64, // spring constant (to the fixed wall)
}

impl BodyParams {
    pub fn new(m: f64, c: f64, k: f64) -> SimResult<Self> {
        Ok(Self {
            m: check_mass(m)?,
            c: check_coefficient("damping", c)?,
            k: check_coefficient("stiffness", k)?,
        })
    }

    /// Re-check a value built field by field
    pub fn validate(&self) -> SimResult<()> {
        Self::new(self.m, self.c, self.k).map(|_| ())
    }
}

/// Linear spring between bodies `a` and `b`
/// Stored directed, applied symmetrically: `a` feels -k (x_a - x_b),
/// `b` feels -k (x_b - x_a)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coupling {
    pub a: usize,
    pub b: usize,
    pub k: f64,
}

impl Coupling {
    pub fn new(a: usize, b: usize, k: f64) -> Self {
        Self { a, b, k }
    }

    /// Check endpoints against a system of `n` bodies
    pub fn validate(&self, n: usize) -> SimResult<()> {
        if self.a >= n || self.b >= n {
            return Err(SimError::InvalidTopology(format!(
                "coupling ({}, {}) references a body outside 0..{n}",
                self.a, self.b
            )));
        }
        if self.a == self.b {
            return Err(SimError::InvalidTopology(format!(
                "coupling ({}, {}) connects a body to itself",
                self.a, self.b
            )));
        }
        if !self.k.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "coupling constant must be finite, got {}",
                self.k
            )));
        }
        Ok(())
    }
}

/// Run-level numerical settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub t_end: f64, // total simulated time
    pub h0: f64,    // fixed step size
}

impl Parameters {
    pub fn new(t_end: f64, h0: f64) -> SimResult<Self> {
        checked_steps(t_end, h0)?;
        Ok(Self { t_end, h0 })
    }

    /// Number of whole steps that fit in `t_end`; a trailing partial step is dropped
    pub fn steps(&self) -> usize {
        step_count(self.t_end, self.h0)
    }
}

/// `floor(total / h)`, except that a ratio within rounding of an integer
/// (0.3 / 0.1 = 2.9999999999999996) counts as that integer
pub fn step_count(total: f64, h: f64) -> usize {
    let ratio = total / h;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.floor() as usize
    }
}

/// Most steps a recorded run may take; the trajectory holds one more sample
pub const MAX_STEPS: usize = (u32::MAX - 1) as usize;

/// Validate a forward run of `total_time` with step `h` and count its steps
///
/// # Errors
/// `InvalidStepSize` unless `h` is finite and positive. `InvalidParameter`
/// for a negative or non-finite total time, or more than [`MAX_STEPS`] steps.
pub fn checked_steps(total_time: f64, h: f64) -> SimResult<usize> {
    if !h.is_finite() || h <= 0.0 {
        return Err(SimError::InvalidStepSize(h));
    }
    if !total_time.is_finite() || total_time < 0.0 {
        return Err(SimError::InvalidParameter(format!(
            "total time must be finite and >= 0, got {total_time}"
        )));
    }
    let ratio = total_time / h;
    if !ratio.is_finite() || ratio > MAX_STEPS as f64 {
        return Err(SimError::InvalidParameter(format!(
            "total time {total_time} with step {h} needs more than {MAX_STEPS} steps"
        )));
    }
    Ok(step_count(total_time, h).min(MAX_STEPS))
}
