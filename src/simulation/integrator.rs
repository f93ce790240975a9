//! Fixed-step classical Runge-Kutta (RK4) integrator
//!
//! One generic stepper for every [`ForceModel`], whatever its dimension:
//! a scalar ODE, a d-dimensional single body or 2N coupled slots all go
//! through [`rk4_step`]. Four derivative evaluations per step, no state
//! kept between calls.

use crate::error::{SimError, SimResult};
use crate::simulation::forces::ForceModel;

/// Scratch buffers for [`rk4_step_into`]
/// Reusing one across steps avoids five allocations per step
#[derive(Debug, Clone, Default)]
pub struct Rk4Workspace {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4Workspace {
    pub fn new(dim: usize) -> Self {
        let mut ws = Self::default();
        ws.resize(dim);
        ws
    }

    fn resize(&mut self, dim: usize) {
        for buf in [&mut self.k1, &mut self.k2, &mut self.k3, &mut self.k4, &mut self.tmp] {
            buf.resize(dim, 0.0);
        }
    }
}

/// Reject NaN and infinite step sizes. Zero and negative are fine here.
pub fn check_step_size(h: f64) -> SimResult<f64> {
    if h.is_finite() {
        Ok(h)
    } else {
        Err(SimError::InvalidStepSize(h))
    }
}

fn check_dimension<M: ForceModel + ?Sized>(model: &M, len: usize) -> SimResult<()> {
    if len == model.dimension() {
        Ok(())
    } else {
        Err(SimError::InvalidTopology(format!(
            "state has {len} components, model expects {}",
            model.dimension()
        )))
    }
}

/// Advance `y` from `t` to `t + h` with one RK4 step
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + h/2, y + h/2 k1)
/// k3 = f(t + h/2, y + h/2 k2)
/// k4 = f(t + h, y + h k3)
/// y' = y + h/6 (k1 + 2 k2 + 2 k3 + k4)
/// ```
///
/// `h == 0` returns `y` untouched; negative `h` integrates backwards.
///
/// # Errors
/// `InvalidStepSize` if `h` is not finite, `InvalidTopology` if `y` does not
/// match the model's dimension.
pub fn rk4_step<M: ForceModel + ?Sized>(model: &M, t: f64, y: &[f64], h: f64) -> SimResult<Vec<f64>> {
    let mut out = vec![0.0; y.len()];
    let mut ws = Rk4Workspace::new(y.len());
    rk4_step_into(model, t, y, h, &mut out, &mut ws)?;
    Ok(out)
}

/// [`rk4_step`] writing into `out` and reusing the caller's scratch space
pub fn rk4_step_into<M: ForceModel + ?Sized>(
    model: &M,
    t: f64,
    y: &[f64],
    h: f64,
    out: &mut [f64],
    ws: &mut Rk4Workspace,
) -> SimResult<()> {
    let h = check_step_size(h)?;
    check_dimension(model, y.len())?;
    if out.len() != y.len() {
        return Err(SimError::InvalidTopology(format!(
            "output has {} components, state has {}",
            out.len(),
            y.len()
        )));
    }

    if h == 0.0 {
        out.copy_from_slice(y);
        return Ok(());
    }

    ws.resize(y.len());
    let Rk4Workspace { k1, k2, k3, k4, tmp } = ws;

    let half_h = 0.5 * h;
    let t_mid = t + half_h;

    model.derivative(t, y, k1);

    axpy(tmp, y, half_h, k1);
    model.derivative(t_mid, tmp, k2);

    axpy(tmp, y, half_h, k2);
    model.derivative(t_mid, tmp, k3);

    axpy(tmp, y, h, k3);
    model.derivative(t + h, tmp, k4);

    let sixth_h = h / 6.0;
    for i in 0..y.len() {
        out[i] = y[i] + sixth_h * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(())
}

// out = y + a * k
fn axpy(out: &mut [f64], y: &[f64], a: f64, k: &[f64]) {
    for ((o, &yi), &ki) in out.iter_mut().zip(y).zip(k) {
        *o = yi + a * ki;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::forces::FnForce;

    #[test]
    fn linear_growth_is_exact() {
        // dy/dt = 1 has y(t) = y0 + t; RK4 reproduces it exactly
        let model = FnForce::new(1, |_t, _y, d: &mut [f64]| d[0] = 1.0);
        let y = rk4_step(&model, 0.0, &[2.0], 0.5).unwrap();
        assert!((y[0] - 2.5).abs() < 1e-15);
    }

    #[test]
    fn time_dependent_rhs_sees_midpoints() {
        // dy/dt = t: Simpson's rule through RK4 is exact for polynomials up to cubic
        let model = FnForce::new(1, |t, _y, d: &mut [f64]| d[0] = t);
        let y = rk4_step(&model, 1.0, &[0.0], 1.0).unwrap();
        assert!((y[0] - 1.5).abs() < 1e-15);
    }

    #[test]
    fn exactly_four_evaluations_per_step() {
        let calls = std::cell::Cell::new(0);
        let model = FnForce::new(6, |_t, y: &[f64], d: &mut [f64]| {
            calls.set(calls.get() + 1);
            d.copy_from_slice(y);
        });
        rk4_step(&model, 0.0, &[1.0; 6], 0.1).unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn zero_step_skips_evaluation() {
        let model = FnForce::new(2, |_t, _y, _d: &mut [f64]| panic!("must not be called"));
        let y = rk4_step(&model, 0.0, &[1.0, 2.0], 0.0).unwrap();
        assert_eq!(y, vec![1.0, 2.0]);
    }

    #[test]
    fn non_finite_step_is_rejected() {
        let model = FnForce::new(1, |_t, _y, d: &mut [f64]| d[0] = 0.0);
        for h in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = rk4_step(&model, 0.0, &[0.0], h).unwrap_err();
            assert!(matches!(err, SimError::InvalidStepSize(_)));
        }
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let model = FnForce::new(2, |_t, _y, _d: &mut [f64]| {});
        let err = rk4_step(&model, 0.0, &[0.0; 3], 0.1).unwrap_err();
        assert!(matches!(err, SimError::InvalidTopology(_)));
    }
}
