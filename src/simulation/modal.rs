//! Modal analysis: natural frequencies from mass and stiffness matrices
//!
//! Independent of time stepping. For a set of independent bodies the
//! matrices are diagonal; [`ModalAnalysis::from_coupled`] also folds the
//! coupling springs into K.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::simulation::coupled::CoupledSystem;
use crate::simulation::oscillator::MechanicalSystem;

/// Mass, damping and stiffness matrices of a linear system
#[derive(Debug, Clone)]
pub struct ModalAnalysis {
    mass: DMatrix<f64>,
    damping: DMatrix<f64>,
    stiffness: DMatrix<f64>,
    mass_inv: DMatrix<f64>,
}

impl ModalAnalysis {
    /// Diagonal matrices, one entry per body
    pub fn from_systems(systems: &[MechanicalSystem]) -> SimResult<Self> {
        let m = DVector::from_iterator(systems.len(), systems.iter().map(|s| s.mass()));
        let c = DVector::from_iterator(systems.len(), systems.iter().map(|s| s.damping()));
        let k = DVector::from_iterator(systems.len(), systems.iter().map(|s| s.stiffness()));
        Self::from_matrices(
            DMatrix::from_diagonal(&m),
            DMatrix::from_diagonal(&c),
            DMatrix::from_diagonal(&k),
        )
    }

    /// Matrices of a coupled network: each coupling `(a, b, K)` adds K to
    /// both diagonal entries and -K to the two off-diagonal ones
    pub fn from_coupled(system: &CoupledSystem) -> SimResult<Self> {
        let bodies = system.bodies();
        let n = bodies.len();
        let m = DVector::from_iterator(n, bodies.iter().map(|p| p.m));
        let c = DVector::from_iterator(n, bodies.iter().map(|p| p.c));
        let mut k = DMatrix::from_diagonal(&DVector::from_iterator(n, bodies.iter().map(|p| p.k)));
        for cp in system.couplings() {
            k[(cp.a, cp.a)] += cp.k;
            k[(cp.b, cp.b)] += cp.k;
            k[(cp.a, cp.b)] -= cp.k;
            k[(cp.b, cp.a)] -= cp.k;
        }
        Self::from_matrices(DMatrix::from_diagonal(&m), DMatrix::from_diagonal(&c), k)
    }

    /// Arbitrary square matrices of equal size
    ///
    /// # Errors
    /// `InvalidTopology` for empty, non-square or mismatched matrices,
    /// `SingularMassMatrix` if M has no inverse.
    pub fn from_matrices(mass: DMatrix<f64>, damping: DMatrix<f64>, stiffness: DMatrix<f64>) -> SimResult<Self> {
        let n = mass.nrows();
        if n == 0 {
            return Err(SimError::InvalidTopology("modal analysis needs at least one body".into()));
        }
        for (name, mat) in [("mass", &mass), ("damping", &damping), ("stiffness", &stiffness)] {
            if mat.shape() != (n, n) {
                return Err(SimError::InvalidTopology(format!(
                    "{name} matrix is {}x{}, expected {n}x{n}",
                    mat.nrows(),
                    mat.ncols()
                )));
            }
        }
        if mass.iter().chain(damping.iter()).chain(stiffness.iter()).any(|v| !v.is_finite()) {
            return Err(SimError::InvalidParameter("matrix entries must be finite".into()));
        }
        if mass.diagonal().iter().any(|&m| m == 0.0) {
            return Err(SimError::SingularMassMatrix);
        }
        let mass_inv = mass.clone().try_inverse().ok_or(SimError::SingularMassMatrix)?;

        Ok(Self {
            mass,
            damping,
            stiffness,
            mass_inv,
        })
    }

    pub fn dimension(&self) -> usize {
        self.mass.nrows()
    }

    pub fn mass_matrix(&self) -> &DMatrix<f64> {
        &self.mass
    }

    pub fn damping_matrix(&self) -> &DMatrix<f64> {
        &self.damping
    }

    pub fn stiffness_matrix(&self) -> &DMatrix<f64> {
        &self.stiffness
    }

    /// A = M^-1 K
    pub fn system_matrix(&self) -> DMatrix<f64> {
        &self.mass_inv * &self.stiffness
    }

    /// Undamped natural angular frequencies, ascending
    ///
    /// Square roots of the real parts of the eigenvalues of M^-1 K;
    /// eigenvalues that round below zero are clamped to zero.
    pub fn natural_frequencies(&self) -> DVector<f64> {
        let a = self.system_matrix();
        let mut omegas: Vec<f64> = a
            .complex_eigenvalues()
            .iter()
            .map(|ev| ev.re.max(0.0).sqrt())
            .collect();
        omegas.sort_by(|x, y| x.total_cmp(y));
        debug!(?omegas, "natural frequencies");
        DVector::from_vec(omegas)
    }
}
