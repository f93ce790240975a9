//! Error types for building and stepping mechanical systems.

use thiserror::Error;

/// Errors raised while constructing, updating, or stepping a system.
///
/// Everything is checked at construction or parameter-update time. A step
/// over validated parameters only fails on a bad step size.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Non-positive mass, negative or non-finite coefficient, or a forcing
    /// term of the wrong dimension.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Step size is NaN or infinite (or non-positive where a forward run is required).
    #[error("Invalid step size: {0}")]
    InvalidStepSize(f64),

    /// Mismatched sequence lengths, out-of-range or self-referencing couplings.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Mass matrix cannot be inverted.
    #[error("Mass matrix is singular")]
    SingularMassMatrix,
}

/// Result type for simulation operations.
pub type SimResult<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidStepSize(f64::NAN);
        assert_eq!(format!("{err}"), "Invalid step size: NaN");

        let err = SimError::InvalidParameter("mass must be > 0, got -1".into());
        assert!(format!("{err}").contains("-1"));

        let err = SimError::SingularMassMatrix;
        assert_eq!(format!("{err}"), "Mass matrix is singular");
    }
}
