//! Error types for the Lineflow analytical solvers.
//!
//! This module provides a unified error type [`LineError`] that covers
//! all error conditions that can occur during line validation, the exact
//! two-station CTMC solve, and the decomposition iteration.

use thiserror::Error;

use crate::solver::LineSolution;

/// Result type alias using [`LineError`].
pub type Result<T> = std::result::Result<T, LineError>;

/// Unified error type for all Lineflow operations.
#[derive(Error, Debug)]
pub enum LineError {
    /// Malformed input parameter (non-positive or non-finite rate).
    ///
    /// Always surfaced immediately, never recovered.
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Inconsistent line configuration (wrong buffer count, empty line).
    #[error("Invalid line configuration: {message}")]
    ConfigurationError { message: String },

    /// The stationary-distribution solve cannot be trusted.
    ///
    /// The modified generator matrix is singular or ill-conditioned to
    /// machine precision, which can occur for extreme rate ratios. The
    /// reciprocal condition estimate is taken from the LU diagonal; an
    /// exactly singular pivot reports 0.
    #[error("Stationary solve is numerically unstable (reciprocal condition estimate: {rcond:.2e})")]
    NumericallyUnstable { rcond: f64 },

    /// The decomposition sweep loop exhausted its iteration budget.
    ///
    /// Carries the best estimate computed so far, so callers may decide
    /// whether an approximate answer is acceptable.
    #[error("Decomposition did not converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailure {
        iterations: usize,
        residual: f64,
        estimate: Box<LineSolution>,
    },
}

impl LineError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}
