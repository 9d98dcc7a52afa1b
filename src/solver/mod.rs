//! Analytical solvers for serial production lines.
//!
//! This module provides the numerical engine of the crate.
//!
//! ## Two-station CTMC
//!
//! A two-station line with buffer capacity C is an exact birth-death CTMC
//! over the extended occupancy `n = 0..=C + 2`:
//!
//! ```text
//! n = 0          buffer empty, downstream station starved
//! 0 < n < C + 2  ordinary buffer levels
//! n = C + 2      buffer full, upstream station blocked
//! ```
//!
//! The upstream station pushes the chain up at its service rate, the
//! downstream station pulls it down. The stationary distribution comes
//! from the generator matrix with one column replaced by ones (which
//! encodes normalization), solved by dense LU decomposition.
//!
//! ## Decomposition
//!
//! An M-station line is approximated by M - 1 virtual two-station lines,
//! one per buffer. Forward and backward sweeps re-derive each virtual
//! line's effective rates from its neighbors' throughputs and re-solve,
//! until the boundary virtual lines agree on a common throughput.

mod ctmc;
mod decomposition;
mod two_station;

pub use ctmc::GeneratorMatrix;
pub use decomposition::{
    solve_line, solve_line_with, Decomposition, LineSolution, SolverConfig,
};
pub use two_station::{solve_two_station, solve_two_station_with, TwoStationSolution};

/// Relative throughput-agreement tolerance for the decomposition loop.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Maximum forward+backward sweeps before reporting a convergence failure.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Minimum reciprocal condition estimate for a trusted stationary solve.
pub const DEFAULT_RCOND_FLOOR: f64 = 1e-12;

/// Minimum pivot magnitude before a factorization counts as singular.
pub(crate) const MIN_PIVOT: f64 = 1e-15;
