//! # Lineflow Core
//!
//! Analytical throughput and inventory evaluation for serial production
//! lines with exponential service times and finite buffers.
//!
//! This library provides:
//! - An exact CTMC solver for two-station lines (throughput, blocking and
//!   starving probabilities, mean inventory)
//! - A decomposition engine that evaluates M-station lines via M - 1
//!   coupled virtual two-station lines
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`line`] - Line representation (stations, buffers) and validation
//! - [`solver`] - Generator-matrix assembly, stationary solve, and the
//!   decomposition iteration
//! - [`error`] - Unified error type
//!
//! ## Usage
//!
//! ```
//! use lineflow_core::solve_line;
//!
//! let result = solve_line(&[10.0, 10.0, 10.0, 10.0], &[10, 10, 10])?;
//! println!("throughput: {:.4}", result.throughput);
//! # Ok::<(), lineflow_core::LineError>(())
//! ```
//!
//! ## Evaluation Method
//!
//! The exact state space of an M-station line grows as the product of the
//! per-buffer occupancy ranges, so direct solution is intractable beyond a
//! few stations. The decomposition method instead solves M - 1 virtual
//! two-station lines exactly and couples them through analytic rate
//! corrections:
//!
//! 1. Initialize each virtual line from its adjacent stations' own rates
//! 2. Sweep forward, correcting effective upstream rates from each left
//!    neighbor's throughput, re-solving after every update
//! 3. Sweep backward, correcting effective downstream rates symmetrically
//! 4. Repeat until all virtual lines agree on a common throughput
//!
//! The corrections are a Gershwin-style approximation: convergence is
//! empirical, with no closed-form error bound for M > 2.

pub mod error;
pub mod line;
pub mod solver;

// Re-export main types for convenience
pub use error::{LineError, Result};
pub use line::{Buffer, Line, Station};
pub use solver::{
    solve_line, solve_line_with, solve_two_station, solve_two_station_with, Decomposition,
    LineSolution, SolverConfig, TwoStationSolution,
};
