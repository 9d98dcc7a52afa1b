//! Decomposition of an M-station line into coupled two-station models.

use crate::error::{LineError, Result};
use crate::line::{validate_line, Line};

use super::two_station::{solve_two_station_with, TwoStationSolution};
use super::{DEFAULT_MAX_ITERATIONS, DEFAULT_RCOND_FLOOR, DEFAULT_TOLERANCE};

/// Configuration for the decomposition solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Relative throughput-agreement tolerance for the convergence test.
    pub tolerance: f64,
    /// Maximum number of forward+backward sweeps.
    pub max_iterations: usize,
    /// Floor on the reciprocal condition estimate of each stationary solve.
    pub rcond_floor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rcond_floor: DEFAULT_RCOND_FLOOR,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative throughput-agreement tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of sweeps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the reciprocal-condition floor for the stationary solves.
    pub fn with_rcond_floor(mut self, rcond_floor: f64) -> Self {
        self.rcond_floor = rcond_floor;
        self
    }
}

/// Converged (or best-effort) result of a decomposition run.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSolution {
    /// Overall line throughput (all virtual lines agree within tolerance).
    pub throughput: f64,
    /// Per-buffer performance measures, one entry per virtual line.
    pub per_buffer: Vec<TwoStationSolution>,
    /// Number of completed forward+backward sweeps.
    pub iterations: usize,
}

/// One immutable snapshot of the fixed-point iteration.
///
/// Every sweep produces a fresh snapshot from the previous one, so the
/// iteration history is a sequence of values rather than in-place mutation
/// of shared arrays.
#[derive(Debug, Clone)]
struct SweepState {
    /// Effective upstream rate of each virtual line; index 0 is pinned to
    /// the first station's own rate.
    mu_up: Vec<f64>,
    /// Effective downstream rate of each virtual line; the last index is
    /// pinned to the last station's own rate.
    mu_dn: Vec<f64>,
    /// Exact solution of each virtual line at its current rates.
    solutions: Vec<TwoStationSolution>,
}

impl SweepState {
    /// Relative throughput disagreement between the two boundary virtual
    /// lines.
    fn residual(&self) -> f64 {
        let first = self.solutions[0].throughput;
        let last = self.solutions[self.solutions.len() - 1].throughput;
        (first - last).abs() / first
    }
}

/// Decomposition engine for a serial line of M stations.
///
/// The line is approximated by M - 1 virtual two-station lines, one per
/// buffer. Each sweep recomputes effective rates from neighboring virtual
/// lines' throughputs and re-solves, until all virtual lines agree on a
/// common throughput. The rate corrections are a Gershwin-style
/// approximation; convergence is empirical, not proven.
pub struct Decomposition {
    /// The line being decomposed
    line: Line,
    /// Solver configuration
    config: SolverConfig,
}

impl Decomposition {
    /// Create a new engine for the given line with default configuration.
    pub fn new(line: Line) -> Self {
        Self::with_config(line, SolverConfig::default())
    }

    /// Create a new engine for the given line with custom configuration.
    pub fn with_config(line: Line, config: SolverConfig) -> Self {
        Self { line, config }
    }

    /// Get a reference to the line.
    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Run the decomposition to convergence.
    ///
    /// Returns the per-buffer performance measures and the number of
    /// sweeps used. Fails with [`LineError::ConvergenceFailure`] carrying
    /// the best current estimate when the sweep budget is exhausted.
    pub fn solve(&self) -> Result<LineSolution> {
        validate_line(&self.line)?;

        let stations = self.line.station_count();

        // A single station has no buffers: throughput is its own rate.
        if stations == 1 {
            return Ok(LineSolution {
                throughput: self.line.rate(0),
                per_buffer: Vec::new(),
                iterations: 0,
            });
        }

        // Two stations form one real two-station line: solve it directly,
        // no virtual lines and no sweeps.
        if stations == 2 {
            let solution = solve_two_station_with(
                self.line.rate(0),
                self.line.rate(1),
                self.line.capacity(0),
                self.config.rcond_floor,
            )?;
            return Ok(LineSolution {
                throughput: solution.throughput,
                per_buffer: vec![solution],
                iterations: 0,
            });
        }

        let mut state = self.initial_state()?;

        for iter in 0..self.config.max_iterations {
            state = self.sweep(&state)?;

            if state.residual() < self.config.tolerance {
                return Ok(Self::collect(state, iter + 1));
            }
        }

        let residual = state.residual();
        let iterations = self.config.max_iterations;
        Err(LineError::ConvergenceFailure {
            iterations,
            residual,
            estimate: Box::new(Self::collect(state, iterations)),
        })
    }

    /// Initialize every virtual line from its adjacent stations' own rates
    /// and solve it once.
    fn initial_state(&self) -> Result<SweepState> {
        let lines = self.line.buffer_count();
        let mut mu_up = Vec::with_capacity(lines);
        let mut mu_dn = Vec::with_capacity(lines);
        let mut solutions = Vec::with_capacity(lines);

        for i in 0..lines {
            let up = self.line.rate(i);
            let dn = self.line.rate(i + 1);
            mu_up.push(up);
            mu_dn.push(dn);
            solutions.push(self.solve_virtual_line(up, dn, i)?);
        }

        Ok(SweepState {
            mu_up,
            mu_dn,
            solutions,
        })
    }

    /// Perform one full forward+backward sweep, producing the next
    /// snapshot.
    ///
    /// Each update consumes the neighbor's already-updated throughput from
    /// this same sweep, so the order is a strict sequential dependency.
    fn sweep(&self, state: &SweepState) -> Result<SweepState> {
        let mut next = state.clone();
        let lines = next.solutions.len();

        // Forward: correct each effective upstream rate from the previous
        // virtual line. The effective time per part is the previous line's
        // inter-departure time plus this station's own service time, minus
        // the service time the previous line already attributes to its
        // downstream machine. mu_up[0] stays pinned.
        for i in 1..lines {
            let k_up = 1.0 / next.solutions[i - 1].throughput + 1.0 / self.line.rate(i)
                - 1.0 / next.mu_dn[i - 1];
            next.mu_up[i] = 1.0 / k_up;
            next.solutions[i] = self.solve_virtual_line(next.mu_up[i], next.mu_dn[i], i)?;
        }

        // Backward: symmetric correction of each effective downstream rate
        // from the next virtual line. mu_dn[lines - 1] stays pinned.
        for i in (0..lines - 1).rev() {
            let k_dn = 1.0 / next.solutions[i + 1].throughput + 1.0 / self.line.rate(i + 1)
                - 1.0 / next.mu_up[i + 1];
            next.mu_dn[i] = 1.0 / k_dn;
            next.solutions[i] = self.solve_virtual_line(next.mu_up[i], next.mu_dn[i], i)?;
        }

        Ok(next)
    }

    /// Solve virtual line `i` at the given effective rates.
    fn solve_virtual_line(&self, mu_up: f64, mu_dn: f64, i: usize) -> Result<TwoStationSolution> {
        solve_two_station_with(mu_up, mu_dn, self.line.capacity(i), self.config.rcond_floor)
    }

    /// Package a snapshot as the run's output.
    fn collect(state: SweepState, iterations: usize) -> LineSolution {
        LineSolution {
            throughput: state.solutions[0].throughput,
            per_buffer: state.solutions,
            iterations,
        }
    }
}

/// Solve an M-station line with default configuration.
///
/// `rates` holds the M station service rates; `capacities` the M - 1
/// buffer capacities. Fails with [`LineError::ConfigurationError`] when
/// the counts do not match.
pub fn solve_line(rates: &[f64], capacities: &[usize]) -> Result<LineSolution> {
    Decomposition::new(Line::from_rates(rates, capacities)).solve()
}

/// [`solve_line`] with a custom configuration.
pub fn solve_line_with(
    rates: &[f64],
    capacities: &[usize],
    config: SolverConfig,
) -> Result<LineSolution> {
    Decomposition::with_config(Line::from_rates(rates, capacities), config).solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::two_station::solve_two_station;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_station_line_matches_direct_solve() {
        // M = 2 must reproduce the leaf solver exactly: same call, no
        // iteration.
        let direct = solve_two_station(0.3, 0.6, 2).unwrap();
        let line = solve_line(&[0.3, 0.6], &[2]).unwrap();

        assert_eq!(line.iterations, 0);
        assert_eq!(line.per_buffer.len(), 1);
        assert_eq!(line.per_buffer[0], direct);
        assert_eq!(line.throughput, direct.throughput);
    }

    #[test]
    fn test_single_station_pass_through() {
        let line = solve_line(&[7.5], &[]).unwrap();
        assert_eq!(line.throughput, 7.5);
        assert!(line.per_buffer.is_empty());
        assert_eq!(line.iterations, 0);
    }

    #[test]
    fn test_wrong_buffer_count_rejected() {
        assert!(matches!(
            solve_line(&[10.0, 10.0, 10.0], &[5]),
            Err(LineError::ConfigurationError { .. })
        ));
        assert!(matches!(
            solve_line(&[], &[]),
            Err(LineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_flow_conservation_at_convergence() {
        let config = SolverConfig::new().with_tolerance(1e-9);
        let result = solve_line_with(&[2.0, 1.5, 3.0, 1.8], &[2, 3, 2], config).unwrap();

        for a in &result.per_buffer {
            for b in &result.per_buffer {
                assert_relative_eq!(a.throughput, b.throughput, max_relative = 1e-6);
            }
        }
        // Throughput of an unbalanced line is below its slowest station.
        assert!(result.throughput < 1.5);
        assert!(result.throughput > 0.0);
    }

    #[test]
    fn test_pinned_boundary_rates_never_change() {
        let line = Line::from_rates(&[2.0, 1.0, 3.0, 1.2], &[1, 2, 1]);
        let engine = Decomposition::new(line);

        let mut state = engine.initial_state().unwrap();
        for _ in 0..5 {
            state = engine.sweep(&state).unwrap();
            assert_eq!(state.mu_up[0], 2.0);
            assert_eq!(state.mu_dn[2], 1.2);
        }
    }

    #[test]
    fn test_monotonic_in_buffer_capacity() {
        let small = solve_line(&[1.0, 1.0, 1.0], &[1, 1]).unwrap();
        let medium = solve_line(&[1.0, 1.0, 1.0], &[4, 4]).unwrap();
        let large = solve_line(&[1.0, 1.0, 1.0], &[8, 8]).unwrap();

        assert!(medium.throughput >= small.throughput);
        assert!(large.throughput >= medium.throughput);
    }

    #[test]
    fn test_large_buffers_approach_station_rate() {
        let result = solve_line(&[3.0, 3.0, 3.0], &[200, 200]).unwrap();
        assert!(result.throughput > 2.95);
        for kpis in &result.per_buffer {
            assert!(kpis.starving_prob < 0.01);
            assert!(kpis.blocking_prob < 0.01);
        }
    }

    #[test]
    fn test_balanced_four_station_scenario() {
        // Reference scenario: four identical stations, huge buffers.
        let result = solve_line(&[10.0, 10.0, 10.0, 10.0], &[1000, 1000, 1000]).unwrap();

        assert!(result.iterations < 20);
        assert_relative_eq!(result.throughput, 10.0, max_relative = 1e-2);
        for kpis in &result.per_buffer {
            assert!(kpis.starving_prob < 0.01);
            assert!(kpis.blocking_prob < 0.01);
        }
    }

    #[test]
    fn test_convergence_failure_carries_estimate() {
        let config = SolverConfig::new().with_tolerance(0.0).with_max_iterations(2);
        let err = solve_line_with(&[5.0, 1.0, 5.0], &[1, 1], config).unwrap_err();

        match err {
            LineError::ConvergenceFailure {
                iterations,
                residual,
                estimate,
            } => {
                assert_eq!(iterations, 2);
                assert!(residual.is_finite());
                assert!(estimate.throughput > 0.0);
                assert!(estimate.throughput < 1.0);
                assert_eq!(estimate.per_buffer.len(), 2);
            }
            other => panic!("expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_bottleneck_limits_throughput() {
        let result = solve_line(&[4.0, 0.5, 4.0, 4.0], &[3, 3, 3]).unwrap();
        assert!(result.throughput < 0.5);
        // The station after the bottleneck starves most of the time.
        assert!(result.per_buffer[1].starving_prob > 0.5);
    }
}
