//! Exact analysis of a two-station line with one finite buffer.

use crate::error::{LineError, Result};

use super::ctmc::GeneratorMatrix;
use super::DEFAULT_RCOND_FLOOR;

/// Steady-state performance measures of a two-station line.
///
/// Fully determined by `(mu_up, mu_dn, capacity)`; recomputed from scratch
/// after any rate change, never incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoStationSolution {
    /// Parts per time unit leaving the line.
    pub throughput: f64,
    /// Fraction of time the downstream station is starved (buffer empty).
    pub starving_prob: f64,
    /// Fraction of time the upstream station is blocked (buffer full).
    pub blocking_prob: f64,
    /// Mean extended buffer occupancy.
    pub mean_inventory: f64,
}

/// Solve a two-station line exactly via its buffer-occupancy CTMC.
///
/// `mu_up` and `mu_dn` are the exponential service rates of the upstream
/// and downstream stations; `capacity` is the buffer size between them.
/// Pure function: no state is carried between calls.
///
/// Fails with [`LineError::InvalidParameter`] for non-positive or
/// non-finite rates, and with [`LineError::NumericallyUnstable`] when the
/// stationary solve cannot be trusted.
pub fn solve_two_station(mu_up: f64, mu_dn: f64, capacity: usize) -> Result<TwoStationSolution> {
    solve_two_station_with(mu_up, mu_dn, capacity, DEFAULT_RCOND_FLOOR)
}

/// [`solve_two_station`] with an explicit floor on the reciprocal
/// condition estimate of the stationary solve.
pub fn solve_two_station_with(
    mu_up: f64,
    mu_dn: f64,
    capacity: usize,
    rcond_floor: f64,
) -> Result<TwoStationSolution> {
    check_rate("mu_up", mu_up)?;
    check_rate("mu_dn", mu_dn)?;

    let pi = stationary_distribution(mu_up, mu_dn, capacity, rcond_floor)?;

    // Extended occupancy: state 0 is starved, state N = capacity + 2 is
    // blocked.
    let top = capacity + 2;

    // Throughput seen from the downstream station; the upstream view
    // mu_up * (1 - pi[top]) is identical at the stationary distribution.
    let throughput = mu_dn * (1.0 - pi[0]);
    let starving_prob = pi[0];
    let blocking_prob = pi[top];
    let mean_inventory = pi
        .iter()
        .enumerate()
        .map(|(n, &p)| n as f64 * p)
        .sum();

    Ok(TwoStationSolution {
        throughput,
        starving_prob,
        blocking_prob,
        mean_inventory,
    })
}

/// Stationary distribution of the extended occupancy chain.
///
/// States `0..=capacity + 2`: the upstream station moves the chain up at
/// rate `mu_up` unless blocked (top state); the downstream station moves
/// it down at rate `mu_dn` unless starved (state 0).
pub(crate) fn stationary_distribution(
    mu_up: f64,
    mu_dn: f64,
    capacity: usize,
    rcond_floor: f64,
) -> Result<Vec<f64>> {
    let states = capacity + 3;

    let mut gen = GeneratorMatrix::new(states);
    for n in 0..states {
        if n + 1 < states {
            gen.add_rate(n, n + 1, mu_up);
        }
        if n > 0 {
            gen.add_rate(n, n - 1, mu_dn);
        }
    }
    gen.balance_diagonal();

    gen.factor()?;
    if gen.rcond() < rcond_floor {
        return Err(LineError::NumericallyUnstable { rcond: gen.rcond() });
    }
    gen.solve()?;

    Ok(gen.stationary().to_vec())
}

fn check_rate(param: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(LineError::invalid_parameter(
            param,
            format!("Service rate must be finite and positive, got {rate}"),
        ));
    }
    Ok(())
}
