//! Generator-matrix assembly and stationary-distribution solving.

use crate::error::{LineError, Result};

use super::MIN_PIVOT;

/// Dense generator matrix of a finite-state CTMC, with the workspace to
/// solve for its stationary distribution.
///
/// The stationary row vector `pi` satisfies `pi * Q = 0` and `sum(pi) = 1`.
/// Both constraints are encoded at once by replacing the last column of `Q`
/// with ones, forming `Qmod`, and solving `pi * Qmod = e` where `e` is the
/// unit row vector with its 1 in the replaced column. The implementation
/// factors the transposed system `Qmod^T * pi^T = e^T` with partially
/// pivoted LU. The column-replacement structure is what carries the
/// normalization constraint and must not be altered.
#[derive(Debug)]
pub struct GeneratorMatrix {
    /// Generator Q (row-major)
    q: Vec<f64>,
    /// LU decomposition of the transposed modified generator
    lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pivots: Vec<usize>,
    /// Stationary distribution (valid after a successful solve)
    pi: Vec<f64>,
    /// Matrix dimension (number of states)
    size: usize,
    /// Reciprocal condition estimate from the LU diagonal
    rcond: f64,
}

impl GeneratorMatrix {
    /// Create a zero generator for a chain with `size` states.
    pub fn new(size: usize) -> Self {
        Self {
            q: vec![0.0; size * size],
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
            pi: vec![0.0; size],
            size,
            rcond: 0.0,
        }
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Clear the generator and solution to zero.
    pub fn clear(&mut self) {
        self.q.fill(0.0);
        self.pi.fill(0.0);
        self.rcond = 0.0;
    }

    /// Get generator element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.q[row * self.size + col]
    }

    /// Add a transition at the given rate from state `from` to state `to`.
    pub fn add_rate(&mut self, from: usize, to: usize, rate: f64) {
        self.q[from * self.size + to] += rate;
    }

    /// Set every diagonal entry so its row sums to zero.
    ///
    /// Call once after all off-diagonal rates have been stamped.
    pub fn balance_diagonal(&mut self) {
        let n = self.size;
        for i in 0..n {
            let mut off_diag = 0.0;
            for j in 0..n {
                if i != j {
                    off_diag += self.q[i * n + j];
                }
            }
            self.q[i * n + i] = -off_diag;
        }
    }

    /// Assemble the transposed modified generator and LU-factor it with
    /// partial pivoting.
    ///
    /// An exactly singular pivot fails with [`LineError::NumericallyUnstable`]
    /// (reciprocal condition estimate 0); otherwise the estimate is stored
    /// for the caller's trust check.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;

        // Qmod: last column of Q replaced by ones; transpose so pi is the
        // solution of an ordinary column-vector system.
        for i in 0..n {
            for j in 0..n {
                let value = if j == n - 1 { 1.0 } else { self.q[i * n + j] };
                self.lu[j * n + i] = value;
            }
        }

        for i in 0..n {
            self.pivots[i] = i;
        }

        for k in 0..n {
            // Find pivot
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < MIN_PIVOT {
                self.rcond = 0.0;
                return Err(LineError::NumericallyUnstable { rcond: 0.0 });
            }

            // Swap rows if needed
            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    let tmp = self.lu[k * n + j];
                    self.lu[k * n + j] = self.lu[max_row * n + j];
                    self.lu[max_row * n + j] = tmp;
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        // Cheap reciprocal condition estimate from the U diagonal.
        let mut min_diag = f64::INFINITY;
        let mut max_diag = 0.0f64;
        for i in 0..n {
            let d = self.lu[i * n + i].abs();
            min_diag = min_diag.min(d);
            max_diag = max_diag.max(d);
        }
        self.rcond = if max_diag > 0.0 { min_diag / max_diag } else { 0.0 };

        Ok(())
    }

    /// Reciprocal condition estimate from the last factorization.
    pub fn rcond(&self) -> f64 {
        self.rcond
    }

    /// Solve for the stationary distribution using the pre-computed LU
    /// decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Right-hand side is the unit vector with its 1 in the replaced
        // column's position (the last state); apply the pivot permutation.
        for i in 0..n {
            self.pi[i] = if self.pivots[i] == n - 1 { 1.0 } else { 0.0 };
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.pi[i] -= self.lu[i * n + j] * self.pi[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.pi[i] -= self.lu[i * n + j] * self.pi[j];
            }
            let diag = self.lu[i * n + i];
            if diag.abs() < MIN_PIVOT {
                return Err(LineError::NumericallyUnstable { rcond: 0.0 });
            }
            self.pi[i] /= diag;
        }

        Ok(())
    }

    /// Stationary distribution from the last successful solve.
    pub fn stationary(&self) -> &[f64] {
        &self.pi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn birth_death(up: f64, dn: f64, states: usize) -> GeneratorMatrix {
        let mut gen = GeneratorMatrix::new(states);
        for n in 0..states {
            if n + 1 < states {
                gen.add_rate(n, n + 1, up);
            }
            if n > 0 {
                gen.add_rate(n, n - 1, dn);
            }
        }
        gen.balance_diagonal();
        gen
    }

    #[test]
    fn test_rows_sum_to_zero() {
        let gen = birth_death(0.7, 1.3, 6);
        for i in 0..gen.size() {
            let row_sum: f64 = (0..gen.size()).map(|j| gen.get(i, j)).sum();
            assert_abs_diff_eq!(row_sum, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_uniform_stationary_for_symmetric_rates() {
        let mut gen = birth_death(2.0, 2.0, 5);
        gen.factor().unwrap();
        gen.solve().unwrap();
        for &p in gen.stationary() {
            assert_abs_diff_eq!(p, 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_stationary_normalizes() {
        let mut gen = birth_death(0.3, 0.6, 8);
        gen.factor().unwrap();
        gen.solve().unwrap();
        let total: f64 = gen.stationary().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_generator_is_unstable() {
        // No transitions at all: Qmod^T has a zero column and cannot be
        // factored.
        let mut gen = GeneratorMatrix::new(4);
        gen.balance_diagonal();
        assert!(matches!(
            gen.factor(),
            Err(crate::error::LineError::NumericallyUnstable { .. })
        ));
    }
}
