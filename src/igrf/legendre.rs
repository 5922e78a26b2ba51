//! Schmidt quasi-normalized associated Legendre functions.
//!
//! Values and colatitude derivatives are built degree by degree: the diagonal
//! (m = n) and sub-diagonal (m = n - 1) from the previous diagonal entry, every
//! other order from the two previous degrees at the same order.

/// Table of P[n][m] and dP[n][m]/dθ for `0 <= m <= n <= n_max`.
///
/// Backed by two flat square arenas of side `n_max + 2`. Entries with `m > n` are
/// left at zero and carry no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    n_max: usize,
    size: usize,
    p: Vec<f64>,
    dp: Vec<f64>,
}

impl LegendreTable {
    /// Evaluates the table at `colatitude` (radians) up to degree `n_max`
    pub fn evaluate(n_max: usize, colatitude: f64) -> LegendreTable {
        // degree-1 seeds are always written, so keep room for them
        let size = (n_max + 2).max(3);
        let mut table = LegendreTable {
            n_max,
            size,
            p: vec![0.0; size * size],
            dp: vec![0.0; size * size],
        };

        let cos_theta = colatitude.cos();
        let sin_theta = colatitude.sin();

        table.set(0, 0, 1.0, 0.0);
        table.set(1, 0, cos_theta, -sin_theta);
        table.set(1, 1, sin_theta, cos_theta);

        for n in 2..=n_max {
            let nf = n as f64;
            let p_diag = table.p(n - 1, n - 1);
            let dp_diag = table.dp(n - 1, n - 1);

            for m in 0..=n {
                if m == n {
                    let k = ((2.0 * nf - 1.0) / (2.0 * nf)).sqrt();
                    table.set(
                        n,
                        n,
                        sin_theta * k * p_diag,
                        k * (cos_theta * p_diag + sin_theta * dp_diag),
                    );
                } else if m == n - 1 {
                    let k = (2.0 * nf - 1.0).sqrt();
                    table.set(
                        n,
                        m,
                        k * cos_theta * p_diag,
                        k * (cos_theta * dp_diag - sin_theta * p_diag),
                    );
                } else {
                    let mf = m as f64;
                    let denominator = nf * nf - mf * mf;
                    let a_nm = ((2.0 * nf - 1.0).powi(2) / denominator).sqrt();
                    let b_nm = (((nf - 1.0).powi(2) - mf * mf) / denominator).sqrt();

                    let p_prev = table.p(n - 1, m);
                    let dp_prev = table.dp(n - 1, m);
                    table.set(
                        n,
                        m,
                        a_nm * cos_theta * p_prev - b_nm * table.p(n - 2, m),
                        a_nm * (cos_theta * dp_prev - sin_theta * p_prev)
                            - b_nm * table.dp(n - 2, m),
                    );
                }
            }
        }

        table
    }

    /// Highest degree the table was evaluated to
    pub fn n_max(&self) -> usize {
        self.n_max
    }

    /// P[n][m]
    pub fn p(&self, n: usize, m: usize) -> f64 {
        self.p[self.index(n, m)]
    }

    /// dP[n][m] with respect to colatitude
    pub fn dp(&self, n: usize, m: usize) -> f64 {
        self.dp[self.index(n, m)]
    }

    fn index(&self, n: usize, m: usize) -> usize {
        debug_assert!(m <= n && n < self.size);
        n * self.size + m
    }

    fn set(&mut self, n: usize, m: usize, p: f64, dp: f64) {
        let i = self.index(n, m);
        self.p[i] = p;
        self.dp[i] = dp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }

    #[test]
    fn seeds() {
        let theta = 0.7_f64;
        let table = LegendreTable::evaluate(1, theta);
        assert_eq!(table.p(0, 0), 1.0);
        assert_eq!(table.dp(0, 0), 0.0);
        assert_eq!(table.p(1, 0), theta.cos());
        assert_eq!(table.p(1, 1), theta.sin());
        assert_eq!(table.dp(1, 0), -theta.sin());
        assert_eq!(table.dp(1, 1), theta.cos());
    }

    #[test]
    fn zero_degree_table_holds_seeds() {
        let table = LegendreTable::evaluate(0, 0.3);
        assert_eq!(table.n_max(), 0);
        assert_eq!(table.p(1, 1), 0.3_f64.sin());
    }

    #[test]
    fn diagonal_matches_closed_form_at_equator() {
        let table = LegendreTable::evaluate(12, FRAC_PI_2);
        for n in 1..=12 {
            let expected = (2.0 * factorial(2 * n)).sqrt() / (2f64.powi(n as i32) * factorial(n));
            assert_relative_eq!(table.p(n, n), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn low_degrees_match_schmidt_forms() {
        let theta = 1.1_f64;
        let (c, s) = (theta.cos(), theta.sin());
        let table = LegendreTable::evaluate(3, theta);

        assert_abs_diff_eq!(table.p(2, 0), 0.5 * (3.0 * c * c - 1.0), epsilon = 1e-14);
        assert_abs_diff_eq!(table.p(2, 1), 3f64.sqrt() * c * s, epsilon = 1e-14);
        assert_abs_diff_eq!(table.p(2, 2), 0.5 * 3f64.sqrt() * s * s, epsilon = 1e-14);
        assert_abs_diff_eq!(table.p(3, 0), 0.5 * c * (5.0 * c * c - 3.0), epsilon = 1e-14);
        assert_abs_diff_eq!(
            table.p(3, 1),
            (3.0 / 8.0_f64).sqrt() * s * (5.0 * c * c - 1.0),
            epsilon = 1e-14
        );

        assert_abs_diff_eq!(table.dp(2, 0), -3.0 * c * s, epsilon = 1e-14);
        assert_abs_diff_eq!(table.dp(2, 1), 3f64.sqrt() * (c * c - s * s), epsilon = 1e-14);
        assert_abs_diff_eq!(table.dp(2, 2), 3f64.sqrt() * s * c, epsilon = 1e-14);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let n_max = 10;
        let theta = 0.9_f64;
        let h = 1e-6;
        let table = LegendreTable::evaluate(n_max, theta);
        let ahead = LegendreTable::evaluate(n_max, theta + h);
        let behind = LegendreTable::evaluate(n_max, theta - h);

        for n in 0..=n_max {
            for m in 0..=n {
                let numeric = (ahead.p(n, m) - behind.p(n, m)) / (2.0 * h);
                assert_abs_diff_eq!(table.dp(n, m), numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn pole_values() {
        let table = LegendreTable::evaluate(6, 0.0);
        for n in 0..=6 {
            assert_abs_diff_eq!(table.p(n, 0), 1.0, epsilon = 1e-12);
            for m in 1..=n {
                assert_eq!(table.p(n, m), 0.0);
            }
        }
    }
}
