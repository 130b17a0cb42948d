//! Sparse upper triangular solves
//!
//! Both routines expect the diagonal entry to be the last stored entry of each
//! column, which is how the QR factorization lays out R. A zero on the diagonal
//! is not checked for; the division simply produces NaN/Inf.

use super::csc::CscMatrix;
use crate::complex::Complex;

/// Solve `U x = b` in place (backward substitution)
pub fn usolve(u: &CscMatrix, x: &mut [Complex]) {
    for j in (0..u.num_cols).rev() {
        let range = u.col_range(j);
        if range.is_empty() {
            continue;
        }
        let diag = range.end - 1;
        x[j] /= u.values[diag];
        let xj = x[j];
        for p in range.start..diag {
            x[u.row_indices[p]] -= u.values[p] * xj;
        }
    }
}

/// Solve `U^H x = b` in place (forward substitution)
pub fn utsolve(u: &CscMatrix, x: &mut [Complex]) {
    for j in 0..u.num_cols {
        let range = u.col_range(j);
        if range.is_empty() {
            continue;
        }
        let diag = range.end - 1;
        let mut xj = x[j];
        for p in range.start..diag {
            xj -= u.values[p].conj() * x[u.row_indices[p]];
        }
        x[j] = xj / u.values[diag].conj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    /// [2   1+i  0 ]
    /// [0   3    -i]
    /// [0   0    1+i]
    fn upper() -> CscMatrix {
        CscMatrix::from_raw_parts(
            3,
            3,
            vec![0, 1, 3, 5],
            vec![0, 0, 1, 1, 2],
            vec![c(2.0, 0.0), c(1.0, 1.0), c(3.0, 0.0), c(0.0, -1.0), c(1.0, 1.0)],
        )
    }

    #[test]
    fn test_usolve() {
        let u = upper();
        let expected = [c(1.0, -1.0), c(0.5, 2.0), c(-2.0, 0.25)];
        let mut x = vec![Complex::zero(); 3];
        for j in 0..3 {
            for (i, v) in u.col_entries(j) {
                x[i] += v * expected[j];
            }
        }
        usolve(&u, &mut x);
        for j in 0..3 {
            assert!(x[j].approx_eq_tol(expected[j], 1e-13), "x[{j}] = {}", x[j]);
        }
    }

    #[test]
    fn test_utsolve() {
        let u = upper();
        let expected = [c(0.5, 0.5), c(-1.0, 3.0), c(2.0, -1.0)];
        // b = U^H * expected
        let mut x = vec![Complex::zero(); 3];
        for j in 0..3 {
            for (i, v) in u.col_entries(j) {
                x[j] += v.conj() * expected[i];
            }
        }
        utsolve(&u, &mut x);
        for j in 0..3 {
            assert!(x[j].approx_eq_tol(expected[j], 1e-13), "x[{j}] = {}", x[j]);
        }
    }

    #[test]
    fn test_zero_pivot_poisons() {
        let u = CscMatrix::from_raw_parts(1, 1, vec![0, 1], vec![0], vec![Complex::zero()]);
        let mut x = vec![c(1.0, 0.0)];
        usolve(&u, &mut x);
        assert!(!x[0].is_finite());
    }
}
