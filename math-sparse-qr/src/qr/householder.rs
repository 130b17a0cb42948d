//! Householder reflections
//!
//! A reflection is stored as a sparse vector `v` plus a real coefficient `beta`
//! and acts as `H = I - beta * v * v^H`. For complex data `H` is Hermitian and
//! unitary, so applying the same reflections in reverse order undoes them.

use crate::complex::Complex;
use crate::sparse::CscMatrix;
use crate::vector::vector_norm_sqr;

/// Overwrite `x` with the Householder vector `v` such that `H x = s * e1`
///
/// Returns `(beta, s)` with `s = -sign(x[0]) * ||x||`, where `sign` is the
/// unit complex phase. Adding `sign(x[0]) * ||x||` to `x[0]` never cancels.
/// A zero vector gives `beta = 0` (H is the identity) and `s = 0`.
pub fn house(x: &mut [Complex]) -> (f64, Complex) {
    let Some(&x0) = x.first() else {
        return (0.0, Complex::zero());
    };
    let norm = vector_norm_sqr(x).sqrt();
    if norm == 0.0 {
        x[0] = Complex::one();
        return (0.0, Complex::zero());
    }

    // sign(x0) * ||x||
    let s = if x0.abs() == 0.0 {
        Complex::from(norm)
    } else {
        x0.scale(norm / x0.abs())
    };
    x[0] += s;
    let beta = 1.0 / (s.conj() * x[0]).re;
    (beta, -s)
}

/// Apply `H = I - beta * v * v^H` to `x` for a vector given by its pattern
pub(crate) fn apply_reflection(rows: &[usize], v: &[Complex], beta: f64, x: &mut [Complex]) {
    let mut tau = Complex::zero();
    for (&i, &vi) in rows.iter().zip(v) {
        tau += vi.conj() * x[i];
    }
    let tau = tau.scale(beta);
    for (&i, &vi) in rows.iter().zip(v) {
        x[i] -= vi * tau;
    }
}

/// Apply the `k`-th Householder reflection stored in column `k` of `v`
pub fn happly(v: &CscMatrix, k: usize, beta: f64, x: &mut [Complex]) {
    let range = v.col_range(k);
    apply_reflection(&v.row_indices[range.clone()], &v.values[range], beta, x);
}
