//! Dense complex vector norms

use crate::complex::Complex;

/// Euclidean norm `sqrt(sum |x_i|^2)`
#[inline]
pub fn vector_norm(x: &[Complex]) -> f64 {
    vector_norm_sqr(x).sqrt()
}

/// Squared Euclidean norm, without the final square root
#[inline]
pub fn vector_norm_sqr(x: &[Complex]) -> f64 {
    x.iter().map(|xi| xi.norm_sqr()).sum()
}
