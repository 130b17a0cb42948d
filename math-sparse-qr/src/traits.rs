//! Core traits for the QR solve pipeline
//!
//! The solver only needs a handful of facts from the analysis and the
//! factorization, so both stages sit behind traits:
//! - [`SymbolicAnalysis`]: row and column permutations and the factor height
//! - [`QrFactors`]: Householder vectors, reflection coefficients and R
//! - [`QrBackend`]: produces both from a matrix
//!
//! [`NativeBackend`] wires in [`SymbolicQr`] and [`NumericQr`].

use crate::error::QrError;
use crate::qr::{NumericQr, Order, SymbolicQr};
use crate::sparse::CscMatrix;

/// Outcome of the ordering and symbolic analysis stage
pub trait SymbolicAnalysis {
    /// Inverse row permutation, at least `m2` entries
    fn pinv(&self) -> &[usize];

    /// Column permutation, `None` for the natural order
    fn q(&self) -> Option<&[usize]>;

    /// Number of rows of the factors, including fictitious rows
    fn m2(&self) -> usize;
}

/// Outcome of the numeric factorization stage
pub trait QrFactors {
    /// Householder vectors, one column per reflection
    fn householder(&self) -> &CscMatrix;

    /// Upper triangular factor with the diagonal stored last in each column
    fn r(&self) -> &CscMatrix;

    /// Reflection coefficients, one per column
    fn beta(&self) -> &[f64];
}

/// Source of symbolic analyses and numeric factorizations
///
/// Implementations must be `Send + Sync` so independent solves can share a
/// backend across threads.
pub trait QrBackend: Send + Sync {
    /// Result of the analysis stage
    type Symbolic: SymbolicAnalysis;
    /// Result of the factorization stage
    type Numeric: QrFactors;

    /// Choose a column ordering and analyse the structure of the factors
    fn analyze(&self, order: Order, a: &CscMatrix) -> Result<Self::Symbolic, QrError>;

    /// Compute the numeric factors of `a`
    fn factorize(
        &self,
        a: &CscMatrix,
        symbolic: &Self::Symbolic,
    ) -> Result<Self::Numeric, QrError>;
}

/// Left-looking sparse Householder QR implemented in this crate
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl QrBackend for NativeBackend {
    type Symbolic = SymbolicQr;
    type Numeric = NumericQr;

    fn analyze(&self, order: Order, a: &CscMatrix) -> Result<SymbolicQr, QrError> {
        SymbolicQr::analyze(order, a)
    }

    fn factorize(&self, a: &CscMatrix, symbolic: &SymbolicQr) -> Result<NumericQr, QrError> {
        NumericQr::factorize(a, symbolic)
    }
}

impl SymbolicAnalysis for SymbolicQr {
    fn pinv(&self) -> &[usize] {
        SymbolicQr::pinv(self)
    }

    fn q(&self) -> Option<&[usize]> {
        SymbolicQr::q(self)
    }

    fn m2(&self) -> usize {
        SymbolicQr::m2(self)
    }
}

impl QrFactors for NumericQr {
    fn householder(&self) -> &CscMatrix {
        NumericQr::householder(self)
    }

    fn r(&self) -> &CscMatrix {
        NumericQr::r(self)
    }

    fn beta(&self) -> &[f64] {
        NumericQr::beta(self)
    }
}
