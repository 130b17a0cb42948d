//! Error type for the sparse QR solver

use thiserror::Error;

/// Errors reported by analysis, factorization and the QR solve
///
/// `InvalidMatrix` and `BufferTooShort` are precondition failures: they are
/// detected before the right-hand side is touched. The other variants come
/// from a pipeline stage failing part way through a solve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    #[error("Matrix is not a valid column-compressed structure")]
    InvalidMatrix,
    #[error("Right-hand side too short: need at least {required} entries, got {actual}")]
    BufferTooShort { required: usize, actual: usize },
    #[error("Column ordering failed: {0}")]
    Ordering(String),
    #[error("Symbolic analysis failed: {0}")]
    Symbolic(String),
    #[error("Numeric factorization failed: {0}")]
    Factorization(String),
    #[error("Could not form the conjugate transpose")]
    Transpose,
}
