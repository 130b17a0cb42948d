//! Sparse QR solver for complex least-squares and underdetermined systems
//!
//! This crate solves `A x = b` for a sparse complex matrix `A` stored in
//! compressed sparse column form, using a left-looking Householder QR
//! factorization with a fill-reducing column ordering.
//!
//! # Features
//!
//! - **Least squares**: `m >= n` gives the solution minimizing `||A x - b||`
//! - **Minimum norm**: `m < n` gives the smallest `x` with `A x = b`
//! - **Orderings**: natural, minimum degree on `A + A^T`, `A^T A` with dense
//!   rows dropped, or `A^T A`
//! - **Complex scalars**: explicit, overflow-safe complex arithmetic
//! - **Batch solves**: independent systems in parallel (`rayon` feature)
//!
//! # Example
//!
//! ```
//! use math_audio_sparse_qr::{Complex, CscMatrix, Order, qr_solve};
//!
//! // x + y = 3
//! let a = CscMatrix::from_triplets(
//!     1,
//!     2,
//!     vec![(0, 0, Complex::one()), (0, 1, Complex::one())],
//! );
//! // The buffer holds max(m, n) entries: b on input, x on output
//! let mut b = vec![Complex::new(3.0, 0.0), Complex::zero()];
//! qr_solve(Order::Qr, &a, &mut b)?;
//! assert!(b[0].approx_eq(Complex::new(1.5, 0.0)));
//! # Ok::<(), math_audio_sparse_qr::QrError>(())
//! ```

pub mod complex;
pub mod error;
pub mod parallel;
pub mod qr;
pub mod sparse;
pub mod traits;
pub mod vector;

// Re-export main types
pub use complex::{Complex, DEFAULT_TOLERANCE, pack_interleaved, unpack_interleaved};
pub use error::QrError;
pub use sparse::CscMatrix;
pub use traits::{NativeBackend, QrBackend, QrFactors, SymbolicAnalysis};

// Re-export the solver
pub use qr::{
    NumericQr, Order, QrSolveConfig, SymbolicQr, qr_solve, qr_solve_array, qr_solve_batch,
    qr_solve_with_backend, qr_solve_with_config, qrsol,
};
