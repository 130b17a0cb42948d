//! Sparse matrix structures (CSC format) and the kernels built on them
//!
//! This module provides Compressed Sparse Column (CSC) storage plus the
//! permutation and triangular-solve primitives used by the QR solver.

mod csc;
mod permute;
mod triangular;

pub use csc::CscMatrix;
pub use permute::{inverse_permutation, ipvec, permute_columns, pvec};
pub use triangular::{usolve, utsolve};
