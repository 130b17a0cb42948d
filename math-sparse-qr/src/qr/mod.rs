//! Sparse Householder QR: ordering, analysis, factorization and solve

pub mod householder;
mod numeric;
pub mod ordering;
mod solve;
mod symbolic;

pub use householder::{happly, house};
pub use numeric::NumericQr;
pub use ordering::{Order, column_ordering};
pub use solve::{
    QrSolveConfig, qr_solve, qr_solve_array, qr_solve_batch, qr_solve_with_backend,
    qr_solve_with_config, qrsol,
};
pub use symbolic::SymbolicQr;
