//! Sparse QR solve for least-squares and underdetermined systems
//!
//! For `A` of size `m x n`:
//!
//! - `m >= n`: factor `P A Q = Q_h R`, then `x = Q R^{-1} Q_h^H P b`, the
//!   least-squares solution.
//! - `m < n`: factor `A^H` instead, then `x = P^T Q_h R^{-H} Q^T b`, the
//!   minimum-norm solution of `A x = b`.
//!
//! The right-hand side and the solution share one buffer of length
//! `max(m, n)`: `b` is read from the first `m` entries and `x` is written to
//! the first `n`.

use super::householder::happly;
use super::ordering::Order;
use crate::complex::Complex;
use crate::error::QrError;
use crate::parallel::parallel_map;
use crate::sparse::{CscMatrix, ipvec, pvec, usolve, utsolve};
use crate::traits::{NativeBackend, QrBackend, QrFactors, SymbolicAnalysis};
use ndarray::Array1;

/// Configuration for the QR solver
#[derive(Debug, Clone)]
pub struct QrSolveConfig {
    /// Fill-reducing column ordering
    pub order: Order,
    /// Log a summary line per solve at info level (0 = silent)
    pub verbosity: usize,
}

impl Default for QrSolveConfig {
    fn default() -> Self {
        Self {
            order: Order::Qr,
            verbosity: 0,
        }
    }
}

impl QrSolveConfig {
    /// Default configuration with the given ordering
    pub fn with_order(order: Order) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }
}

/// Solve `A x = b` in place with a sparse QR factorization
///
/// `b` must hold at least `max(m, n)` entries. On success its first `n`
/// entries hold the solution. If `a` is invalid or `b` is too short, `b` is
/// left untouched. If the analysis or factorization fails, the contents of
/// `b` are unspecified.
///
/// Rank deficiency is not detected: a zero on the diagonal of R shows up as
/// NaN or infinite entries in the solution.
pub fn qr_solve(order: Order, a: &CscMatrix, b: &mut [Complex]) -> Result<(), QrError> {
    qr_solve_with_config(&QrSolveConfig::with_order(order), a, b)
}

/// Same as [`qr_solve`], returning only whether the solve succeeded
pub fn qrsol(order: Order, a: &CscMatrix, b: &mut [Complex]) -> bool {
    qr_solve(order, a, b).is_ok()
}

/// [`qr_solve`] with an explicit configuration
pub fn qr_solve_with_config(
    config: &QrSolveConfig,
    a: &CscMatrix,
    b: &mut [Complex],
) -> Result<(), QrError> {
    qr_solve_with_backend(&NativeBackend, config, a, b)
}

/// [`qr_solve`] using `backend` for the analysis and factorization
pub fn qr_solve_with_backend<B: QrBackend>(
    backend: &B,
    config: &QrSolveConfig,
    a: &CscMatrix,
    b: &mut [Complex],
) -> Result<(), QrError> {
    if !a.is_valid() {
        return Err(QrError::InvalidMatrix);
    }
    let (m, n) = (a.num_rows, a.num_cols);
    let required = m.max(n);
    if b.len() < required {
        return Err(QrError::BufferTooShort {
            required,
            actual: b.len(),
        });
    }

    let result = if a.is_tall() {
        solve_least_squares(backend, config.order, a, b)
    } else {
        solve_min_norm(backend, config.order, a, b)
    };

    match &result {
        Ok(()) if config.verbosity > 0 => {
            log::info!(
                "QR solve: {}x{} system, {} nonzeros, {:?} ordering",
                m,
                n,
                a.nnz(),
                config.order
            );
        }
        Ok(()) => {}
        Err(e) => log::warn!("QR solve of {m}x{n} system failed: {e}"),
    }
    result
}

fn solve_least_squares<B: QrBackend>(
    backend: &B,
    order: Order,
    a: &CscMatrix,
    b: &mut [Complex],
) -> Result<(), QrError> {
    let (m, n) = (a.num_rows, a.num_cols);
    log::debug!("QR solve: least squares on {m}x{n}");

    let symbolic = backend.analyze(order, a)?;
    let factors = backend.factorize(a, &symbolic)?;
    check_factors(&symbolic, &factors, m, n)?;

    let mut x = vec![Complex::zero(); symbolic.m2()];
    ipvec(Some(symbolic.pinv()), b, &mut x, m);
    let v = factors.householder();
    for (k, &beta) in factors.beta()[..n].iter().enumerate() {
        happly(v, k, beta, &mut x);
    }
    usolve(factors.r(), &mut x);
    ipvec(symbolic.q(), &x, b, n);
    Ok(())
}

fn solve_min_norm<B: QrBackend>(
    backend: &B,
    order: Order,
    a: &CscMatrix,
    b: &mut [Complex],
) -> Result<(), QrError> {
    let (m, n) = (a.num_rows, a.num_cols);
    log::debug!("QR solve: minimum norm on {m}x{n}");

    let at = a.adjoint()?;
    let symbolic = backend.analyze(order, &at)?;
    let factors = backend.factorize(&at, &symbolic)?;
    check_factors(&symbolic, &factors, n, m)?;

    let mut x = vec![Complex::zero(); symbolic.m2()];
    pvec(symbolic.q(), b, &mut x, m);
    utsolve(factors.r(), &mut x);
    let v = factors.householder();
    for (k, &beta) in factors.beta()[..m].iter().enumerate().rev() {
        happly(v, k, beta, &mut x);
    }
    pvec(Some(symbolic.pinv()), &x, b, n);
    Ok(())
}

/// Reject analyses and factors that would index outside the solve buffers
///
/// `rows x cols` is the shape of the factorized matrix.
fn check_factors<S: SymbolicAnalysis, F: QrFactors>(
    symbolic: &S,
    factors: &F,
    rows: usize,
    cols: usize,
) -> Result<(), QrError> {
    let m2 = symbolic.m2();
    if m2 < rows {
        return Err(QrError::Symbolic(format!(
            "factor height {m2} is smaller than the {rows} matrix rows"
        )));
    }
    let pinv = symbolic.pinv();
    if pinv.len() < rows || pinv[..rows].iter().any(|&i| i >= m2) {
        return Err(QrError::Symbolic(
            "row permutation does not map the matrix rows into the factors".to_string(),
        ));
    }
    if let Some(q) = symbolic.q()
        && (q.len() < cols || q[..cols].iter().any(|&j| j >= cols))
    {
        return Err(QrError::Symbolic(
            "column permutation does not cover the matrix columns".to_string(),
        ));
    }

    let (v, r) = (factors.householder(), factors.r());
    let fits = |f: &CscMatrix| f.num_rows <= m2 && f.num_cols == cols && f.is_valid();
    if !fits(v) || !fits(r) || factors.beta().len() < cols {
        return Err(QrError::Factorization(format!(
            "factors do not match a {m2}x{cols} factorization"
        )));
    }
    Ok(())
}

/// Solve `A x = b` for an `ndarray` right-hand side of length `m`
///
/// Returns the `n` entries of the solution.
pub fn qr_solve_array(
    order: Order,
    a: &CscMatrix,
    b: &Array1<Complex>,
) -> Result<Array1<Complex>, QrError> {
    solve_owned(&QrSolveConfig::with_order(order), a, &b.to_vec()).map(Array1::from_vec)
}

/// Solve independent systems, in parallel when the `rayon` feature is enabled
///
/// Each right-hand side has `m` entries for its matrix; each solution has `n`.
pub fn qr_solve_batch(
    order: Order,
    systems: &[(&CscMatrix, Vec<Complex>)],
) -> Vec<Result<Vec<Complex>, QrError>> {
    let config = QrSolveConfig::with_order(order);
    log::debug!("QR solve: batch of {} systems", systems.len());
    parallel_map(systems, |(a, b)| solve_owned(&config, a, b))
}

fn solve_owned(
    config: &QrSolveConfig,
    a: &CscMatrix,
    b: &[Complex],
) -> Result<Vec<Complex>, QrError> {
    let (m, n) = (a.num_rows, a.num_cols);
    if b.len() < m {
        return Err(QrError::BufferTooShort {
            required: m,
            actual: b.len(),
        });
    }
    let mut buffer = vec![Complex::zero(); m.max(n)];
    buffer[..m].copy_from_slice(&b[..m]);
    qr_solve_with_config(config, a, &mut buffer)?;
    buffer.truncate(n);
    Ok(buffer)
}
