//! Numeric sparse Householder QR
//!
//! Left-looking factorization of `A(:, q)` with rows permuted by `pinv`. For
//! column `k`:
//!
//! ```text
//! x = A(:, q[k]) scattered by pinv
//! for each i in the pattern of R(:, k), in topological order:
//!     x = H_i x              (reflection i, computed earlier)
//!     R(i, k) = x(i)
//! v = x(k:m2) ; beta_k, R(k, k) = house(v)
//! V(:, k) = v
//! ```
//!
//! The pattern of `R(:, k)` is the union of the elimination tree paths from the
//! leftmost column of each row of `A(:, q[k])` up to `k`. The pattern of
//! `V(:, k)` is row `k`, the rows of `A(:, q[k])` below `k`, and the patterns of
//! the children of `k` in the tree. `R(k, k)` is the last entry of column `k`.

use super::householder::{apply_reflection, house};
use super::symbolic::SymbolicQr;
use crate::complex::Complex;
use crate::error::QrError;
use crate::sparse::CscMatrix;

/// Householder vectors, R factor and reflection coefficients of a sparse QR
#[derive(Debug, Clone)]
pub struct NumericQr {
    v: CscMatrix,
    r: CscMatrix,
    beta: Vec<f64>,
}

impl NumericQr {
    /// Factorize `a` using its symbolic analysis
    pub fn factorize(a: &CscMatrix, symbolic: &SymbolicQr) -> Result<Self, QrError> {
        if !a.is_valid() {
            return Err(QrError::InvalidMatrix);
        }
        let (m, n) = (a.num_rows, a.num_cols);
        if symbolic.shape() != (m, n) {
            let (sm, sn) = symbolic.shape();
            return Err(QrError::Factorization(format!(
                "symbolic analysis is for a {sm}x{sn} matrix, got {m}x{n}"
            )));
        }

        let m2 = symbolic.m2();
        let q = symbolic.q();
        let pinv = symbolic.pinv();
        let parent = symbolic.parent();
        let leftmost = symbolic.leftmost();

        let mut v_ptrs = Vec::with_capacity(n + 1);
        let mut v_rows: Vec<usize> = Vec::with_capacity(symbolic.lnz());
        let mut v_vals: Vec<Complex> = Vec::with_capacity(symbolic.lnz());
        let mut r_ptrs = Vec::with_capacity(n + 1);
        let mut r_rows: Vec<usize> = Vec::with_capacity(symbolic.unz());
        let mut r_vals: Vec<Complex> = Vec::with_capacity(symbolic.unz());
        let mut beta = vec![0.0; n];

        let mut x = vec![Complex::zero(); m2];
        // Last column that visited each tree node or factor row. Nodes and rows
        // share marks: row i is the pivot row of column i, so a column on the
        // current path keeps its pivot row out of V(:, k).
        let mut mark: Vec<Option<usize>> = vec![None; m2];
        let mut stack = vec![0usize; n];
        let mut path = Vec::new();

        for k in 0..n {
            r_ptrs.push(r_rows.len());
            let p1 = v_rows.len();
            v_ptrs.push(p1);
            mark[k] = Some(k);
            v_rows.push(k);

            let mut top = n;
            let col = q.map_or(k, |q| q[k]);
            for (row, value) in a.col_entries(col) {
                // Tree path from the leftmost column of this row up to k
                path.clear();
                let mut node = leftmost[row];
                while let Some(i) = node {
                    if mark[i] == Some(k) {
                        break;
                    }
                    path.push(i);
                    mark[i] = Some(k);
                    node = parent[i];
                }
                while let Some(i) = path.pop() {
                    top -= 1;
                    stack[top] = i;
                }

                let i = pinv[row];
                x[i] += value;
                if i > k && mark[i].is_none_or(|j| j < k) {
                    v_rows.push(i);
                    mark[i] = Some(k);
                }
            }

            for &i in &stack[top..n] {
                let range = v_ptrs[i]..v_ptrs[i + 1];
                apply_reflection(&v_rows[range.clone()], &v_vals[range], beta[i], &mut x);
                r_rows.push(i);
                r_vals.push(x[i]);
                x[i] = Complex::zero();

                if parent[i] == Some(k) {
                    // Rows of a child's Householder vector move into V(:, k)
                    for p in v_ptrs[i]..v_ptrs[i + 1] {
                        let row = v_rows[p];
                        if mark[row].is_none_or(|j| j < k) {
                            mark[row] = Some(k);
                            v_rows.push(row);
                        }
                    }
                }
            }

            for &row in &v_rows[p1..] {
                v_vals.push(x[row]);
                x[row] = Complex::zero();
            }
            let (b, diag) = house(&mut v_vals[p1..]);
            beta[k] = b;
            r_rows.push(k);
            r_vals.push(diag);
        }
        r_ptrs.push(r_rows.len());
        v_ptrs.push(v_rows.len());

        log::debug!(
            "QR factorization: nnz(V) = {}, nnz(R) = {}",
            v_rows.len(),
            r_rows.len()
        );

        Ok(Self {
            v: CscMatrix::from_raw_parts(m2, n, v_ptrs, v_rows, v_vals),
            r: CscMatrix::from_raw_parts(m2, n, r_ptrs, r_rows, r_vals),
            beta,
        })
    }

    /// Householder vectors, one per column (`m2 x n`)
    pub fn householder(&self) -> &CscMatrix {
        &self.v
    }

    /// Upper triangular factor (`m2 x n`, diagonal last in each column)
    pub fn r(&self) -> &CscMatrix {
        &self.r
    }

    /// Reflection coefficients, one per column
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::householder::happly;
    use crate::qr::ordering::Order;
    use crate::sparse::{ipvec, permute_columns};

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    fn sample() -> CscMatrix {
        CscMatrix::from_triplets(
            5,
            3,
            vec![
                (0, 0, c(2.0, 1.0)),
                (2, 0, c(-1.0, 0.0)),
                (4, 0, c(0.5, 0.5)),
                (1, 1, c(3.0, 0.0)),
                (2, 1, c(1.0, -2.0)),
                (0, 2, c(0.0, 1.0)),
                (3, 2, c(4.0, 0.0)),
                (4, 2, c(-1.0, 1.0)),
            ],
        )
    }

    /// Rebuild column k of Q^H P A(:, q) by applying the reflections and check
    /// it against R
    fn check_factorization(a: &CscMatrix, order: Order) {
        let s = SymbolicQr::analyze(order, a).expect("analysis should succeed");
        let f = NumericQr::factorize(a, &s).expect("factorization should succeed");
        let permuted = permute_columns(a, s.q());
        let m2 = s.m2();
        let n = a.num_cols;

        assert_eq!(f.householder().nnz(), s.lnz());
        assert_eq!(f.r().nnz(), s.unz());
        assert!(f.r().is_valid());
        assert!(f.householder().is_valid());

        let dense_r = f.r().to_dense();
        for k in 0..n {
            let mut col = vec![Complex::zero(); m2];
            let dense_col: Vec<Complex> = (0..a.num_rows).map(|i| permuted.get(i, k)).collect();
            ipvec(Some(s.pinv()), &dense_col, &mut col, a.num_rows);
            for i in 0..n {
                happly(f.householder(), i, f.beta()[i], &mut col);
            }
            for i in 0..m2 {
                let expected = if i < n { dense_r[[i, k]] } else { Complex::zero() };
                assert!(
                    col[i].approx_eq_tol(expected, 1e-12),
                    "{order:?}: (Q^H A)[{i},{k}] = {} but R = {}",
                    col[i],
                    expected
                );
            }
            // R is upper triangular with the diagonal stored last
            let last = f.r().col_range(k).end - 1;
            assert_eq!(f.r().row_indices[last], k);
            assert!(f.r().row_indices[f.r().col_range(k)].iter().all(|&i| i <= k));
        }
    }

    #[test]
    fn test_factorization_reproduces_r() {
        let a = sample();
        for order in Order::ALL {
            check_factorization(&a, order);
        }
    }

    #[test]
    fn test_square_factorization_all_orders() {
        let a = CscMatrix::from_triplets(
            4,
            4,
            vec![
                (0, 0, c(4.0, 0.0)),
                (1, 0, c(1.0, 1.0)),
                (1, 1, c(3.0, -1.0)),
                (3, 1, c(0.0, 2.0)),
                (0, 2, c(-1.0, 0.0)),
                (2, 2, c(5.0, 0.0)),
                (2, 3, c(1.0, 0.0)),
                (3, 3, c(2.0, 2.0)),
            ],
        );
        for order in Order::ALL {
            check_factorization(&a, order);
        }
    }

    #[test]
    fn test_shared_row_structure() {
        let a = CscMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, c(1.0, 0.0)), (0, 1, c(2.0, 0.0)), (1, 0, c(1.0, 0.0))],
        );
        check_factorization(&a, Order::Natural);
    }

    #[test]
    fn test_fictitious_row() {
        // Both columns only touch row 0, so column 1 pivots on an added row
        let a = CscMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, c(1.0, 0.0)), (0, 1, c(2.0, 1.0))],
        );
        let s = SymbolicQr::analyze(Order::Natural, &a).unwrap();
        assert_eq!(s.m2(), 3);
        check_factorization(&a, Order::Natural);
        let f = NumericQr::factorize(&a, &s).unwrap();
        // R(1,1) is structurally present but numerically zero
        let r = f.r().to_dense();
        assert!(r[[1, 1]].abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = sample();
        let s = SymbolicQr::analyze(Order::Natural, &a).unwrap();
        let other = CscMatrix::identity(3);
        assert!(matches!(
            NumericQr::factorize(&other, &s),
            Err(QrError::Factorization(_))
        ));
    }

    #[test]
    fn test_invalid_matrix() {
        let a = sample();
        let s = SymbolicQr::analyze(Order::Natural, &a).unwrap();
        let mut broken = a.clone();
        broken.col_ptrs[3] = 100;
        assert_eq!(
            NumericQr::factorize(&broken, &s).unwrap_err(),
            QrError::InvalidMatrix
        );
    }
}
