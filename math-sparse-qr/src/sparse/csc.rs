//! Compressed Sparse Column (CSC) matrix format
//!
//! CSC format stores:
//! - `values`: Non-zero entries in column-major order
//! - `row_indices`: Row index for each value
//! - `col_ptrs`: Index into values/row_indices where each column starts

use crate::complex::Complex;
use crate::error::QrError;
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Compressed Sparse Column (CSC) matrix of complex values
///
/// Fields are public so callers can build a matrix from raw arrays. Nothing is
/// checked on construction; [`CscMatrix::is_valid`] is the structural check the
/// solver runs before using a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    /// Number of rows (m)
    pub num_rows: usize,
    /// Number of columns (n)
    pub num_cols: usize,
    /// Column pointers: col_ptrs[j] is the start index in values/row_indices for column j
    /// col_ptrs[num_cols] = nnz (total number of non-zeros)
    pub col_ptrs: Vec<usize>,
    /// Row indices for each value
    pub row_indices: Vec<usize>,
    /// Non-zero values in column-major order
    pub values: Vec<Complex>,
}

impl CscMatrix {
    /// Create a new empty CSC matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            col_ptrs: vec![0; num_cols + 1],
            row_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create a CSC matrix from raw components
    ///
    /// The arrays are taken as-is; use [`CscMatrix::is_valid`] to check them.
    pub fn from_raw_parts(
        num_rows: usize,
        num_cols: usize,
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<Complex>,
    ) -> Self {
        Self {
            num_rows,
            num_cols,
            col_ptrs,
            row_indices,
            values,
        }
    }

    /// Create a CSC matrix from a dense matrix
    ///
    /// Only stores entries with magnitude > threshold
    pub fn from_dense(dense: &Array2<Complex>, threshold: f64) -> Self {
        let num_rows = dense.nrows();
        let num_cols = dense.ncols();

        let mut values = Vec::new();
        let mut row_indices = Vec::new();
        let mut col_ptrs = vec![0usize; num_cols + 1];

        for j in 0..num_cols {
            for i in 0..num_rows {
                let val = dense[[i, j]];
                if val.abs() > threshold {
                    values.push(val);
                    row_indices.push(i);
                }
            }
            col_ptrs[j + 1] = values.len();
        }

        Self {
            num_rows,
            num_cols,
            col_ptrs,
            row_indices,
            values,
        }
    }

    /// Create a CSC matrix from COO (Coordinate) format triplets
    ///
    /// Triplets are (row, col, value). Duplicate entries are summed. Triplets
    /// outside the `num_rows x num_cols` shape are skipped.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, Complex)>,
    ) -> Self {
        let before = triplets.len();
        triplets.retain(|&(row, col, _)| row < num_rows && col < num_cols);
        if triplets.len() < before {
            log::debug!(
                "from_triplets: skipped {} entries outside {}x{}",
                before - triplets.len(),
                num_rows,
                num_cols
            );
        }
        // Sort by column, then by row
        triplets.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut values: Vec<Complex> = Vec::with_capacity(triplets.len());
        let mut row_indices = Vec::with_capacity(triplets.len());
        let mut counts = vec![0usize; num_cols];

        let mut prev: Option<(usize, usize)> = None;
        for (row, col, val) in triplets {
            if prev == Some((row, col)) {
                if let Some(last) = values.last_mut() {
                    *last += val;
                }
                continue;
            }
            values.push(val);
            row_indices.push(row);
            counts[col] += 1;
            prev = Some((row, col));
        }

        let mut col_ptrs = vec![0usize; num_cols + 1];
        for j in 0..num_cols {
            col_ptrs[j + 1] = col_ptrs[j] + counts[j];
        }

        Self {
            num_rows,
            num_cols,
            col_ptrs,
            row_indices,
            values,
        }
    }

    /// Create identity matrix in CSC format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            col_ptrs: (0..=n).collect(),
            row_indices: (0..n).collect(),
            values: vec![Complex::one(); n],
        }
    }

    /// Check that this is a well-formed column-compressed structure
    ///
    /// Column pointers must start at 0 and never decrease, the index and value
    /// arrays must cover every stored entry, and every row index must be in range.
    pub fn is_valid(&self) -> bool {
        if self.col_ptrs.len() != self.num_cols + 1 || self.col_ptrs[0] != 0 {
            return false;
        }
        if self.col_ptrs.windows(2).any(|w| w[0] > w[1]) {
            return false;
        }
        let nnz = self.col_ptrs[self.num_cols];
        if self.row_indices.len() < nnz || self.values.len() < nnz {
            return false;
        }
        self.row_indices[..nnz].iter().all(|&i| i < self.num_rows)
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.col_ptrs.last().copied().unwrap_or(0)
    }

    /// True when the matrix has at least as many rows as columns
    pub fn is_tall(&self) -> bool {
        self.num_rows >= self.num_cols
    }

    /// Get the range of indices in values/row_indices for a given column
    pub fn col_range(&self, col: usize) -> Range<usize> {
        self.col_ptrs[col]..self.col_ptrs[col + 1]
    }

    /// Get the (row, value) pairs for a column
    pub fn col_entries(&self, col: usize) -> impl Iterator<Item = (usize, Complex)> + '_ {
        let range = self.col_range(col);
        self.row_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Get element at (i, j), summing duplicates; returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> Complex {
        self.col_entries(j)
            .filter(|&(row, _)| row == i)
            .fold(Complex::zero(), |acc, (_, v)| acc + v)
    }

    /// Matrix-vector product: y = A * x
    pub fn matvec(&self, x: &Array1<Complex>) -> Array1<Complex> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        let mut y = Array1::from_elem(self.num_rows, Complex::zero());
        for j in 0..self.num_cols {
            let xj = x[j];
            for (i, a_ij) in self.col_entries(j) {
                y[i] += a_ij * xj;
            }
        }
        y
    }

    /// Hermitian (conjugate transpose) matrix-vector product: y = A^H * x
    pub fn matvec_hermitian(&self, x: &Array1<Complex>) -> Array1<Complex> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");

        let mut y = Array1::from_elem(self.num_cols, Complex::zero());
        for j in 0..self.num_cols {
            let mut sum = Complex::zero();
            for (i, a_ij) in self.col_entries(j) {
                sum += a_ij.conj() * x[i];
            }
            y[j] = sum;
        }
        y
    }

    /// Transpose with values copied: A^T
    pub fn transpose(&self) -> Result<Self, QrError> {
        self.transpose_with(false)
    }

    /// Conjugate transpose with values copied: A^H
    pub fn adjoint(&self) -> Result<Self, QrError> {
        self.transpose_with(true)
    }

    fn transpose_with(&self, conjugate: bool) -> Result<Self, QrError> {
        if !self.is_valid() {
            return Err(QrError::Transpose);
        }
        let nnz = self.nnz();

        // Row counts of A become column pointers of A^T
        let mut col_ptrs = vec![0usize; self.num_rows + 1];
        for &i in &self.row_indices[..nnz] {
            col_ptrs[i + 1] += 1;
        }
        for i in 0..self.num_rows {
            col_ptrs[i + 1] += col_ptrs[i];
        }

        let mut next = col_ptrs[..self.num_rows].to_vec();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![Complex::zero(); nnz];
        for j in 0..self.num_cols {
            for (i, v) in self.col_entries(j) {
                let q = next[i];
                next[i] += 1;
                row_indices[q] = j;
                values[q] = if conjugate { v.conj() } else { v };
            }
        }

        Ok(Self {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            col_ptrs,
            row_indices,
            values,
        })
    }

    /// Convert to dense matrix (for debugging/small matrices)
    pub fn to_dense(&self) -> Array2<Complex> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), Complex::zero());
        for j in 0..self.num_cols {
            for (i, v) in self.col_entries(j) {
                dense[[i, j]] += v;
            }
        }
        dense
    }
}
