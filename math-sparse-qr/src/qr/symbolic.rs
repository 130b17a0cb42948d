//! Symbolic analysis for sparse Householder QR
//!
//! Works on `C = A(:, q)` where `q` is the fill-reducing column ordering:
//!
//! 1. **Column elimination tree** of `C^T C`, computed directly from `C` without
//!    forming the product.
//! 2. **Row assignment**: every row of `C` starts in the queue of its leftmost
//!    column. Walking the columns in order, column `k` takes the head of its
//!    queue as its pivot row and hands the rest of the queue to its parent in
//!    the tree. A column with an empty queue gets a fictitious row appended
//!    after the real ones, so the factors are `m2 x n` with `m2 >= m`.
//!    The same walk counts the entries of the Householder vectors.
//! 3. **R column counts** by walking tree paths from each row's leftmost column.

use super::ordering::{Order, column_ordering};
use crate::error::QrError;
use crate::sparse::{CscMatrix, permute_columns};
use std::borrow::Cow;

/// Result of the symbolic QR analysis of an `m x n` matrix
#[derive(Debug, Clone)]
pub struct SymbolicQr {
    num_rows: usize,
    num_cols: usize,
    q: Option<Vec<usize>>,
    pinv: Vec<usize>,
    m2: usize,
    lnz: usize,
    unz: usize,
    parent: Vec<Option<usize>>,
    leftmost: Vec<Option<usize>>,
}

impl SymbolicQr {
    /// Order the columns of `a` and analyse the structure of its QR factors
    pub fn analyze(order: Order, a: &CscMatrix) -> Result<Self, QrError> {
        if !a.is_valid() {
            return Err(QrError::InvalidMatrix);
        }
        let q = column_ordering(order, a)?;
        let c = match &q {
            Some(q) => Cow::Owned(permute_columns(a, Some(q))),
            None => Cow::Borrowed(a),
        };

        let parent = column_etree(&c);
        let rows = assign_rows(&c, &parent);
        let unz = count_r_entries(&c, &parent, &rows.leftmost)?;

        log::debug!(
            "QR symbolic analysis: {}x{} matrix, m2 = {}, nnz(V) = {}, nnz(R) = {}",
            a.num_rows,
            a.num_cols,
            rows.m2,
            rows.lnz,
            unz
        );

        Ok(Self {
            num_rows: a.num_rows,
            num_cols: a.num_cols,
            q,
            pinv: rows.pinv,
            m2: rows.m2,
            lnz: rows.lnz,
            unz,
            parent,
            leftmost: rows.leftmost,
        })
    }

    /// Inverse row permutation: row `i` of `A` becomes row `pinv[i]` of the factors
    ///
    /// Has `m2` entries; entries `m..m2` belong to fictitious rows.
    pub fn pinv(&self) -> &[usize] {
        &self.pinv
    }

    /// Column permutation, `None` for the natural order
    pub fn q(&self) -> Option<&[usize]> {
        self.q.as_deref()
    }

    /// Number of rows of the factors, including fictitious rows
    pub fn m2(&self) -> usize {
        self.m2
    }

    /// Number of entries in the Householder vectors
    pub fn lnz(&self) -> usize {
        self.lnz
    }

    /// Number of entries in R
    pub fn unz(&self) -> usize {
        self.unz
    }

    /// Shape of the analysed matrix
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub(crate) fn parent(&self) -> &[Option<usize>] {
        &self.parent
    }

    pub(crate) fn leftmost(&self) -> &[Option<usize>] {
        &self.leftmost
    }
}

/// Elimination tree of `C^T C`
pub(crate) fn column_etree(c: &CscMatrix) -> Vec<Option<usize>> {
    let n = c.num_cols;
    let mut parent = vec![None; n];
    let mut ancestor: Vec<Option<usize>> = vec![None; n];
    // Last column seen in each row; rows link the columns they touch
    let mut prev: Vec<Option<usize>> = vec![None; c.num_rows];

    for k in 0..n {
        for &row in &c.row_indices[c.col_range(k)] {
            let mut node = prev[row];
            while let Some(i) = node {
                if i >= k {
                    break;
                }
                let next = ancestor[i];
                ancestor[i] = Some(k);
                if next.is_none() {
                    parent[i] = Some(k);
                }
                node = next;
            }
            prev[row] = Some(k);
        }
    }
    parent
}

struct RowAssignment {
    pinv: Vec<usize>,
    leftmost: Vec<Option<usize>>,
    m2: usize,
    lnz: usize,
}

fn assign_rows(c: &CscMatrix, parent: &[Option<usize>]) -> RowAssignment {
    let (m, n) = (c.num_rows, c.num_cols);

    let mut leftmost = vec![None; m];
    for k in (0..n).rev() {
        for &row in &c.row_indices[c.col_range(k)] {
            leftmost[row] = Some(k);
        }
    }

    // One queue of rows per column, as a singly linked list
    let mut next: Vec<Option<usize>> = vec![None; m];
    let mut head: Vec<Option<usize>> = vec![None; n];
    let mut tail: Vec<Option<usize>> = vec![None; n];
    let mut nque = vec![0usize; n];
    for i in (0..m).rev() {
        let Some(k) = leftmost[i] else {
            continue;
        };
        if nque[k] == 0 {
            tail[k] = Some(i);
        }
        nque[k] += 1;
        next[i] = head[k];
        head[k] = Some(i);
    }

    const UNASSIGNED: usize = usize::MAX;
    let mut pinv = vec![UNASSIGNED; m + n];
    let mut m2 = m;
    let mut lnz = 0;
    for k in 0..n {
        // V(k,k) is always stored
        lnz += 1;
        let pivot = match head[k] {
            Some(i) => i,
            None => {
                m2 += 1;
                m2 - 1
            }
        };
        pinv[pivot] = k;
        if nque[k] <= 1 {
            nque[k] = 0;
            continue;
        }
        // Remaining rows of the queue form V(k+1:m, k) and move to the parent
        nque[k] -= 1;
        lnz += nque[k];
        if let (Some(pa), Some(last)) = (parent[k], tail[k]) {
            if nque[pa] == 0 {
                tail[pa] = tail[k];
            }
            next[last] = head[pa];
            head[pa] = next[pivot];
            nque[pa] += nque[k];
        }
    }

    let mut k = n;
    for slot in pinv.iter_mut().take(m) {
        if *slot == UNASSIGNED {
            *slot = k;
            k += 1;
        }
    }
    pinv.truncate(m2);

    RowAssignment {
        pinv,
        leftmost,
        m2,
        lnz,
    }
}

/// Count entries of R: column k holds the tree paths from each row's leftmost
/// column up to k, plus the diagonal
fn count_r_entries(
    c: &CscMatrix,
    parent: &[Option<usize>],
    leftmost: &[Option<usize>],
) -> Result<usize, QrError> {
    let n = c.num_cols;
    let mut mark: Vec<Option<usize>> = vec![None; n];
    let mut unz = 0;
    for k in 0..n {
        mark[k] = Some(k);
        unz += 1;
        for &row in &c.row_indices[c.col_range(k)] {
            let mut node = leftmost[row];
            loop {
                match node {
                    Some(i) if mark[i] == Some(k) => break,
                    Some(i) => {
                        mark[i] = Some(k);
                        unz += 1;
                        node = parent[i];
                    }
                    None => {
                        return Err(QrError::Symbolic(format!(
                            "elimination tree path from row {row} does not reach column {k}"
                        )));
                    }
                }
            }
        }
    }
    Ok(unz)
}
