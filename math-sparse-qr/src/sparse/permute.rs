//! Permutation vectors
//!
//! A permutation is a slice `p` where `p[k]` is the original index placed at
//! position `k`. `None` stands for the identity. [`pvec`] gathers through the
//! permutation and [`ipvec`] scatters through it, so the two are inverses.

use super::csc::CscMatrix;
use crate::complex::Complex;

#[inline]
fn at(p: Option<&[usize]>, k: usize) -> usize {
    p.map_or(k, |p| p[k])
}

/// Gather: `x[k] = b[p[k]]` for `k < n`
pub fn pvec(p: Option<&[usize]>, b: &[Complex], x: &mut [Complex], n: usize) {
    for k in 0..n {
        x[k] = b[at(p, k)];
    }
}

/// Scatter: `x[p[k]] = b[k]` for `k < n`
pub fn ipvec(p: Option<&[usize]>, b: &[Complex], x: &mut [Complex], n: usize) {
    for k in 0..n {
        x[at(p, k)] = b[k];
    }
}

/// Invert a permutation: `pinv[p[k]] = k`
pub fn inverse_permutation(p: &[usize]) -> Vec<usize> {
    let mut pinv = vec![0usize; p.len()];
    for (k, &pk) in p.iter().enumerate() {
        pinv[pk] = k;
    }
    pinv
}

/// Column permutation `C = A(:, q)`
pub fn permute_columns(a: &CscMatrix, q: Option<&[usize]>) -> CscMatrix {
    let mut col_ptrs = Vec::with_capacity(a.num_cols + 1);
    let mut row_indices = Vec::with_capacity(a.nnz());
    let mut values = Vec::with_capacity(a.nnz());

    col_ptrs.push(0);
    for k in 0..a.num_cols {
        for (i, v) in a.col_entries(at(q, k)) {
            row_indices.push(i);
            values.push(v);
        }
        col_ptrs.push(row_indices.len());
    }

    CscMatrix::from_raw_parts(a.num_rows, a.num_cols, col_ptrs, row_indices, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize) -> Vec<Complex> {
        (0..n).map(|k| Complex::new(k as f64, -(k as f64))).collect()
    }

    #[test]
    fn test_pvec_gathers() {
        let b = seq(3);
        let mut x = vec![Complex::zero(); 3];
        pvec(Some(&[2, 0, 1]), &b, &mut x, 3);
        assert_eq!(x, vec![b[2], b[0], b[1]]);
    }

    #[test]
    fn test_ipvec_scatters() {
        let b = seq(3);
        let mut x = vec![Complex::zero(); 3];
        ipvec(Some(&[2, 0, 1]), &b, &mut x, 3);
        assert_eq!(x, vec![b[1], b[2], b[0]]);
    }

    #[test]
    fn test_pvec_ipvec_are_inverse() {
        let p = [3, 1, 4, 0, 2];
        let b = seq(5);
        let mut x = vec![Complex::zero(); 5];
        let mut back = vec![Complex::zero(); 5];
        pvec(Some(&p), &b, &mut x, 5);
        ipvec(Some(&p), &x, &mut back, 5);
        assert_eq!(back, b);

        let pinv = inverse_permutation(&p);
        let mut via_inverse = vec![Complex::zero(); 5];
        pvec(Some(&pinv), &x, &mut via_inverse, 5);
        assert_eq!(via_inverse, b);
    }

    #[test]
    fn test_identity_and_partial_length() {
        let b = seq(4);
        let mut x = vec![Complex::new(9.0, 9.0); 6];
        pvec(None, &b, &mut x, 4);
        assert_eq!(&x[..4], &b[..]);
        assert_eq!(x[4], Complex::new(9.0, 9.0));
    }

    #[test]
    fn test_permute_columns() {
        let a = CscMatrix::from_triplets(
            2,
            3,
            vec![
                (0, 0, Complex::new(1.0, 0.0)),
                (1, 1, Complex::new(2.0, 0.0)),
                (0, 2, Complex::new(3.0, 0.0)),
                (1, 2, Complex::new(4.0, 0.0)),
            ],
        );
        let c = permute_columns(&a, Some(&[2, 0, 1]));
        assert!(c.is_valid());
        for k in 0..3 {
            for i in 0..2 {
                assert_eq!(c.get(i, k), a.get(i, [2, 0, 1][k]));
            }
        }
        assert_eq!(permute_columns(&a, None), a);
    }
}
