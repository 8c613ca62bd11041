//! Compressed sparse row matrices and conjugate gradient least squares.
//!
//! The conformal system has a handful of non-zeros per row, so it is
//! assembled from triplets into CSR form and solved with CGLS, which runs
//! conjugate gradients on `AᵀA x = Aᵀb` without forming `AᵀA`.

use nalgebra::{DMatrix, DVector};

use crate::error::{MeshError, Result};

/// Compressed Sparse Row (CSR) matrix.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    /// `row_ptr[i]..row_ptr[i + 1]` indexes the entries of row `i`.
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from `(row, col, value)` triplets.
    ///
    /// Entries at the same position are summed. Triplets outside the
    /// `rows` x `cols` shape are rejected.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        mut triplets: Vec<(usize, usize, f64)>,
    ) -> Result<Self> {
        if let Some(&(r, c, _)) = triplets.iter().find(|&&(r, c, _)| r >= rows || c >= cols) {
            return Err(MeshError::InvalidState(format!(
                "triplet ({}, {}) outside a {} x {} matrix",
                r, c, rows, cols
            )));
        }

        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += val;
                }
                continue;
            }
            col_idx.push(col);
            values.push(val);
            row_ptr[row + 1] += 1;
            last = Some((row, col));
        }
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Ok(Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Multiply matrix by vector: `y = A x`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.cols);
        DVector::from_iterator(
            self.rows,
            (0..self.rows).map(|i| self.row(i).map(|(c, v)| v * x[c]).sum::<f64>()),
        )
    }

    /// Multiply the transpose by a vector: `y = Aᵀ x`.
    pub fn transpose_mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.rows);
        let mut y = DVector::zeros(self.cols);
        for i in 0..self.rows {
            let xi = x[i];
            if xi == 0.0 {
                continue;
            }
            for (c, v) in self.row(i) {
                y[c] += v * xi;
            }
        }
        y
    }

    /// Expand into a dense matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for (c, v) in self.row(i) {
                dense[(i, c)] += v;
            }
        }
        dense
    }
}

/// Solve `min ||A x - b||` with conjugate gradients on the normal equations.
///
/// Starting from zero keeps every iterate in the row space of `A`, so a
/// rank-deficient system converges to its minimum-norm solution. Stops
/// when `||Aᵀ r|| <= tolerance * ||Aᵀ b||`.
///
/// # Errors
///
/// Returns [`MeshError::ConvergenceFailed`] after `max_iter` iterations.
pub fn conjugate_gradient_least_squares(
    a: &CsrMatrix,
    b: &DVector<f64>,
    max_iter: usize,
    tolerance: f64,
) -> Result<DVector<f64>> {
    let mut x = DVector::zeros(a.ncols());
    let mut r = b.clone();
    let mut s = a.transpose_mul_vec(&r);

    let target = tolerance * s.norm();
    let mut gamma = s.norm_squared();
    if gamma.sqrt() <= target || gamma == 0.0 {
        return Ok(x);
    }

    let mut p = s.clone();
    for _ in 0..max_iter {
        let q = a.mul_vec(&p);
        let q_norm_sq = q.norm_squared();
        if q_norm_sq <= f64::MIN_POSITIVE {
            break;
        }
        let alpha = gamma / q_norm_sq;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &q, 1.0);
        s = a.transpose_mul_vec(&r);

        let new_gamma = s.norm_squared();
        if new_gamma.sqrt() <= target {
            return Ok(x);
        }

        let beta = new_gamma / gamma;
        p = &s + beta * &p;
        gamma = new_gamma;
    }

    Err(MeshError::ConvergenceFailed {
        iterations: max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_from_triplets_with_duplicates() {
        let triplets = vec![
            (0, 0, 2.0),
            (0, 0, 2.0),
            (0, 1, 1.0),
            (2, 0, 1.0),
            (2, 1, 3.0),
        ];
        let a = CsrMatrix::from_triplets(3, 2, triplets).unwrap();
        assert_eq!(a.nnz(), 4);

        let y = a.mul_vec(&DVector::from_vec(vec![1.0, 1.0]));
        assert_eq!(y, DVector::from_vec(vec![5.0, 0.0, 4.0]));
        assert_eq!(a.to_dense()[(0, 0)], 4.0);
    }

    #[test]
    fn test_csr_rejects_out_of_range_triplet() {
        let result = CsrMatrix::from_triplets(2, 2, vec![(0, 2, 1.0)]);
        assert!(matches!(result, Err(MeshError::InvalidState(_))));
    }

    #[test]
    fn test_transpose_mul_vec_matches_dense() {
        let triplets = vec![(0, 0, 1.0), (0, 2, -2.0), (1, 1, 3.0), (2, 0, 4.0)];
        let a = CsrMatrix::from_triplets(3, 3, triplets).unwrap();
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let expected = a.to_dense().transpose() * &x;
        assert!((a.transpose_mul_vec(&x) - expected).norm() < 1e-12);
    }

    #[test]
    fn test_cgls_overdetermined() {
        // Fit y = 2x + 1 through noisy samples; compare with the dense solve.
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.1, 2.9, 5.2, 6.8, 9.1];
        let mut triplets = Vec::new();
        for (i, &x) in xs.iter().enumerate() {
            triplets.push((i, 0, x));
            triplets.push((i, 1, 1.0));
        }
        let a = CsrMatrix::from_triplets(5, 2, triplets).unwrap();
        let b = DVector::from_row_slice(&ys);

        let x = conjugate_gradient_least_squares(&a, &b, 100, 1e-12).unwrap();
        let dense = a.to_dense();
        let expected = (dense.transpose() * &dense)
            .try_inverse()
            .unwrap()
            * dense.transpose()
            * &b;
        assert!((x - expected).norm() < 1e-9);
    }

    #[test]
    fn test_cgls_zero_rhs() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 1.0)]).unwrap();
        let x = conjugate_gradient_least_squares(&a, &DVector::zeros(2), 10, 1e-12).unwrap();
        assert_eq!(x, DVector::zeros(2));
    }

    #[test]
    fn test_cgls_reports_non_convergence() {
        let triplets = vec![(0, 0, 1.0), (1, 1, 100.0), (2, 2, 1e4), (3, 3, 1e-3)];
        let a = CsrMatrix::from_triplets(4, 4, triplets).unwrap();
        let b = DVector::from_vec(vec![1.0, 1.0, 1.0, 1.0]);
        let result = conjugate_gradient_least_squares(&a, &b, 1, 1e-14);
        assert!(matches!(
            result,
            Err(MeshError::ConvergenceFailed { iterations: 1 })
        ));
    }
}
