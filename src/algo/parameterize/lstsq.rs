//! Least squares for the conformal system.
//!
//! Systems are solved sparsely with CGLS. When that stalls on a small
//! system, a dense SVD gives the minimum-norm solution instead.

use log::warn;
use nalgebra::{DMatrix, DVector, SVD};

use crate::error::{MeshError, Result};

use super::sparse::{conjugate_gradient_least_squares, CsrMatrix};

/// Largest dense matrix, in entries, the SVD fallback will build.
const DENSE_FALLBACK_ENTRIES: usize = 1 << 18;

/// Options for the least squares solve.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Relative normal-equation residual at which CGLS stops.
    pub tolerance: f64,
    /// CGLS iteration limit.
    pub max_iterations: usize,
    /// Singular values below this fraction of the largest are treated as
    /// zero by the dense fallback.
    pub rank_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10_000,
            rank_tolerance: 1e-12,
        }
    }
}

impl SolverOptions {
    /// Set the CGLS convergence tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the CGLS iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative rank tolerance of the dense fallback.
    pub fn with_rank_tolerance(mut self, tol: f64) -> Self {
        self.rank_tolerance = tol;
        self
    }
}

/// Solve `min ||A x - b||` and return the minimum-norm minimizer.
///
/// # Errors
///
/// Returns [`MeshError::ConvergenceFailed`] when CGLS does not converge on
/// a system too large for the dense fallback, and
/// [`MeshError::InvalidState`] for mismatched shapes or non-finite input.
pub fn solve_least_squares(
    a: &CsrMatrix,
    b: &DVector<f64>,
    options: &SolverOptions,
) -> Result<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(MeshError::InvalidState(format!(
            "least squares system has {} rows but {} right-hand side values",
            a.nrows(),
            b.len()
        )));
    }
    if a.ncols() == 0 || a.nrows() == 0 {
        return Ok(DVector::zeros(a.ncols()));
    }

    match conjugate_gradient_least_squares(a, b, options.max_iterations, options.tolerance) {
        Ok(x) if x.iter().all(|v| v.is_finite()) => Ok(x),
        Ok(_) => Err(MeshError::InvalidState(
            "least squares system has non-finite coefficients".to_string(),
        )),
        Err(MeshError::ConvergenceFailed { iterations })
            if a.nrows() * a.ncols() <= DENSE_FALLBACK_ENTRIES =>
        {
            warn!(
                "CGLS did not converge in {} iterations; solving {} x {} system densely",
                iterations,
                a.nrows(),
                a.ncols()
            );
            solve_dense(a.to_dense(), b, options.rank_tolerance)
        }
        Err(err) => Err(err),
    }
}

/// Minimum-norm least squares through a truncated SVD.
fn solve_dense(a: DMatrix<f64>, b: &DVector<f64>, rank_tolerance: f64) -> Result<DVector<f64>> {
    let cols = a.ncols();
    let svd = SVD::try_new(a, true, true, f64::EPSILON, 0)
        .ok_or_else(|| MeshError::InvalidState("SVD did not converge".to_string()))?;

    let largest = svd.singular_values.max();
    if !largest.is_finite() {
        return Err(MeshError::InvalidState(
            "least squares system has non-finite coefficients".to_string(),
        ));
    }
    if largest == 0.0 {
        return Ok(DVector::zeros(cols));
    }

    svd.solve(b, rank_tolerance * largest)
        .map_err(|reason| MeshError::InvalidState(reason.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csr(rows: usize, cols: usize, dense: &[f64]) -> CsrMatrix {
        let mut triplets = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let v = dense[r * cols + c];
                if v != 0.0 {
                    triplets.push((r, c, v));
                }
            }
        }
        CsrMatrix::from_triplets(rows, cols, triplets).unwrap()
    }

    #[test]
    fn test_overdetermined_fit() {
        // Fit y = 2x + 1 through exact samples.
        let a = csr(4, 2, &[0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 3.0, 5.0, 7.0]);
        let x = solve_least_squares(&a, &b, &SolverOptions::default()).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_rank_deficient_returns_minimum_norm() {
        // Both columns are identical: x0 + x1 = 2 has minimum-norm solution (1, 1).
        let a = csr(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![2.0, 2.0]);
        let x = solve_least_squares(&a, &b, &SolverOptions::default()).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_underdetermined_returns_minimum_norm() {
        let a = csr(1, 3, &[1.0, 2.0, 2.0]);
        let b = DVector::from_vec(vec![9.0]);
        let x = solve_least_squares(&a, &b, &SolverOptions::default()).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 2.0).abs() < 1e-10);
        assert!((x[2] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_matrix() {
        let a = CsrMatrix::from_triplets(3, 2, Vec::new()).unwrap();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = solve_least_squares(&a, &b, &SolverOptions::default()).unwrap();
        assert_eq!(x, DVector::zeros(2));
    }

    #[test]
    fn test_mismatched_rhs() {
        let a = CsrMatrix::from_triplets(3, 2, Vec::new()).unwrap();
        let b = DVector::zeros(2);
        assert!(matches!(
            solve_least_squares(&a, &b, &SolverOptions::default()),
            Err(MeshError::InvalidState(_))
        ));
    }

    #[test]
    fn test_small_system_falls_back_to_dense() {
        let a = csr(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let options = SolverOptions::default().with_max_iterations(1);
        let x = solve_least_squares(&a, &b, &options).unwrap();
        assert!((a.mul_vec(&x) - b).norm() < 1e-10);
    }
}
