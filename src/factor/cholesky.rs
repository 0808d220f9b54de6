//! Cholesky factorization `A = L·Lᵀ`.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::matrix::DenseMatrix;
use tracing::{debug, warn};

/// Column-sweep Cholesky. Only the lower triangle of `a` is read.
///
/// Fails with [`KError::FactorError`] on the first non-positive pivot
/// `a_jj − Σ L_jk²` or when `L_jj` falls below machine epsilon.
pub fn cholesky<T: Scalar>(a: &DenseMatrix<T>) -> Result<DenseMatrix<T>, KError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(KError::InvalidArgument(format!(
            "Cholesky needs a square matrix, got {}x{}",
            n,
            a.ncols()
        )));
    }
    let mut l = DenseMatrix::zeros(n, n);
    for j in 0..n {
        let mut pivot = a[(j, j)];
        for k in 0..j {
            pivot = pivot - l[(j, k)] * l[(j, k)];
        }
        if pivot <= T::zero() || pivot.is_nan() {
            warn!(column = j, "Cholesky pivot is not positive");
            return Err(KError::FactorError(format!(
                "matrix is not positive definite (pivot {} at column {})",
                pivot, j
            )));
        }
        let ljj = pivot.sqrt();
        if ljj < T::epsilon() {
            return Err(KError::FactorError(format!("diagonal of L vanishes at column {}", j)));
        }
        l[(j, j)] = ljj;
        for i in (j + 1)..n {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum = sum - l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = sum / ljj;
        }
    }
    debug!(n, "Cholesky factorization complete");
    Ok(l)
}
