//! Forward and backward triangular substitution.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::matrix::{DenseMatrix, Vector};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// `L·x = b`, `L` lower triangular.
    Forward,
    /// `U·x = b`, `U` upper triangular.
    Backward,
}

/// Solve a triangular system. Only the triangle selected by `direction` is
/// read; an exactly zero diagonal entry fails with [`KError::ZeroPivot`].
pub fn substitution<T: Scalar>(
    b: &Vector<T>,
    t: &DenseMatrix<T>,
    direction: Direction,
) -> Result<Vector<T>, KError> {
    let n = t.nrows();
    if t.ncols() != n || b.len() != n {
        return Err(KError::InvalidArgument(format!(
            "triangular solve needs a square matrix matching b: {}x{} vs {}",
            t.nrows(),
            t.ncols(),
            b.len()
        )));
    }
    let mut x = Vector::zeros(n);
    let solve_row = |i: usize, range: std::ops::Range<usize>, x: &mut Vector<T>| {
        let mut sum = b[i];
        for j in range {
            sum = sum - t[(i, j)] * x[j];
        }
        let d = t[(i, i)];
        if d == T::zero() {
            return Err(KError::ZeroPivot(i));
        }
        x[i] = sum / d;
        Ok(())
    };
    match direction {
        Direction::Forward => {
            for i in 0..n {
                solve_row(i, 0..i, &mut x)?;
            }
        }
        Direction::Backward => {
            for i in (0..n).rev() {
                solve_row(i, (i + 1)..n, &mut x)?;
            }
        }
    }
    Ok(x)
}
