//! Wrappers for faer dense matrix types and vector operations.
//!
//! This module implements the core capability traits for `faer::Mat` and provides the
//! `InnerProduct` implementation on `()` that the iterative solvers use for dot products
//! and norms. Passing a `faer::Mat<T>` straight to any solver is therefore supported.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{Diagonal, InnerProduct, MatShape, MatVec, Scalar};
use crate::matrix::Vector;
use faer::Mat;

impl<T> MatShape for Mat<T> {
    fn nrows(&self) -> usize {
        Mat::nrows(self)
    }
    fn ncols(&self) -> usize {
        Mat::ncols(self)
    }
}

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Scalar> MatVec<Vector<T>> for Mat<T> {
    fn matvec(&self, x: &Vector<T>, y: &mut Vector<T>) {
        assert_eq!(Mat::nrows(self), y.len(), "Output vector y has incorrect length");
        assert_eq!(Mat::ncols(self), x.len(), "Input vector x has incorrect length");
        for i in 0..Mat::nrows(self) {
            let mut acc = T::zero();
            for j in 0..Mat::ncols(self) {
                acc = acc + self[(i, j)] * x[j];
            }
            y[i] = acc;
        }
    }
}

impl<T: Scalar> Diagonal<T> for Mat<T> {
    fn diagonal(&self) -> Vec<T> {
        let n = Mat::nrows(self).min(Mat::ncols(self));
        (0..n).map(|i| self[(i, i)]).collect()
    }
}

/// Implements inner product and norm for vectors.
impl<T: Scalar> InnerProduct<Vector<T>> for () {
    type Scalar = T;
    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vector<T>, y: &Vector<T>) -> T {
        x.dot(y)
    }
    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vector<T>) -> T {
        x.l2_norm()
    }
}
