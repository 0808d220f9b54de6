//! Core linear-algebra traits for krylov-kit.
//!
//! Solvers are written against this capability set (shape, matvec, dot,
//! norm) rather than against concrete matrix types.

use crate::error::KError;
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Real scalar type usable by every container and algorithm.
pub trait Scalar: Float + FromPrimitive + Debug + Display + Default + Send + Sync + 'static {
    /// Convert an `f64` literal into `Self`.
    #[inline]
    fn lit(x: f64) -> Self {
        <Self as FromPrimitive>::from_f64(x).unwrap_or_else(Self::nan)
    }
}

impl<T> Scalar for T where T: Float + FromPrimitive + Debug + Display + Default + Send + Sync + 'static {}

/// Logical matrix shape.
pub trait MatShape {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V>: MatShape {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Access to the main diagonal.
pub trait Diagonal<T> {
    fn diagonal(&self) -> Vec<T>;
}

/// Element writes shared by dense and sparse targets (Matrix Market loading,
/// in-place factorizations).
pub trait MatrixSet<T>: MatShape + Sized {
    /// Allocate an all-zero matrix of the given shape.
    fn with_shape(nrows: usize, ncols: usize) -> Self;

    /// Write `A(i, j) = value`; the matrix is immediately usable afterwards.
    fn set_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError>;

    /// Write without making the matrix usable yet; pair with [`MatrixSet::commit`].
    fn stage_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.set_value(i, j, value)
    }

    /// Make every staged write visible.
    fn commit(&mut self) {}
}
