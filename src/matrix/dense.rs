//! Dense‐matrix API on top of Faer.
//!
//! `DenseMatrix<T>` owns a `faer::Mat<T>` and adds the operations the
//! factorizations and solvers rely on: checked element access, row swaps,
//! column extraction, transpose and the matrix products. Shape mismatches in
//! the checked products surface as `KError::InvalidArgument`.

use crate::core::traits::{Diagonal, MatShape, MatVec, MatrixSet, Scalar};
use crate::error::KError;
use crate::matrix::Vector;
use faer::Mat;
use std::ops::{Index, IndexMut, Mul};

#[derive(Clone, Debug)]
pub struct DenseMatrix<T> {
    inner: Mat<T>,
}

impl<T: Scalar> DenseMatrix<T> {
    /// All-zero `nrows × ncols` matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self { inner: Mat::from_fn(nrows, ncols, |_, _| T::zero()) }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        Self { inner: Mat::from_fn(nrows, ncols, |i, j| f(i, j)) }
    }

    /// Build from row slices; every row must have the same length.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, KError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(KError::InvalidArgument(format!(
                "row {bad} has length {}, expected {ncols}",
                rows[bad].len()
            )));
        }
        Ok(Self::from_fn(nrows, ncols, |i, j| rows[i][j]))
    }

    /// Build from a list of column vectors of equal length.
    pub fn from_columns(columns: &[Vector<T>]) -> Result<Self, KError> {
        let ncols = columns.len();
        let nrows = columns.first().map_or(0, Vector::len);
        if let Some(bad) = columns.iter().position(|c| c.len() != nrows) {
            return Err(KError::InvalidArgument(format!(
                "column {bad} has length {}, expected {nrows}",
                columns[bad].len()
            )));
        }
        Ok(Self::from_fn(nrows, ncols, |i, j| columns[j][i]))
    }

    /// Outer product `u vᵀ`.
    pub fn outer(u: &Vector<T>, v: &Vector<T>) -> Self {
        Self::from_fn(u.len(), v.len(), |i, j| u[i] * v[j])
    }

    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    fn check_index(&self, i: usize, j: usize) -> Result<(), KError> {
        if i >= self.nrows() || j >= self.ncols() {
            return Err(KError::OutOfRange {
                row: i,
                col: j,
                nrows: self.nrows(),
                ncols: self.ncols(),
            });
        }
        Ok(())
    }

    /// Checked read of `A(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> Result<T, KError> {
        self.check_index(i, j)?;
        Ok(self.inner[(i, j)])
    }

    /// Checked write of `A(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.check_index(i, j)?;
        self.inner[(i, j)] = value;
        Ok(())
    }

    pub fn column(&self, j: usize) -> Result<Vector<T>, KError> {
        if j >= self.ncols() {
            return Err(KError::OutOfRange { row: 0, col: j, nrows: self.nrows(), ncols: self.ncols() });
        }
        Ok(Vector::from_fn(self.nrows(), |i| self.inner[(i, j)]))
    }

    pub fn row(&self, i: usize) -> Result<Vector<T>, KError> {
        if i >= self.nrows() {
            return Err(KError::OutOfRange { row: i, col: 0, nrows: self.nrows(), ncols: self.ncols() });
        }
        Ok(Vector::from_fn(self.ncols(), |j| self.inner[(i, j)]))
    }

    /// Swap two physical rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<(), KError> {
        if a >= self.nrows() || b >= self.nrows() {
            return Err(KError::OutOfRange {
                row: a.max(b),
                col: 0,
                nrows: self.nrows(),
                ncols: self.ncols(),
            });
        }
        if a == b {
            return Ok(());
        }
        for j in 0..self.ncols() {
            let tmp = self.inner[(a, j)];
            self.inner[(a, j)] = self.inner[(b, j)];
            self.inner[(b, j)] = tmp;
        }
        Ok(())
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.ncols(), self.nrows(), |i, j| self.inner[(j, i)])
    }

    /// Reset every entry to zero.
    pub fn zero(&mut self) {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                self.inner[(i, j)] = T::zero();
            }
        }
    }

    pub fn scale(&mut self, alpha: T) {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                self.inner[(i, j)] = self.inner[(i, j)] * alpha;
            }
        }
    }

    fn zip_with(&self, other: &Self, op: impl Fn(T, T) -> T) -> Result<Self, KError> {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return Err(KError::InvalidArgument(format!(
                "shape mismatch: {}x{} vs {}x{}",
                self.nrows(),
                self.ncols(),
                other.nrows(),
                other.ncols()
            )));
        }
        Ok(Self::from_fn(self.nrows(), self.ncols(), |i, j| {
            op(self.inner[(i, j)], other.inner[(i, j)])
        }))
    }

    /// Elementwise `A + B`.
    pub fn try_add(&self, other: &Self) -> Result<Self, KError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise `A - B`.
    pub fn try_sub(&self, other: &Self) -> Result<Self, KError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Matrix product `A · B`.
    pub fn matmul(&self, other: &Self) -> Result<Self, KError> {
        if self.ncols() != other.nrows() {
            return Err(KError::InvalidArgument(format!(
                "cannot multiply {}x{} by {}x{}",
                self.nrows(),
                self.ncols(),
                other.nrows(),
                other.ncols()
            )));
        }
        let mut out = Self::zeros(self.nrows(), other.ncols());
        for j in 0..other.ncols() {
            for k in 0..self.ncols() {
                let b_kj = other.inner[(k, j)];
                if b_kj == T::zero() {
                    continue;
                }
                for i in 0..self.nrows() {
                    out.inner[(i, j)] = out.inner[(i, j)] + self.inner[(i, k)] * b_kj;
                }
            }
        }
        Ok(out)
    }

    /// Checked `A · v`.
    pub fn mul_vec(&self, v: &Vector<T>) -> Result<Vector<T>, KError> {
        if v.len() != self.ncols() {
            return Err(KError::InvalidArgument(format!(
                "vector of length {} does not match {} columns",
                v.len(),
                self.ncols()
            )));
        }
        let mut y = Vector::zeros(self.nrows());
        self.matvec(v, &mut y);
        Ok(y)
    }

    pub fn frobenius_norm(&self) -> T {
        let mut acc = T::zero();
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                acc = acc + self.inner[(i, j)] * self.inner[(i, j)];
            }
        }
        acc.sqrt()
    }

    /// Largest absolute elementwise difference; infinite on shape mismatch.
    pub fn max_abs_diff(&self, other: &Self) -> T {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return T::infinity();
        }
        let mut worst = T::zero();
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                worst = worst.max((self.inner[(i, j)] - other.inner[(i, j)]).abs());
            }
        }
        worst
    }

    pub fn as_faer(&self) -> &Mat<T> {
        &self.inner
    }

    pub fn into_faer(self) -> Mat<T> {
        self.inner
    }
}

impl<T> From<Mat<T>> for DenseMatrix<T> {
    fn from(inner: Mat<T>) -> Self {
        Self { inner }
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.inner[idx]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        &mut self.inner[idx]
    }
}

impl<T: Scalar> Mul<T> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;
    fn mul(self, alpha: T) -> DenseMatrix<T> {
        let mut out = self.clone();
        out.scale(alpha);
        out
    }
}

impl<T: Scalar> MatShape for DenseMatrix<T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
}

impl<T: Scalar> MatVec<Vector<T>> for DenseMatrix<T> {
    fn matvec(&self, x: &Vector<T>, y: &mut Vector<T>) {
        assert_eq!(self.inner.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.inner.ncols(), x.len(), "Input vector x has incorrect length");
        y.fill(T::zero());
        for j in 0..self.inner.ncols() {
            let xj = x[j];
            if xj == T::zero() {
                continue;
            }
            for i in 0..self.inner.nrows() {
                y[i] = y[i] + self.inner[(i, j)] * xj;
            }
        }
    }
}

impl<T: Scalar> Diagonal<T> for DenseMatrix<T> {
    fn diagonal(&self) -> Vec<T> {
        let n = self.inner.nrows().min(self.inner.ncols());
        (0..n).map(|i| self.inner[(i, i)]).collect()
    }
}

impl<T: Scalar> MatrixSet<T> for DenseMatrix<T> {
    fn with_shape(nrows: usize, ncols: usize) -> Self {
        Self::zeros(nrows, ncols)
    }

    fn set_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.set(i, j, value)
    }
}
