//! Compressed sparse column (CSC) matrix with triplet staging.
//!
//! Entries are staged with [`CscMatrix::add_value`] and become visible after
//! [`CscMatrix::finalize`], which sorts the staged triplets by `(col, row)`
//! and rebuilds `values`, `row_indices` and `col_ptr`:
//!
//! - `col_ptr[0] = 0`, `col_ptr[ncols] = values.len()`, non-decreasing;
//! - rows inside `col_ptr[j]..col_ptr[j + 1]` are strictly increasing;
//! - no stored value equals zero.
//!
//! A later insertion at an existing `(i, j)` replaces the earlier value.
//! Every arithmetic result is returned finalized.

use crate::core::traits::{Diagonal, MatShape, MatVec, MatrixSet, Scalar};
use crate::error::KError;
use crate::matrix::{DenseMatrix, Vector};
use std::ops::{Mul, MulAssign};
use tracing::trace;

#[derive(Clone, Copy, Debug)]
struct Triplet<T> {
    row: usize,
    col: usize,
    value: T,
}

#[derive(Clone, Debug)]
pub struct CscMatrix<T> {
    nrows: usize,
    ncols: usize,
    values: Vec<T>,
    row_indices: Vec<usize>,
    col_ptr: Vec<usize>,
    staged: Vec<Triplet<T>>,
}

impl<T: Scalar> CscMatrix<T> {
    /// Empty `nrows × ncols` matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            values: Vec::new(),
            row_indices: Vec::new(),
            col_ptr: vec![0; ncols + 1],
            staged: Vec::new(),
        }
    }

    /// Build and finalize from `(row, col, value)` triplets.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, T)]) -> Result<Self, KError> {
        let mut m = Self::new(nrows, ncols);
        for &(i, j, v) in triplets {
            m.add_value(i, j, v)?;
        }
        m.finalize();
        Ok(m)
    }

    pub fn from_dense(a: &DenseMatrix<T>) -> Self {
        let mut m = Self::new(a.nrows(), a.ncols());
        for j in 0..a.ncols() {
            for i in 0..a.nrows() {
                let v = a[(i, j)];
                if v != T::zero() {
                    m.values.push(v);
                    m.row_indices.push(i);
                }
            }
            m.col_ptr[j + 1] = m.values.len();
        }
        m
    }

    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut d = DenseMatrix::zeros(self.nrows, self.ncols);
        for j in 0..self.ncols {
            for (i, v) in self.column(j) {
                d[(i, j)] = v;
            }
        }
        d
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored non-zeros (staged entries excluded).
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    fn check_index(&self, i: usize, j: usize) -> Result<(), KError> {
        if i >= self.nrows || j >= self.ncols {
            return Err(KError::OutOfRange {
                row: i,
                col: j,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        Ok(())
    }

    fn ensure_finalized(&self) -> Result<(), KError> {
        if self.is_finalized() { Ok(()) } else { Err(KError::Unfinalized) }
    }

    /// Stage `A(i, j) = value`.
    ///
    /// A staged zero still overrides earlier writes to `(i, j)`; it is
    /// dropped rather than stored when the matrix is finalized.
    pub fn add_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.check_index(i, j)?;
        self.staged.push(Triplet { row: i, col: j, value });
        Ok(())
    }

    /// Merge staged triplets into the compressed arrays.
    pub fn finalize(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        let mut entries: Vec<Triplet<T>> = Vec::with_capacity(self.values.len() + self.staged.len());
        for col in 0..self.ncols {
            for k in self.col_ptr[col]..self.col_ptr[col + 1] {
                entries.push(Triplet { row: self.row_indices[k], col, value: self.values[k] });
            }
        }
        entries.append(&mut self.staged);
        // Stable: among equal (col, row) keys insertion order is kept, so the last one wins.
        entries.sort_by_key(|t| (t.col, t.row));

        self.values.clear();
        self.row_indices.clear();
        self.col_ptr.iter_mut().for_each(|p| *p = 0);
        for (k, t) in entries.iter().enumerate() {
            if let Some(next) = entries.get(k + 1) {
                if next.col == t.col && next.row == t.row {
                    continue;
                }
            }
            if t.value == T::zero() {
                continue;
            }
            self.values.push(t.value);
            self.row_indices.push(t.row);
            self.col_ptr[t.col + 1] += 1;
        }
        for j in 0..self.ncols {
            self.col_ptr[j + 1] += self.col_ptr[j];
        }
        trace!(nnz = self.values.len(), "finalized CSC matrix");
    }

    /// Position of row `i` inside column `j`, if stored.
    fn locate(&self, i: usize, j: usize) -> Option<usize> {
        let (start, end) = (self.col_ptr[j], self.col_ptr[j + 1]);
        self.row_indices[start..end].binary_search(&i).ok().map(|off| start + off)
    }

    /// `A(i, j)`, zero when not stored.
    pub fn get(&self, i: usize, j: usize) -> Result<T, KError> {
        self.check_index(i, j)?;
        self.ensure_finalized()?;
        Ok(self.locate(i, j).map_or(T::zero(), |k| self.values[k]))
    }

    /// Drop the stored entry at `(i, j)`; returns whether one existed.
    pub fn remove(&mut self, i: usize, j: usize) -> Result<bool, KError> {
        self.check_index(i, j)?;
        self.ensure_finalized()?;
        match self.locate(i, j) {
            Some(k) => {
                self.values.remove(k);
                self.row_indices.remove(k);
                for p in &mut self.col_ptr[j + 1..] {
                    *p -= 1;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stored `(row, value)` pairs of column `j`, rows ascending.
    pub fn column(&self, j: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.col_ptr[j]..self.col_ptr[j + 1];
        self.row_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Column `j` as a dense vector.
    pub fn get_column(&self, j: usize) -> Result<Vector<T>, KError> {
        if j >= self.ncols {
            return Err(KError::OutOfRange { row: 0, col: j, nrows: self.nrows, ncols: self.ncols });
        }
        self.ensure_finalized()?;
        let mut v = Vector::zeros(self.nrows);
        for (i, x) in self.column(j) {
            v[i] = x;
        }
        Ok(v)
    }

    fn merge_with(&self, other: &Self, op: impl Fn(T, T) -> T) -> Result<Self, KError> {
        if self.nrows != other.nrows || self.ncols != other.ncols {
            return Err(KError::InvalidArgument(format!(
                "shape mismatch: {}x{} vs {}x{}",
                self.nrows, self.ncols, other.nrows, other.ncols
            )));
        }
        self.ensure_finalized()?;
        other.ensure_finalized()?;
        let mut out = Self::new(self.nrows, self.ncols);
        for j in 0..self.ncols {
            let (mut a, a_end) = (self.col_ptr[j], self.col_ptr[j + 1]);
            let (mut b, b_end) = (other.col_ptr[j], other.col_ptr[j + 1]);
            while a < a_end || b < b_end {
                let ra = if a < a_end { self.row_indices[a] } else { usize::MAX };
                let rb = if b < b_end { other.row_indices[b] } else { usize::MAX };
                let (row, v) = if ra < rb {
                    a += 1;
                    (ra, op(self.values[a - 1], T::zero()))
                } else if rb < ra {
                    b += 1;
                    (rb, op(T::zero(), other.values[b - 1]))
                } else {
                    a += 1;
                    b += 1;
                    (ra, op(self.values[a - 1], other.values[b - 1]))
                };
                if v != T::zero() {
                    out.row_indices.push(row);
                    out.values.push(v);
                }
            }
            out.col_ptr[j + 1] = out.values.len();
        }
        Ok(out)
    }

    /// `A + B`.
    pub fn add(&self, other: &Self) -> Result<Self, KError> {
        self.merge_with(other, |a, b| a + b)
    }

    /// `A - B`.
    pub fn sub(&self, other: &Self) -> Result<Self, KError> {
        self.merge_with(other, |a, b| a - b)
    }

    /// `alpha · A`; entries that become zero are dropped.
    pub fn scaled(&self, alpha: T) -> Self {
        let mut out = self.clone();
        out *= alpha;
        out
    }

    /// Checked `A · v`.
    pub fn mul_vec(&self, v: &Vector<T>) -> Result<Vector<T>, KError> {
        if v.len() != self.ncols {
            return Err(KError::InvalidArgument(format!(
                "vector of length {} does not match {} columns",
                v.len(),
                self.ncols
            )));
        }
        self.ensure_finalized()?;
        let mut y = Vector::zeros(self.nrows);
        self.matvec(v, &mut y);
        Ok(y)
    }

    /// `A · B`: column `j` of the result accumulates `A[:, k] · B(k, j)`
    /// over the non-zeros of `B[:, j]`.
    pub fn matmul(&self, other: &Self) -> Result<Self, KError> {
        if self.ncols != other.nrows {
            return Err(KError::InvalidArgument(format!(
                "cannot multiply {}x{} by {}x{}",
                self.nrows, self.ncols, other.nrows, other.ncols
            )));
        }
        self.ensure_finalized()?;
        other.ensure_finalized()?;
        let mut out = Self::new(self.nrows, other.ncols);
        let mut acc = vec![T::zero(); self.nrows];
        let mut mark = vec![usize::MAX; self.nrows];
        let mut touched: Vec<usize> = Vec::new();
        for j in 0..other.ncols {
            touched.clear();
            for (k, b_kj) in other.column(j) {
                for p in self.col_ptr[k]..self.col_ptr[k + 1] {
                    let r = self.row_indices[p];
                    if mark[r] != j {
                        mark[r] = j;
                        acc[r] = T::zero();
                        touched.push(r);
                    }
                    acc[r] = acc[r] + self.values[p] * b_kj;
                }
            }
            touched.sort_unstable();
            for &r in &touched {
                if acc[r] != T::zero() {
                    out.row_indices.push(r);
                    out.values.push(acc[r]);
                }
            }
            out.col_ptr[j + 1] = out.values.len();
        }
        Ok(out)
    }

    /// `Aᵀ` by counting sort over row indices.
    pub fn transpose(&self) -> Result<Self, KError> {
        self.ensure_finalized()?;
        let nnz = self.values.len();
        let mut col_ptr = vec![0usize; self.nrows + 1];
        for &r in &self.row_indices {
            col_ptr[r + 1] += 1;
        }
        for i in 0..self.nrows {
            col_ptr[i + 1] += col_ptr[i];
        }
        let mut next = col_ptr.clone();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![T::zero(); nnz];
        for col in 0..self.ncols {
            for k in self.col_ptr[col]..self.col_ptr[col + 1] {
                let dest = next[self.row_indices[k]];
                row_indices[dest] = col;
                values[dest] = self.values[k];
                next[self.row_indices[k]] += 1;
            }
        }
        Ok(Self {
            nrows: self.ncols,
            ncols: self.nrows,
            values,
            row_indices,
            col_ptr,
            staged: Vec::new(),
        })
    }

    /// Structural invariants of the compressed arrays.
    #[cfg(test)]
    pub(crate) fn is_well_formed(&self) -> bool {
        if self.col_ptr.len() != self.ncols + 1
            || self.col_ptr[0] != 0
            || self.col_ptr[self.ncols] != self.values.len()
            || self.row_indices.len() != self.values.len()
        {
            return false;
        }
        (0..self.ncols).all(|j| {
            let (s, e) = (self.col_ptr[j], self.col_ptr[j + 1]);
            s <= e
                && self.row_indices[s..e].windows(2).all(|w| w[0] < w[1])
                && self.row_indices[s..e].iter().all(|&r| r < self.nrows)
                && self.values[s..e].iter().all(|&v| v != T::zero())
        })
    }
}

impl<T: Scalar> MulAssign<T> for CscMatrix<T> {
    fn mul_assign(&mut self, alpha: T) {
        for t in &mut self.staged {
            t.value = t.value * alpha;
        }
        let mut kept = 0;
        for col in 0..self.ncols {
            let (start, end) = (self.col_ptr[col], self.col_ptr[col + 1]);
            for k in start..end {
                let v = self.values[k] * alpha;
                if v != T::zero() {
                    self.values[kept] = v;
                    self.row_indices[kept] = self.row_indices[k];
                    kept += 1;
                }
            }
            self.col_ptr[col + 1] = kept;
        }
        self.values.truncate(kept);
        self.row_indices.truncate(kept);
    }
}

impl<T: Scalar> Mul<T> for &CscMatrix<T> {
    type Output = CscMatrix<T>;
    fn mul(self, alpha: T) -> CscMatrix<T> {
        self.scaled(alpha)
    }
}

impl<T: Scalar> MatShape for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Scalar> MatVec<Vector<T>> for CscMatrix<T> {
    /// Walks the compressed columns: `y[row_indices[k]] += values[k] * x[col]`.
    fn matvec(&self, x: &Vector<T>, y: &mut Vector<T>) {
        assert!(self.is_finalized(), "CSC matvec on a matrix with staged entries");
        assert_eq!(self.nrows, y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols, x.len(), "Input vector x has incorrect length");
        y.fill(T::zero());
        for col in 0..self.ncols {
            let xc = x[col];
            if xc == T::zero() {
                continue;
            }
            for k in self.col_ptr[col]..self.col_ptr[col + 1] {
                let r = self.row_indices[k];
                y[r] = y[r] + self.values[k] * xc;
            }
        }
    }
}

impl<T: Scalar> Diagonal<T> for CscMatrix<T> {
    fn diagonal(&self) -> Vec<T> {
        let n = self.nrows.min(self.ncols);
        (0..n)
            .map(|i| self.locate(i, i).map_or(T::zero(), |k| self.values[k]))
            .collect()
    }
}

impl<T: Scalar> MatrixSet<T> for CscMatrix<T> {
    fn with_shape(nrows: usize, ncols: usize) -> Self {
        Self::new(nrows, ncols)
    }

    /// Stage and finalize; a zero value erases the stored entry.
    fn set_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.add_value(i, j, value)?;
        self.finalize();
        Ok(())
    }

    fn stage_value(&mut self, i: usize, j: usize, value: T) -> Result<(), KError> {
        self.add_value(i, j, value)
    }

    fn commit(&mut self) {
        self.finalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CscMatrix<f64> {
        // [[2, 0, 0], [0, 3, 0], [1, 0, 4]]
        CscMatrix::from_triplets(3, 3, &[(2, 2, 4.0), (0, 0, 2.0), (2, 0, 1.0), (1, 1, 3.0)]).unwrap()
    }

    #[test]
    fn finalize_sorts_by_column_then_row() {
        let a = sample();
        assert!(a.is_well_formed());
        assert_eq!(a.col_ptr(), &[0, 2, 3, 4]);
        assert_eq!(a.row_indices(), &[0, 2, 1, 2]);
        assert_eq!(a.values(), &[2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn later_insert_overwrites_and_zero_is_not_stored() {
        let mut a = CscMatrix::<f64>::new(2, 2);
        a.add_value(0, 1, 5.0).unwrap();
        a.add_value(0, 1, 7.0).unwrap();
        a.add_value(1, 0, 0.0).unwrap();
        a.add_value(1, 1, 3.0).unwrap();
        a.add_value(1, 1, 0.0).unwrap();
        a.finalize();
        assert_eq!(a.get(0, 1).unwrap(), 7.0);
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
        assert_eq!(a.nnz(), 1);

        a.add_value(0, 1, -2.0).unwrap();
        assert!(matches!(a.get(0, 1), Err(KError::Unfinalized)));
        a.finalize();
        assert_eq!(a.get(0, 1).unwrap(), -2.0);
        assert!(a.is_well_formed());
    }

    #[test]
    fn out_of_range_insert_is_rejected() {
        let mut a = CscMatrix::<f64>::new(2, 3);
        assert!(matches!(a.add_value(2, 0, 1.0), Err(KError::OutOfRange { row: 2, .. })));
        assert!(a.add_value(0, 3, 1.0).is_err());
        assert!(a.get(5, 5).is_err());
    }

    #[test]
    fn matvec_walks_columns() {
        let a = sample();
        let y = a.mul_vec(&Vector::from_vec(vec![1.0, 1.0, 1.0])).unwrap();
        assert_eq!(y.as_slice(), &[2.0, 3.0, 5.0]);
        assert!(a.mul_vec(&Vector::zeros(2)).is_err());
    }

    #[test]
    fn add_and_sub_drop_cancelled_entries() {
        let a = sample();
        let diff = a.sub(&a).unwrap();
        assert_eq!(diff.nnz(), 0);
        assert!(diff.is_well_formed());

        let b = CscMatrix::from_triplets(3, 3, &[(0, 0, -2.0), (0, 2, 1.0)]).unwrap();
        let sum = a.add(&b).unwrap();
        assert!(sum.is_well_formed());
        assert_eq!(sum.get(0, 0).unwrap(), 0.0);
        assert_eq!(sum.get(0, 2).unwrap(), 1.0);
        assert_eq!(sum.get(2, 0).unwrap(), 1.0);
        assert_eq!(sum.nnz(), 4);

        let wrong = CscMatrix::<f64>::new(2, 3);
        assert!(matches!(a.add(&wrong), Err(KError::InvalidArgument(_))));
    }

    #[test]
    fn matmul_matches_dense_product() {
        let a = sample();
        let b = CscMatrix::from_triplets(3, 2, &[(0, 0, 1.0), (2, 0, -1.0), (1, 1, 2.0), (2, 1, 0.5)]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert!(c.is_well_formed());
        let expected = a.to_dense().matmul(&b.to_dense()).unwrap();
        assert_eq!(c.to_dense().max_abs_diff(&expected), 0.0);
        assert!(b.matmul(&a).is_err());
    }

    #[test]
    fn transpose_is_an_involution() {
        let a = CscMatrix::from_triplets(2, 3, &[(0, 2, 1.5), (1, 0, -3.0), (1, 2, 2.0)]).unwrap();
        let t = a.transpose().unwrap();
        assert_eq!((t.nrows(), t.ncols()), (3, 2));
        assert!(t.is_well_formed());
        assert_eq!(t.get(2, 0).unwrap(), 1.5);
        assert_eq!(t.get(0, 1).unwrap(), -3.0);
        let tt = t.transpose().unwrap();
        assert_eq!(tt.to_dense().max_abs_diff(&a.to_dense()), 0.0);
    }

    #[test]
    fn scaling_by_zero_empties_the_matrix() {
        let a = sample();
        let doubled = &a * 2.0;
        assert_eq!(doubled.get(2, 2).unwrap(), 8.0);
        let zero = a.scaled(0.0);
        assert_eq!(zero.nnz(), 0);
        assert!(zero.is_well_formed());
    }

    #[test]
    fn set_value_with_zero_erases() {
        let mut a = sample();
        a.set_value(1, 1, 0.0).unwrap();
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
        assert_eq!(a.nnz(), 3);
        assert!(a.is_well_formed());
        a.set_value(0, 2, 9.0).unwrap();
        assert_eq!(a.get(0, 2).unwrap(), 9.0);
        assert_eq!(a.diagonal(), vec![2.0, 0.0, 4.0]);
    }

    #[test]
    fn unfinalized_matrix_refuses_arithmetic() {
        let mut a = sample();
        a.add_value(0, 1, 1.0).unwrap();
        assert!(matches!(a.transpose(), Err(KError::Unfinalized)));
        assert!(matches!(a.mul_vec(&Vector::zeros(3)), Err(KError::Unfinalized)));
    }
}
