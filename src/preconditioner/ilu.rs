//! ILU(0) factorization with zero fill (Saad §10.3).
//!
//! The factors keep the sparsity pattern of `A`: updates that would create
//! an entry outside it are dropped. `L` is unit lower triangular.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::factor::{substitution, Direction};
use crate::matrix::{CscMatrix, DenseMatrix, Vector};
use crate::preconditioner::Preconditioner;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Ilu0<T> {
    l: DenseMatrix<T>,
    u: DenseMatrix<T>,
}

impl<T: Scalar> Ilu0<T> {
    /// Empty factors; call `setup` before applying.
    pub fn new() -> Self {
        Self { l: DenseMatrix::zeros(0, 0), u: DenseMatrix::zeros(0, 0) }
    }

    /// Factor a finalized square matrix.
    ///
    /// A zero pivot, including a diagonal entry missing from the pattern,
    /// fails with [`KError::ZeroPivot`].
    pub fn from_matrix(a: &CscMatrix<T>) -> Result<Self, KError> {
        if !a.is_finalized() {
            return Err(KError::Unfinalized);
        }
        let n = a.nrows();
        if a.ncols() != n {
            return Err(KError::InvalidArgument(format!("ILU(0) needs a square matrix, got {}x{}", n, a.ncols())));
        }

        // Rows of A are the columns of Aᵀ, column indices ascending.
        let at = a.transpose()?;
        let pattern: Vec<Vec<usize>> = (0..n).map(|i| at.column(i).map(|(j, _)| j).collect()).collect();
        let mut w = a.to_dense();
        let mut in_row = vec![false; n];

        for (i, row) in pattern.iter().enumerate() {
            row.iter().for_each(|&j| in_row[j] = true);
            for &k in row.iter().take_while(|&&k| k < i) {
                let pivot = w[(k, k)];
                if pivot == T::zero() {
                    return Err(KError::ZeroPivot(k));
                }
                let lik = w[(i, k)] / pivot;
                w[(i, k)] = lik;
                for &j in &pattern[k] {
                    if j > k && in_row[j] {
                        w[(i, j)] = w[(i, j)] - lik * w[(k, j)];
                    }
                }
            }
            row.iter().for_each(|&j| in_row[j] = false);
            if w[(i, i)] == T::zero() {
                return Err(KError::ZeroPivot(i));
            }
        }

        let l = DenseMatrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Greater => w[(i, j)],
            std::cmp::Ordering::Equal => T::one(),
            std::cmp::Ordering::Less => T::zero(),
        });
        let u = DenseMatrix::from_fn(n, n, |i, j| if i <= j { w[(i, j)] } else { T::zero() });
        debug!(n, nnz = a.nnz(), "ILU(0) factorization complete");
        Ok(Self { l, u })
    }

    pub fn l(&self) -> &DenseMatrix<T> {
        &self.l
    }

    pub fn u(&self) -> &DenseMatrix<T> {
        &self.u
    }

    /// `z = U⁻¹ L⁻¹ r`.
    fn solve(&self, r: &Vector<T>, z: &mut Vector<T>) -> Result<(), KError> {
        if r.len() != self.l.nrows() {
            return Err(KError::InvalidArgument(format!(
                "ILU(0) set up for {} unknowns, got {}",
                self.l.nrows(),
                r.len()
            )));
        }
        let y = substitution(r, &self.l, Direction::Forward)?;
        *z = substitution(&y, &self.u, Direction::Backward)?;
        Ok(())
    }
}

impl<T: Scalar> Default for Ilu0<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Preconditioner<CscMatrix<T>, Vector<T>> for Ilu0<T> {
    fn setup(&mut self, a: &CscMatrix<T>) -> Result<(), KError> {
        *self = Self::from_matrix(a)?;
        Ok(())
    }

    fn apply(&self, r: &Vector<T>, z: &mut Vector<T>) -> Result<(), KError> {
        self.solve(r, z)
    }
}

impl<T: Scalar> Preconditioner<DenseMatrix<T>, Vector<T>> for Ilu0<T> {
    fn setup(&mut self, a: &DenseMatrix<T>) -> Result<(), KError> {
        *self = Self::from_matrix(&CscMatrix::from_dense(a))?;
        Ok(())
    }

    fn apply(&self, r: &Vector<T>, z: &mut Vector<T>) -> Result<(), KError> {
        self.solve(r, z)
    }
}
