//! LU factorization with partial pivoting.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::factor::substitution::{substitution, Direction};
use crate::matrix::{DenseMatrix, Vector};
use tracing::{debug, trace};

/// Pivots with magnitude below this are treated as singular.
const PIVOT_TOL: f64 = 1e-12;

/// In-place `P·A = L·U`.
///
/// On return `a` holds the unit-lower `L` strictly below the diagonal and
/// `U` on and above it; `p[i]` is the original row now stored in row `i`.
/// Ties in pivot magnitude keep the topmost candidate.
pub fn pivot_lu<T: Scalar>(a: &mut DenseMatrix<T>, p: &mut Vec<usize>) -> Result<(), KError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(KError::InvalidArgument(format!(
            "LU needs a square matrix, got {}x{}",
            n,
            a.ncols()
        )));
    }
    p.clear();
    p.extend(0..n);
    let tol = T::lit(PIVOT_TOL);
    for j in 0..n {
        let mut pivot_row = j;
        let mut pivot_abs = a[(j, j)].abs();
        for i in (j + 1)..n {
            if a[(i, j)].abs() > pivot_abs {
                pivot_row = i;
                pivot_abs = a[(i, j)].abs();
            }
        }
        if pivot_abs < tol || pivot_abs.is_nan() {
            return Err(KError::ZeroPivot(j));
        }
        if pivot_row != j {
            trace!(column = j, from = pivot_row, "LU row swap");
            a.swap_rows(j, pivot_row)?;
            p.swap(j, pivot_row);
        }
        let d = a[(j, j)];
        for i in (j + 1)..n {
            let l = a[(i, j)] / d;
            a[(i, j)] = l;
            for k in (j + 1)..n {
                a[(i, k)] = a[(i, k)] - l * a[(j, k)];
            }
        }
    }
    debug!(n, "pivoted LU complete");
    Ok(())
}

/// Unpacked LU factors, ready for repeated solves.
#[derive(Clone, Debug)]
pub struct LuFactors<T> {
    l: DenseMatrix<T>,
    u: DenseMatrix<T>,
    perm: Vec<usize>,
}

impl<T: Scalar> LuFactors<T> {
    /// Factor a copy of `a`.
    pub fn factor(a: &DenseMatrix<T>) -> Result<Self, KError> {
        let mut lu = a.clone();
        let mut perm = Vec::new();
        pivot_lu(&mut lu, &mut perm)?;
        Ok(Self::from_packed(&lu, perm))
    }

    /// Split the packed output of [`pivot_lu`].
    pub fn from_packed(lu: &DenseMatrix<T>, perm: Vec<usize>) -> Self {
        let n = lu.nrows();
        let l = DenseMatrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Greater => lu[(i, j)],
            std::cmp::Ordering::Equal => T::one(),
            std::cmp::Ordering::Less => T::zero(),
        });
        let u = DenseMatrix::from_fn(n, n, |i, j| if i <= j { lu[(i, j)] } else { T::zero() });
        Self { l, u, perm }
    }

    pub fn l(&self) -> &DenseMatrix<T> {
        &self.l
    }

    pub fn u(&self) -> &DenseMatrix<T> {
        &self.u
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Row permutation as a matrix: `(P·A)[i] = A[perm[i]]`.
    pub fn permutation_matrix(&self) -> DenseMatrix<T> {
        let n = self.perm.len();
        DenseMatrix::from_fn(n, n, |i, j| if self.perm[i] == j { T::one() } else { T::zero() })
    }

    /// Solve `A·x = b` through `L·y = P·b`, `U·x = y`.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>, KError> {
        if b.len() != self.perm.len() {
            return Err(KError::InvalidArgument(format!(
                "right-hand side has length {}, expected {}",
                b.len(),
                self.perm.len()
            )));
        }
        let pb = Vector::from_fn(b.len(), |i| b[self.perm[i]]);
        let y = substitution(&pb, &self.l, Direction::Forward)?;
        substitution(&y, &self.u, Direction::Backward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_starts_as_identity_and_tracks_swaps() {
        let mut a = DenseMatrix::<f64>::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut p = vec![7, 7, 7];
        pivot_lu(&mut a, &mut p).unwrap();
        assert_eq!(p, vec![1, 0]);
        assert_eq!(a[(0, 0)], 3.0);
        assert!((a[(1, 0)] - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn singular_matrix_reports_pivot_column() {
        let mut a = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        let mut p = Vec::new();
        assert!(matches!(pivot_lu(&mut a, &mut p), Err(KError::ZeroPivot(1))));
    }

    #[test]
    fn factors_solve_linear_system() {
        let a = DenseMatrix::from_rows(&[
            vec![0.0, 2.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![3.0, 0.0, 1.0],
        ])
        .unwrap();
        let lu = LuFactors::factor(&a).unwrap();
        let pa = lu.permutation_matrix().matmul(&a).unwrap();
        assert!(pa.max_abs_diff(&lu.l().matmul(lu.u()).unwrap()) < 1e-14);

        let x_true = Vector::from_vec(vec![1.0, -2.0, 0.5]);
        let b = a.mul_vec(&x_true).unwrap();
        let x = lu.solve(&b).unwrap();
        assert!((&x - &x_true).l2_norm() < 1e-12);
    }
}
