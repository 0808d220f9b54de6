//! Singular value decomposition by deflated power iteration.
//!
//! Right singular vectors are eigenvectors of `AᵀA`, left ones eigenvectors
//! of `AAᵀ`. Each eigenpair is found by power iteration from a basis seed,
//! orthogonalized against the pairs already found, and removed from the
//! operator by rank-one deflation. This is slow (`O(n⁴)`) and loses
//! accuracy when singular values cluster; use it for small matrices.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::factor::eigen::{power_iter, rayleigh_quotient};
use crate::factor::gram_schmidt::sub_projection;
use crate::matrix::{DenseMatrix, Vector};
use std::cmp::Ordering;
use tracing::{debug, trace};

const POWER_STEPS: usize = 300;

/// `A = U·S·Vᵀ` with `U` m×m, `S` m×n diagonal and `V` n×n.
#[derive(Clone, Debug)]
pub struct Svd<T> {
    pub u: DenseMatrix<T>,
    pub s: DenseMatrix<T>,
    pub v: DenseMatrix<T>,
}

impl<T: Scalar> Svd<T> {
    /// Diagonal of `S`, non-increasing.
    pub fn singular_values(&self) -> Vector<T> {
        let k = self.s.nrows().min(self.s.ncols());
        Vector::from_fn(k, |i| self.s[(i, i)])
    }

    /// `U·S·Vᵀ`.
    pub fn reconstruct(&self) -> Result<DenseMatrix<T>, KError> {
        self.u.matmul(&self.s)?.matmul(&self.v.transpose())
    }
}

fn orthogonalize<T: Scalar>(v: &mut Vector<T>, basis: &[Vector<T>]) {
    // Two passes keep the result orthogonal to working precision.
    for _ in 0..2 {
        for q in basis {
            *v = sub_projection(v, q);
        }
    }
}

/// Standard basis vector least represented in `basis`, orthogonalized.
fn complete_basis<T: Scalar>(basis: &[Vector<T>], n: usize) -> Vector<T> {
    let weight = |k: usize| basis.iter().fold(T::zero(), |acc, q| acc + q[k] * q[k]);
    let k = (0..n)
        .min_by(|&a, &b| weight(a).partial_cmp(&weight(b)).unwrap_or(Ordering::Equal))
        .unwrap_or(0);
    let mut v = Vector::unit(k, n);
    orthogonalize(&mut v, basis);
    v.normalize();
    v
}

/// Eigenpairs of the symmetric PSD matrix `m`, ordered by descending
/// eigenvalue.
fn deflated_eigenpairs<T: Scalar>(mut m: DenseMatrix<T>) -> Result<Vec<(T, Vector<T>)>, KError> {
    let n = m.nrows();
    let collapse = T::epsilon().sqrt();
    let mut vectors: Vec<Vector<T>> = Vec::with_capacity(n);
    let mut pairs: Vec<(T, Vector<T>)> = Vec::with_capacity(n);
    for i in 0..n {
        let mut v = Vector::unit(i, n);
        power_iter(&m, &mut v, POWER_STEPS)?;
        orthogonalize(&mut v, &vectors);
        if v.l2_norm() < collapse {
            trace!(index = i, "power iterate collapsed, completing basis");
            v = complete_basis(&vectors, n);
        } else {
            v.normalize();
        }
        let lambda = rayleigh_quotient(&m, &v)?;
        for r in 0..n {
            for c in 0..n {
                m[(r, c)] = m[(r, c)] - lambda * v[r] * v[c];
            }
        }
        vectors.push(v.clone());
        pairs.push((lambda, v));
    }
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    Ok(pairs)
}

/// Singular value decomposition of an `m×n` matrix.
///
/// The zero matrix yields identity `U` and `V`. Left vectors satisfy
/// `u[0] ≥ 0`; each right vector is then oriented so that `uᵢᵀ A vᵢ ≥ 0`.
/// Singular values below `100·ε` are reported as zero.
pub fn svd<T: Scalar>(a: &DenseMatrix<T>) -> Result<Svd<T>, KError> {
    let (m, n) = (a.nrows(), a.ncols());
    if m == 0 || n == 0 {
        return Err(KError::InvalidArgument("matrix dimensions must be positive".into()));
    }
    let mut s = DenseMatrix::zeros(m, n);
    let is_zero = (0..m).all(|i| (0..n).all(|j| a[(i, j)].abs() <= T::epsilon()));
    if is_zero {
        debug!(m, n, "SVD of a zero matrix");
        return Ok(Svd { u: DenseMatrix::identity(m), s, v: DenseMatrix::identity(n) });
    }

    let at = a.transpose();
    let right = deflated_eigenpairs(at.matmul(a)?)?;
    let left = deflated_eigenpairs(a.matmul(&at)?)?;

    let us: Vec<Vector<T>> = left
        .into_iter()
        .map(|(_, mut u)| {
            if u[0] < T::zero() {
                u.scale(-T::one());
            }
            u
        })
        .collect();
    let mut vs: Vec<Vector<T>> = right.iter().map(|(_, v)| v.clone()).collect();

    let k = m.min(n);
    let floor = T::lit(100.0) * T::epsilon();
    for i in 0..k {
        let av = a.mul_vec(&vs[i])?;
        if us[i].dot(&av) < T::zero() {
            vs[i].scale(-T::one());
        }
        let sigma = right[i].0.abs().sqrt();
        s[(i, i)] = if sigma < floor { T::zero() } else { sigma };
    }

    debug!(m, n, sigma_max = %s[(0, 0)], "SVD complete");
    Ok(Svd {
        u: DenseMatrix::from_columns(&us)?,
        s,
        v: DenseMatrix::from_columns(&vs)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_matrix_gives_identity_factors() {
        let a = DenseMatrix::<f64>::zeros(2, 3);
        let d = svd(&a).unwrap();
        assert!(d.u.max_abs_diff(&DenseMatrix::identity(2)) == 0.0);
        assert!(d.v.max_abs_diff(&DenseMatrix::identity(3)) == 0.0);
        assert_eq!(d.singular_values().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn diagonal_matrix_singular_values_are_sorted() {
        let a = DenseMatrix::<f64>::from_rows(&[vec![1.0, 0.0], vec![0.0, -3.0]]).unwrap();
        let d = svd(&a).unwrap();
        let sv = d.singular_values();
        assert!((sv[0] - 3.0).abs() < 1e-10);
        assert!((sv[1] - 1.0).abs() < 1e-10);
        assert!(d.reconstruct().unwrap().max_abs_diff(&a) < 1e-9);
    }

    #[test]
    fn left_vectors_have_non_negative_lead() {
        let a = DenseMatrix::from_rows(&[vec![3.0, 1.0], vec![1.0, 2.0], vec![0.0, 1.0]]).unwrap();
        let d = svd(&a).unwrap();
        for j in 0..3 {
            assert!(d.u[(0, j)] >= 0.0);
        }
        assert!(d.reconstruct().unwrap().max_abs_diff(&a) < 1e-8);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert!(matches!(svd(&DenseMatrix::<f64>::zeros(0, 2)), Err(KError::InvalidArgument(_))));
    }
}
