//! Power iteration and the Rayleigh quotient.

use crate::core::traits::{MatVec, Scalar};
use crate::error::KError;
use crate::matrix::Vector;

fn check_square<M: MatVec<Vector<T>>, T: Scalar>(a: &M, b: &Vector<T>) -> Result<(), KError> {
    if !a.is_square() || a.ncols() != b.len() {
        return Err(KError::InvalidArgument(format!(
            "expected a square matrix matching a vector of length {}, got {}x{}",
            b.len(),
            a.nrows(),
            a.ncols()
        )));
    }
    Ok(())
}

/// Run `max_iter` steps of `b ← A·b / ‖A·b‖`, leaving `b` normalized.
///
/// If `A·b` vanishes the iteration stops early and `b` is left as the zero
/// vector.
pub fn power_iter<M, T>(a: &M, b: &mut Vector<T>, max_iter: usize) -> Result<(), KError>
where
    M: MatVec<Vector<T>>,
    T: Scalar,
{
    check_square(a, b)?;
    let mut next = Vector::zeros(b.len());
    for _ in 0..max_iter {
        b.normalize();
        a.matvec(b, &mut next);
        std::mem::swap(b, &mut next);
        if b.l2_norm() == T::zero() {
            return Ok(());
        }
    }
    b.normalize();
    Ok(())
}

/// `(bᵀ A b) / (bᵀ b)`.
pub fn rayleigh_quotient<M, T>(a: &M, b: &Vector<T>) -> Result<T, KError>
where
    M: MatVec<Vector<T>>,
    T: Scalar,
{
    check_square(a, b)?;
    if b.l2_norm() < T::epsilon() {
        return Err(KError::Numerical("Rayleigh quotient of a vector with vanishing norm".into()));
    }
    let mut ab = Vector::zeros(b.len());
    a.matvec(b, &mut ab);
    Ok(b.dot(&ab) / b.dot(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DenseMatrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn power_iteration_finds_dominant_eigenpair() {
        let a = DenseMatrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let mut b = Vector::from_vec(vec![1.0, 0.0]);
        power_iter(&a, &mut b, 100).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(b[0], s, epsilon = 1e-10);
        assert_abs_diff_eq!(b[1], s, epsilon = 1e-10);
        assert_abs_diff_eq!(rayleigh_quotient(&a, &b).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn power_iteration_stops_on_null_image() {
        let a = DenseMatrix::from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut b = Vector::from_vec(vec![1.0, 0.0]);
        power_iter(&a, &mut b, 10).unwrap();
        assert_eq!(b.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn shape_and_norm_errors() {
        let a = DenseMatrix::<f64>::zeros(2, 3);
        let mut b = Vector::zeros(3);
        assert!(matches!(power_iter(&a, &mut b, 1), Err(KError::InvalidArgument(_))));
        let sq = DenseMatrix::<f64>::identity(2);
        let tiny = Vector::from_vec(vec![0.0, 1e-20]);
        assert!(matches!(rayleigh_quotient(&sq, &tiny), Err(KError::Numerical(_))));
    }
}
