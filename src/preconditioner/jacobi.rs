// Jacobi preconditioner implementation

use crate::core::traits::{Diagonal, Scalar};
use crate::error::KError;
use crate::preconditioner::Preconditioner;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
#[derive(Debug, Clone)]
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Scalar> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }

    /// Build directly from a matrix.
    pub fn from_matrix<M: Diagonal<T>>(a: &M) -> Result<Self, KError> {
        let inv_diag = a
            .diagonal()
            .into_iter()
            .enumerate()
            .map(|(i, d)| if d == T::zero() { Err(KError::ZeroPivot(i)) } else { Ok(T::one() / d) })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { inv_diag })
    }
}

impl<T: Scalar> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: Diagonal<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Scalar,
{
    fn setup(&mut self, a: &M) -> Result<(), KError> {
        *self = Self::from_matrix(a)?;
        Ok(())
    }

    fn apply(&self, x: &V, y: &mut V) -> Result<(), KError> {
        let x_ref = x.as_ref();
        if x_ref.len() != self.inv_diag.len() {
            return Err(KError::InvalidArgument(format!(
                "Jacobi set up for {} unknowns, got {}",
                self.inv_diag.len(),
                x_ref.len()
            )));
        }
        for ((yi, &xi), &d) in y.as_mut().iter_mut().zip(x_ref).zip(&self.inv_diag) {
            *yi = d * xi;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CscMatrix, Vector};

    #[test]
    fn scales_by_inverse_diagonal() {
        let a = CscMatrix::from_triplets(2, 2, &[(0, 0, 4.0), (1, 1, -2.0), (0, 1, 1.0)]).unwrap();
        let mut pc = Jacobi::new();
        Preconditioner::<CscMatrix<f64>, Vector<f64>>::setup(&mut pc, &a).unwrap();
        let mut z = Vector::zeros(2);
        Preconditioner::<CscMatrix<f64>, Vector<f64>>::apply(&pc, &Vector::from_vec(vec![2.0, 2.0]), &mut z)
            .unwrap();
        assert_eq!(z.as_slice(), &[0.5, -1.0]);
    }

    #[test]
    fn zero_diagonal_is_rejected() {
        let a = CscMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, 1.0)]).unwrap();
        assert!(matches!(Jacobi::from_matrix(&a), Err(KError::ZeroPivot(1))));
    }
}
