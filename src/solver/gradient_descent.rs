//! Steepest descent on `½xᵀAx − bᵀx` for SPD `A`.
//!
//! Each step recomputes `r = b − A x` and moves along it with the exact line
//! search `α = rᵀr / rᵀAr`. Convergence is linear with rate
//! `(κ − 1)/(κ + 1)`, so this is mainly a baseline for CG.

use crate::core::traits::{InnerProduct, MatVec, Scalar};
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::{check_system, residual, LinearSolver};
use crate::utils::convergence::{Convergence, SolveStats};
use tracing::{debug, trace, warn};

pub struct GradientDescentSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Scalar> GradientDescentSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters } }
    }
}

impl<M, V, T> LinearSolver<M, V> for GradientDescentSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Scalar,
{
    type Scalar = T;

    fn solve(&mut self, a: &M, pc: Option<&dyn Preconditioner<M, V>>, b: &V, x: &mut V) -> Result<SolveStats<T>, KError> {
        let _ = pc; // plain steepest descent
        check_system(a, b.as_ref(), x.as_ref(), self.conv.tol)?;
        let n = b.as_ref().len();
        let ip = ();
        debug!(n, tol = %self.conv.tol, max_iters = self.conv.max_iters, "gradient descent start");

        let mut ar = V::from(vec![T::zero(); n]);
        let mut i = 0;
        loop {
            let r = residual(a, b, x);
            let rr = ip.dot(&r, &r);
            let res_norm = rr.sqrt();
            trace!(iteration = i, residual = %res_norm, "gradient descent step");
            let (stop, stats) = self.conv.check(res_norm, i);
            if stats.converged {
                debug!(iterations = i, residual = %res_norm, "gradient descent converged");
                return Ok(stats);
            }
            if stop {
                warn!(max_iters = self.conv.max_iters, residual = %res_norm, "gradient descent did not converge");
                return self.conv.finish(stats);
            }
            a.matvec(&r, &mut ar);
            let rar = ip.dot(&r, &ar);
            if rar <= T::zero() || rar.is_nan() {
                warn!(iteration = i, "gradient descent found non-positive curvature");
                return Err(KError::IndefiniteMatrix);
            }
            let alpha = rr / rar;
            for (xj, &rj) in x.as_mut().iter_mut().zip(r.as_ref()) {
                *xj = *xj + alpha * rj;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{DenseMatrix, Vector};

    #[test]
    fn converges_on_well_conditioned_spd() {
        let a = DenseMatrix::<f64>::from_rows(&[vec![3.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let b = Vector::from_vec(vec![9.0, 8.0]);
        let mut x = Vector::zeros(2);
        let stats = GradientDescentSolver::new(1e-10, 500).solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged);
        assert!((x[0] - 2.0).abs() < 1e-9 && (x[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rhs_returns_zero_immediately() {
        let a = DenseMatrix::<f64>::identity(3);
        let b = Vector::zeros(3);
        let mut x = Vector::zeros(3);
        let stats = GradientDescentSolver::new(1e-8, 10).solve(&a, None, &b, &mut x).unwrap();
        assert_eq!(stats.iterations, 0);
        assert_eq!(x.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn budget_exhaustion_keeps_last_iterate() {
        let a = DenseMatrix::from_rows(&[vec![10.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let b = Vector::from_vec(vec![1.0, 1.0]);
        let mut x = Vector::zeros(2);
        let err = GradientDescentSolver::new(1e-12, 3).solve(&a, None, &b, &mut x).unwrap_err();
        assert!(matches!(err, KError::NotConverged { iterations: 3, .. }));
        assert!(x.l2_norm() > 0.0);
    }
}
