//! Preconditioned Conjugate Gradient per Saad §9.2.
//!
//! Stops once `‖r‖₂ ≤ tol`. The tolerance is absolute: for a right-hand
//! side with `‖b‖₂ < 1` this is looser than the relative bound
//! `‖r‖₂ ≤ tol·‖b‖₂`, so pass `tol · ‖b‖₂` when a relative criterion is
//! wanted.
//!
//! A non-positive curvature `pᵀAp` aborts with [`KError::IndefiniteMatrix`].
//! A non-positive `rᵀz` on a non-converged residual (possible only with a
//! preconditioner that is not SPD) aborts with
//! [`KError::IndefinitePreconditioner`].

use crate::core::traits::{InnerProduct, MatVec, Scalar};
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::{check_system, residual, LinearSolver};
use crate::utils::convergence::{Convergence, SolveStats};
use tracing::{debug, trace, warn};

pub struct CgSolver<T> {
    pub conv: Convergence<T>,
    pub monitor: Option<Box<dyn FnMut(usize, T)>>,
    pub residual_history: Vec<T>,
}

impl<T: Scalar> CgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            conv: Convergence { tol, max_iters },
            monitor: None,
            residual_history: Vec::new(),
        }
    }

    /// Called with `(iteration, ‖r‖₂)` after every update, iteration 0 included.
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, T) + 'static,
    {
        self.monitor = Some(Box::new(f));
        self
    }

    pub fn clear_history(&mut self) {
        self.residual_history.clear();
    }

    fn record(&mut self, i: usize, res: T) {
        if let Some(ref mut monitor) = self.monitor {
            monitor(i, res);
        }
        self.residual_history.push(res);
    }
}

fn precondition<M, V>(pc: Option<&dyn Preconditioner<M, V>>, r: &V, z: &mut V) -> Result<(), KError>
where
    V: Clone,
{
    match pc {
        Some(pc) => pc.apply(r, z),
        None => {
            z.clone_from(r);
            Ok(())
        }
    }
}

/// `rᵀz` must stay positive while `r ≠ 0`; otherwise `β` is negative or NaN.
fn check_preconditioned_residual<T: Scalar>(rz: T, iteration: usize) -> Result<(), KError> {
    if rz <= T::zero() || rz.is_nan() {
        warn!(iteration, rz = %rz, "CG detected an indefinite preconditioner");
        return Err(KError::IndefinitePreconditioner);
    }
    Ok(())
}

impl<M, V, T> LinearSolver<M, V> for CgSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Scalar,
{
    type Scalar = T;

    fn solve(&mut self, a: &M, pc: Option<&dyn Preconditioner<M, V>>, b: &V, x: &mut V) -> Result<SolveStats<T>, KError> {
        check_system(a, b.as_ref(), x.as_ref(), self.conv.tol)?;
        let n = b.as_ref().len();
        let ip = ();
        debug!(n, tol = %self.conv.tol, max_iters = self.conv.max_iters, preconditioned = pc.is_some(), "CG start");

        let mut r = residual(a, b, x);
        let mut res_norm = ip.norm(&r);
        self.record(0, res_norm);
        if res_norm <= self.conv.tol {
            debug!(residual = %res_norm, "CG initial guess already converged");
            return Ok(SolveStats { iterations: 0, final_residual: res_norm, converged: true });
        }

        let mut z = V::from(vec![T::zero(); n]);
        precondition(pc, &r, &mut z)?;
        let mut p = z.clone();
        let mut rz = ip.dot(&r, &z);
        check_preconditioned_residual(rz, 0)?;
        let mut ap = V::from(vec![T::zero(); n]);

        for i in 1..=self.conv.max_iters {
            a.matvec(&p, &mut ap);
            let p_dot_ap = ip.dot(&p, &ap);
            // Indefinite-matrix detection
            if p_dot_ap <= T::zero() || p_dot_ap.is_nan() {
                warn!(iteration = i, curvature = %p_dot_ap, "CG detected non-positive curvature");
                return Err(KError::IndefiniteMatrix);
            }
            let alpha = rz / p_dot_ap;
            for (xj, &pj) in x.as_mut().iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * pj;
            }
            for (rj, &apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * apj;
            }
            res_norm = ip.norm(&r);
            self.record(i, res_norm);
            trace!(iteration = i, residual = %res_norm, "CG step");

            let (stop, stats) = self.conv.check(res_norm, i);
            if stats.converged {
                debug!(iterations = i, residual = %res_norm, "CG converged");
                return Ok(stats);
            }
            if stop {
                break;
            }

            precondition(pc, &r, &mut z)?;
            let rz_new = ip.dot(&r, &z);
            check_preconditioned_residual(rz_new, i)?;
            let beta = rz_new / rz;
            for (pj, &zj) in p.as_mut().iter_mut().zip(z.as_ref()) {
                *pj = zj + beta * *pj;
            }
            rz = rz_new;
        }
        warn!(max_iters = self.conv.max_iters, residual = %res_norm, "CG did not converge");
        Err(KError::not_converged(self.conv.max_iters, res_norm))
    }
}
