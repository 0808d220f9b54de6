//! Generalized Minimal Residual (GMRES) solver with fixed restart (Saad §6.4)
//!
//! Each outer cycle builds an orthonormal Krylov basis with the Arnoldi
//! process (modified Gram–Schmidt, applied twice), reduces the Hessenberg
//! matrix to upper-triangular form with Givens rotations, and solves the
//! small least-squares problem by back substitution. The rotated right-hand
//! side gives the residual norm without forming `b − A x`.
//!
//! `max_iters` counts outer restarts. With a preconditioner the method runs
//! on `A M⁻¹` (right preconditioning), so the monitored residual is the true
//! residual of the original system.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.4

use crate::core::traits::{InnerProduct, MatVec, Scalar};
use crate::error::KError;
use crate::matrix::DenseMatrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{check_system, residual, LinearSolver};
use crate::utils::convergence::{Convergence, SolveStats};
use tracing::{debug, trace, warn};

/// Preconditioning mode for GMRES.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preconditioning {
    /// Ignore any preconditioner passed to `solve`
    None,
    /// Solve `A M⁻¹ y = b`, then `x = M⁻¹ y`
    Right,
}

/// GMRES solver struct with restart and preconditioning options.
pub struct GmresSolver<T> {
    /// Number of Arnoldi vectors before restart
    pub restart: usize,
    /// Convergence criteria (tolerance and outer restarts)
    pub conv: Convergence<T>,
    /// Preconditioning mode
    pub preconditioning: Preconditioning,
}

impl<T: Scalar> GmresSolver<T> {
    /// Create a new GMRES solver with restart, tolerance, and max restarts.
    pub fn new(restart: usize, tol: T, max_iters: usize) -> Self {
        Self {
            restart,
            conv: Convergence { tol, max_iters },
            preconditioning: Preconditioning::Right,
        }
    }

    pub fn with_preconditioning(mut self, mode: Preconditioning) -> Self {
        self.preconditioning = mode;
        self
    }
}

/// One Arnoldi step for an arbitrary operator `w = op(q_j)`.
fn arnoldi_step_with<V, T, F>(op: F, q: &mut Vec<V>, h: &mut DenseMatrix<T>, j: usize, tol: T) -> Result<bool, KError>
where
    F: FnOnce(&V, &mut V) -> Result<(), KError>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>>,
    T: Scalar,
{
    let ip = ();
    let n = q[j].as_ref().len();
    let mut w = V::from(vec![T::zero(); n]);
    op(&q[j], &mut w)?;
    // Modified Gram-Schmidt, second pass as iterative refinement
    for _ in 0..2 {
        for (i, qi) in q.iter().enumerate().take(j + 1) {
            let hij = ip.dot(&w, qi);
            h[(i, j)] = h[(i, j)] + hij;
            for (wk, &qik) in w.as_mut().iter_mut().zip(qi.as_ref()) {
                *wk = *wk - hij * qik;
            }
        }
    }
    let norm = ip.norm(&w);
    h[(j + 1, j)] = norm;
    if norm < tol {
        return Ok(true);
    }
    for wk in w.as_mut() {
        *wk = *wk / norm;
    }
    q.push(w);
    Ok(false)
}

/// Step `j` of the Arnoldi process: orthogonalize `A·q_j` against
/// `q_0..=q_j`, store the coefficients in column `j` of `h` (which must be
/// zero there on entry) and append `q_{j+1}`.
///
/// Returns `true` on breakdown (`h[j+1, j] < tol`), in which case no vector
/// is appended: the Krylov subspace is invariant under `A`.
pub fn arnoldi_step<M, V, T>(a: &M, q: &mut Vec<V>, h: &mut DenseMatrix<T>, j: usize, tol: T) -> bool
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>>,
    T: Scalar,
{
    let op = |v: &V, w: &mut V| {
        a.matvec(v, w);
        Ok(())
    };
    matches!(arnoldi_step_with(op, q, h, j, tol), Ok(true))
}

/// Run the Arnoldi process for up to `k = h.ncols()` steps.
///
/// `q` must hold the normalized start vector; `h` must be `(k+1) × k` and
/// zero. Returns the number of steps completed, less than `k` on breakdown.
pub fn arnoldi<M, V, T>(a: &M, q: &mut Vec<V>, h: &mut DenseMatrix<T>, tol: T) -> Result<usize, KError>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>>,
    T: Scalar,
{
    let k = h.ncols();
    if h.nrows() != k + 1 {
        return Err(KError::InvalidArgument(format!(
            "Hessenberg matrix must be {}x{}, got {}x{}",
            k + 1,
            k,
            h.nrows(),
            k
        )));
    }
    if q.len() != 1 || q[0].as_ref().len() != a.ncols() {
        return Err(KError::InvalidArgument("Arnoldi needs exactly one start vector of matching length".into()));
    }
    for j in 0..k {
        if arnoldi_step(a, q, h, j, tol) {
            trace!(step = j, "Arnoldi breakdown");
            return Ok(j + 1);
        }
    }
    Ok(k)
}

/// Apply previous rotations to column `j`, then zero `h[j+1, j]` and
/// rotate `g` with the new one.
fn apply_givens_and_update_g<T: Scalar>(h: &mut DenseMatrix<T>, g: &mut [T], cs: &mut [T], sn: &mut [T], j: usize) {
    for i in 0..j {
        let temp = cs[i] * h[(i, j)] + sn[i] * h[(i + 1, j)];
        h[(i + 1, j)] = -sn[i] * h[(i, j)] + cs[i] * h[(i + 1, j)];
        h[(i, j)] = temp;
    }
    let h_kk = h[(j, j)];
    let h_k1k = h[(j + 1, j)];
    let r = h_kk.hypot(h_k1k);
    if r == T::zero() {
        cs[j] = T::one();
        sn[j] = T::zero();
    } else {
        cs[j] = h_kk / r;
        sn[j] = h_k1k / r;
    }
    h[(j, j)] = cs[j] * h_kk + sn[j] * h_k1k;
    h[(j + 1, j)] = T::zero();
    let temp = cs[j] * g[j] + sn[j] * g[j + 1];
    g[j + 1] = -sn[j] * g[j] + cs[j] * g[j + 1];
    g[j] = temp;
}

/// Solve the leading `m × m` upper-triangular system `H y = g`; a vanishing
/// pivot zeroes its coefficient.
fn back_substitution<T: Scalar>(h: &DenseMatrix<T>, g: &[T], m: usize) -> Vec<T> {
    let mut y = vec![T::zero(); m];
    for i in (0..m).rev() {
        let mut s = g[i];
        for j in (i + 1)..m {
            s = s - h[(i, j)] * y[j];
        }
        y[i] = if h[(i, i)].abs() > T::epsilon() { s / h[(i, i)] } else { T::zero() };
    }
    y
}

impl<M, V, T> LinearSolver<M, V> for GmresSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Scalar,
{
    type Scalar = T;

    fn solve(&mut self, a: &M, pc: Option<&dyn Preconditioner<M, V>>, b: &V, x: &mut V) -> Result<SolveStats<T>, KError> {
        check_system(a, b.as_ref(), x.as_ref(), self.conv.tol)?;
        if self.restart == 0 {
            return Err(KError::InvalidArgument("GMRES restart length must be positive".into()));
        }
        let pc = match self.preconditioning {
            Preconditioning::Right => pc,
            Preconditioning::None => None,
        };
        let n = b.as_ref().len();
        let m = self.restart;
        let ip = ();
        let breakdown_tol = T::lit(1e-14);
        debug!(n, restart = m, tol = %self.conv.tol, max_restarts = self.conv.max_iters, "GMRES start");

        let mut r = residual(a, b, x);
        let mut beta = ip.norm(&r);
        if beta <= self.conv.tol {
            return Ok(SolveStats { iterations: 0, final_residual: beta, converged: true });
        }

        let mut inner_total = 0;
        for outer in 1..=self.conv.max_iters {
            let mut q: Vec<V> = Vec::with_capacity(m + 1);
            q.push(V::from(r.as_ref().iter().map(|&ri| ri / beta).collect::<Vec<_>>()));
            let mut h = DenseMatrix::zeros(m + 1, m);
            let mut g = vec![T::zero(); m + 1];
            g[0] = beta;
            let mut cs = vec![T::zero(); m];
            let mut sn = vec![T::zero(); m];

            let mut k = 0;
            for j in 0..m {
                let breakdown = arnoldi_step_with(
                    |v: &V, w: &mut V| match pc {
                        Some(pc) => {
                            let mut z = V::from(vec![T::zero(); n]);
                            pc.apply(v, &mut z)?;
                            a.matvec(&z, w);
                            Ok(())
                        }
                        None => {
                            a.matvec(v, w);
                            Ok(())
                        }
                    },
                    &mut q,
                    &mut h,
                    j,
                    breakdown_tol,
                )?;
                apply_givens_and_update_g(&mut h, &mut g, &mut cs, &mut sn, j);
                k = j + 1;
                inner_total += 1;
                let est = g[j + 1].abs();
                trace!(outer, inner = k, residual = %est, "GMRES step");
                if est <= self.conv.tol || breakdown {
                    break;
                }
            }

            let y = back_substitution(&h, &g, k);
            let mut update = V::from(vec![T::zero(); n]);
            for (yi, qi) in y.iter().zip(&q) {
                for (uk, &qik) in update.as_mut().iter_mut().zip(qi.as_ref()) {
                    *uk = *uk + *yi * qik;
                }
            }
            if let Some(pc) = pc {
                let mut z = V::from(vec![T::zero(); n]);
                pc.apply(&update, &mut z)?;
                update = z;
            }
            for (xk, &uk) in x.as_mut().iter_mut().zip(update.as_ref()) {
                *xk = *xk + uk;
            }

            r = residual(a, b, x);
            beta = ip.norm(&r);
            let (_, mut stats) = self.conv.check(beta, outer);
            stats.iterations = inner_total;
            if stats.converged {
                debug!(restarts = outer, iterations = inner_total, residual = %beta, "GMRES converged");
                return Ok(stats);
            }
        }
        warn!(restarts = self.conv.max_iters, residual = %beta, "GMRES did not converge");
        Err(KError::not_converged(inner_total, beta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Vector;
    use crate::preconditioner::Jacobi;

    fn nonsymmetric() -> DenseMatrix<f64> {
        DenseMatrix::from_rows(&[
            vec![4.0, 1.0, 0.0, 0.0],
            vec![-2.0, 5.0, 1.0, 0.0],
            vec![0.0, -1.0, 3.0, 2.0],
            vec![1.0, 0.0, -1.0, 6.0],
        ])
        .unwrap()
    }

    #[test]
    fn arnoldi_builds_orthonormal_basis() {
        let a = nonsymmetric();
        let mut start = Vector::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        start.normalize();
        let mut q = vec![start];
        let mut h = DenseMatrix::zeros(4, 3);
        let steps = arnoldi(&a, &mut q, &mut h, 1e-12).unwrap();
        assert_eq!(steps, 3);
        assert_eq!(q.len(), 4);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((q[i].dot(&q[j]) - expected).abs() < 1e-12);
            }
        }
        // A q_j = Σ h_ij q_i
        for j in 0..3 {
            let aq = a.mul_vec(&q[j]).unwrap();
            let mut comb = Vector::zeros(4);
            for (i, qi) in q.iter().enumerate().take(j + 2) {
                comb.axpy(h[(i, j)], qi);
            }
            assert!((&aq - &comb).l2_norm() < 1e-12);
        }
    }

    #[test]
    fn arnoldi_reports_breakdown_on_invariant_subspace() {
        let a = DenseMatrix::<f64>::identity(3);
        let mut q = vec![Vector::unit(0, 3)];
        let mut h = DenseMatrix::zeros(3, 2);
        assert_eq!(arnoldi(&a, &mut q, &mut h, 1e-12).unwrap(), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(h[(0, 0)], 1.0);
    }

    #[test]
    fn gmres_solves_nonsymmetric_system() {
        let a = nonsymmetric();
        let x_true = Vector::from_vec(vec![1.0, -1.0, 2.0, 0.5]);
        let b = a.mul_vec(&x_true).unwrap();
        let mut x = Vector::zeros(4);
        let stats = GmresSolver::new(4, 1e-12, 5).solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged);
        assert!((&x - &x_true).l2_norm() < 1e-10);
    }

    #[test]
    fn restarted_and_preconditioned_gmres() {
        let a = nonsymmetric();
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let pc = Jacobi::from_matrix(&a).unwrap();
        let mut x = Vector::zeros(4);
        let stats = GmresSolver::new(2, 1e-10, 200).solve(&a, Some(&pc), &b, &mut x).unwrap();
        assert!(stats.final_residual <= 1e-10);
        let r = &b - &a.mul_vec(&x).unwrap();
        assert!(r.l2_norm() <= 1e-10);
    }

    #[test]
    fn exhausted_restarts_report_not_converged() {
        let a = nonsymmetric();
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let mut x = Vector::zeros(4);
        let err = GmresSolver::new(1, 1e-14, 1).solve(&a, None, &b, &mut x).unwrap_err();
        assert!(err.is_not_converged());
        assert!(x.is_finite());
    }
}
