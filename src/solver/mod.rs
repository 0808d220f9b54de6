//! Krylov & direct solver interfaces.

use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::SolveStats;

/// Common interface for any direct or iterative solver.
pub trait LinearSolver<M, V> {
    type Scalar;
    /// Solve A·x = b, writing result into `x`.
    ///
    /// `x` is the initial guess on entry. On exit it holds the last iterate,
    /// also when an error is returned.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<Self::Scalar>, KError>;
}

pub mod direct_lu;
pub use direct_lu::LuSolver;

pub mod cg;
pub use cg::CgSolver;

pub mod gmres;
pub use gmres::{arnoldi, arnoldi_step, GmresSolver, Preconditioning};

pub mod gradient_descent;
pub use gradient_descent::GradientDescentSolver;

/// Shape checks shared by the iterative solvers.
pub(crate) fn check_system<M, T>(a: &M, b: &[T], x: &[T], tol: T) -> Result<(), KError>
where
    M: crate::core::traits::MatShape,
    T: crate::core::traits::Scalar,
{
    if !a.is_square() {
        return Err(KError::InvalidArgument(format!(
            "iterative solve needs a square matrix, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() || x.len() != a.ncols() {
        return Err(KError::InvalidArgument(format!(
            "system of size {} got b of length {} and x of length {}",
            a.nrows(),
            b.len(),
            x.len()
        )));
    }
    if !(tol > T::zero()) {
        return Err(KError::InvalidArgument(format!("tolerance must be positive, got {tol}")));
    }
    if b.iter().all(|&bi| bi == T::zero()) {
        tracing::warn!(n = b.len(), "zero right-hand side");
    }
    Ok(())
}

/// `r = b − A x`.
pub(crate) fn residual<M, V, T>(a: &M, b: &V, x: &V) -> V
where
    M: crate::core::traits::MatVec<V>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>>,
    T: crate::core::traits::Scalar,
{
    let mut r = V::from(vec![T::zero(); b.as_ref().len()]);
    a.matvec(x, &mut r);
    for (ri, &bi) in r.as_mut().iter_mut().zip(b.as_ref()) {
        *ri = bi - *ri;
    }
    r
}
