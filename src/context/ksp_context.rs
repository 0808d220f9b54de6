//! Factory for Krylov Subspace Methods (KSP).
//!
//! `KspContext` owns the system matrix and the preconditioner built from
//! [`KspOptions`], and dispatches `solve` to the selected method.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - PETSc documentation: https://petsc.org/release/docs/manualpages/KSP/

use crate::config::options::KspOptions;
use crate::context::pc_context::{BoxedPc, BuildPc};
use crate::core::traits::{MatVec, Scalar};
use crate::error::KError;
use crate::matrix::Vector;
use crate::solver::{CgSolver, GmresSolver, GradientDescentSolver, LinearSolver};
use crate::utils::convergence::SolveStats;
use std::str::FromStr;
use tracing::debug;

/// Enum representing the available iterative solver types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverKind {
    /// Conjugate Gradient (CG) method (for SPD matrices)
    #[default]
    Cg,
    /// Restarted GMRES with right preconditioning
    Gmres,
    /// Steepest descent (for SPD matrices)
    GradientDescent,
}

impl FromStr for SolverKind {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cg" => Ok(SolverKind::Cg),
            "gmres" => Ok(SolverKind::Gmres),
            "gd" | "gradient-descent" | "gradient_descent" => Ok(SolverKind::GradientDescent),
            other => Err(KError::InvalidArgument(format!("unknown solver '{other}'"))),
        }
    }
}

/// Context and configuration for an iterative solver.
pub struct KspContext<M, T> {
    pub options: KspOptions,
    a: M,
    pc: Option<BoxedPc<M, T>>,
}

impl<M, T> KspContext<M, T>
where
    M: MatVec<Vector<T>> + BuildPc<T>,
    T: Scalar,
{
    /// Take ownership of `a` and build the preconditioner named in `options`.
    pub fn new(a: M, options: KspOptions) -> Result<Self, KError> {
        let pc = a.build_pc(&options.pc)?;
        Ok(Self { options, a, pc })
    }

    /// Replace the configured preconditioner with a custom one.
    pub fn with_pc(mut self, pc: BoxedPc<M, T>) -> Self {
        self.pc = Some(pc);
        self
    }

    pub fn matrix(&self) -> &M {
        &self.a
    }

    /// Solve `A x = b` with the configured method; `x` is the initial guess.
    pub fn solve(&mut self, b: &Vector<T>, x: &mut Vector<T>) -> Result<SolveStats<T>, KError> {
        let tol = T::lit(self.options.tol);
        let max_it = self.options.max_iters;
        debug!(kind = ?self.options.kind, pc = ?self.options.pc, "KSP solve");
        let pc = self.pc.as_deref();
        match self.options.kind {
            SolverKind::Cg => CgSolver::new(tol, max_it).solve(&self.a, pc, b, x),
            SolverKind::Gmres => GmresSolver::new(self.options.restart, tol, max_it).solve(&self.a, pc, b, x),
            SolverKind::GradientDescent => GradientDescentSolver::new(tol, max_it).solve(&self.a, pc, b, x),
        }
    }
}
