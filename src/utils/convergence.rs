//! Convergence tracking & tolerance checks for iterative solvers.
//!
//! Tolerances are absolute: a solve has converged once `‖r‖₂ ≤ tol`.

use crate::error::KError;
use num_traits::Float;

/// Stopping criteria & stats.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Copy + Float> Convergence<T> {
    /// Returns (should_stop, stats) given current `res_norm` and iteration `i`.
    pub fn check(&self, res_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = res_norm <= self.tol;
        (
            converged || i >= self.max_iters,
            SolveStats {
                iterations: i,
                final_residual: res_norm,
                converged,
            },
        )
    }

    /// Turn the stats of a finished loop into the caller-facing result.
    pub fn finish(&self, stats: SolveStats<T>) -> Result<SolveStats<T>, KError> {
        if stats.converged {
            Ok(stats)
        } else {
            Err(KError::not_converged(stats.iterations, stats.final_residual))
        }
    }
}
