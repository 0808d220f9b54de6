//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait together with the identity,
//! Jacobi, ILU(0), explicit-matrix and algebraic multigrid implementations.

use crate::error::KError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), KError> {
        Ok(())
    }
}

pub mod amg;
pub mod identity;
pub mod ilu;
pub mod jacobi;

pub use amg::{AlgebraicMultiGrid, AmgPreconditioner};
pub use identity::{Identity, MatrixPc};
pub use ilu::Ilu0;
pub use jacobi::Jacobi;
