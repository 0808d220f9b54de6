//! Trivial preconditioners: `z = r` and an explicit operator `z = P·r`.

use crate::core::traits::MatVec;
use crate::error::KError;
use crate::preconditioner::Preconditioner;

/// No-op preconditioner, M⁻¹ = I.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<M, V: Clone> Preconditioner<M, V> for Identity {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError> {
        z.clone_from(r);
        Ok(())
    }
}

/// User-supplied approximate inverse applied by multiplication.
#[derive(Debug, Clone)]
pub struct MatrixPc<P> {
    p: P,
}

impl<P> MatrixPc<P> {
    pub fn new(p: P) -> Self {
        Self { p }
    }

    pub fn inner(&self) -> &P {
        &self.p
    }
}

impl<M, V, P: MatVec<V>> Preconditioner<M, V> for MatrixPc<P> {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError> {
        self.p.matvec(r, z);
        Ok(())
    }
}
