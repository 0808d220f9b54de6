//! Preconditioner selection for the solver context.
//!
//! `PcKind` names a preconditioner and its parameters; `BuildPc` turns it
//! into a boxed [`Preconditioner`] for a concrete matrix type.

use crate::config::options::AmgOptions;
use crate::core::traits::Scalar;
use crate::error::KError;
use crate::matrix::{CscMatrix, DenseMatrix, Vector};
use crate::preconditioner::{AlgebraicMultiGrid, Ilu0, Jacobi, Preconditioner};
use std::str::FromStr;

/// Preconditioner choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PcKind {
    /// No preconditioning.
    #[default]
    None,
    /// Diagonal scaling.
    Jacobi,
    /// Incomplete LU with zero fill.
    Ilu,
    /// One algebraic multigrid V-cycle per application (sparse matrices only).
    Amg(AmgOptions),
}

impl FromStr for PcKind {
    type Err = KError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PcKind::None),
            "jacobi" => Ok(PcKind::Jacobi),
            "ilu" | "ilu0" => Ok(PcKind::Ilu),
            "amg" => Ok(PcKind::Amg(AmgOptions::default())),
            other => Err(KError::InvalidArgument(format!("unknown preconditioner '{other}'"))),
        }
    }
}

pub type BoxedPc<M, T> = Box<dyn Preconditioner<M, Vector<T>>>;

/// Matrices that can build the preconditioners named by [`PcKind`].
pub trait BuildPc<T>: Sized {
    fn build_pc(&self, kind: &PcKind) -> Result<Option<BoxedPc<Self, T>>, KError>;
}

impl<T: Scalar> BuildPc<T> for CscMatrix<T> {
    fn build_pc(&self, kind: &PcKind) -> Result<Option<BoxedPc<Self, T>>, KError> {
        Ok(match kind {
            PcKind::None => None,
            PcKind::Jacobi => Some(Box::new(Jacobi::from_matrix(self)?)),
            PcKind::Ilu => Some(Box::new(Ilu0::from_matrix(self)?)),
            PcKind::Amg(options) => Some(Box::new(AlgebraicMultiGrid::new(self, *options)?)),
        })
    }
}

impl<T: Scalar> BuildPc<T> for DenseMatrix<T> {
    fn build_pc(&self, kind: &PcKind) -> Result<Option<BoxedPc<Self, T>>, KError> {
        match kind {
            PcKind::None => Ok(None),
            PcKind::Jacobi => Ok(Some(Box::new(Jacobi::from_matrix(self)?))),
            PcKind::Ilu => Ok(Some(Box::new(Ilu0::from_matrix(&CscMatrix::from_dense(self))?))),
            PcKind::Amg(_) => Err(KError::InvalidArgument(
                "AMG needs a sparse matrix; convert with CscMatrix::from_dense".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!("Jacobi".parse::<PcKind>().unwrap(), PcKind::Jacobi);
        assert!(matches!("amg".parse::<PcKind>().unwrap(), PcKind::Amg(_)));
        assert_eq!("ILU".parse::<PcKind>().unwrap(), PcKind::Ilu);
        assert!("sor".parse::<PcKind>().is_err());
    }

    #[test]
    fn dense_matrices_refuse_amg() {
        let a = DenseMatrix::<f64>::identity(2);
        assert!(a.build_pc(&PcKind::Amg(AmgOptions::default())).is_err());
        assert!(a.build_pc(&PcKind::Jacobi).unwrap().is_some());
        assert!(a.build_pc(&PcKind::Ilu).unwrap().is_some());
    }
}
