//! Context module for krylov-kit.
//!
//! Contexts bundle algorithm selection, parameters and the preconditioner
//! pipeline behind one `solve` call.
//!
//! - [`ksp_context`]: the `KspContext` factory for iterative solvers.
//! - [`pc_context`]: preconditioner selection and construction.
//!
//! # Example
//! ```rust,ignore
//! use krylov_kit::context::{KspContext, SolverKind, PcKind};
//! let opts = KspOptions::default().with_kind(SolverKind::Cg).with_pc(PcKind::Jacobi);
//! let mut ksp = KspContext::new(a, opts)?;
//! ksp.solve(&b, &mut x)?;
//! ```

pub mod ksp_context;
pub use ksp_context::{KspContext, SolverKind};
pub mod pc_context;
pub use pc_context::{BuildPc, PcKind};
