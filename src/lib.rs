//! krylov-kit: small numerical linear algebra toolkit.
//!
//! Dense and compressed-sparse-column matrices, direct factorizations
//! (QR, pivoted LU, Cholesky, SVD), Krylov and descent solvers with
//! Jacobi, ILU(0) and algebraic-multigrid preconditioning, a fourth-order
//! Runge–Kutta integrator, Gauss–Legendre quadrature, and a Matrix Market
//! reader.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod factor;
pub mod io;
pub mod matrix;
pub mod ode;
pub mod preconditioner;
pub mod quadrature;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use self::core::*;
pub use error::*;
pub use factor::*;
pub use io::*;
pub use matrix::*;
pub use ode::*;
pub use preconditioner::*;
pub use quadrature::*;
pub use solver::*;
pub use utils::*;

pub use utils::convergence::SolveStats;
