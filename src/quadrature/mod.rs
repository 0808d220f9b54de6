//! Numerical integration over finite intervals.

pub mod gauss_legendre;
pub use gauss_legendre::GaussQuadrature;
