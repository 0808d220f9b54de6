//! Dense factorizations and the eigen primitives they are built from.

pub mod cholesky;
pub mod eigen;
pub mod gram_schmidt;
pub mod lu;
pub mod qr;
pub mod substitution;
pub mod svd;

pub use cholesky::cholesky;
pub use eigen::{power_iter, rayleigh_quotient};
pub use gram_schmidt::{gram_schmidt, sub_projection};
pub use lu::{pivot_lu, LuFactors};
pub use qr::{qr, Qr};
pub use substitution::{substitution, Direction};
pub use svd::{svd, Svd};
