//! Capability traits and their implementations for foreign types.

pub mod traits;
pub mod wrappers;

pub use traits::{Diagonal, InnerProduct, MatShape, MatVec, MatrixSet, Scalar};
