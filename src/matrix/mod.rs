//! Matrix module: dense vectors, dense matrices and CSC sparse matrices.

pub mod dense;
pub mod sparse;
pub mod vector;

pub use dense::DenseMatrix;
pub use sparse::CscMatrix;
pub use vector::Vector;
