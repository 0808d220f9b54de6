use thiserror::Error;

// Unified error type for krylov-kit

#[derive(Error, Debug)]
pub enum KError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("index ({row}, {col}) out of range for a {nrows}x{ncols} matrix")]
    OutOfRange {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("factorization error: {0}")]
    FactorError(String),
    #[error("numerical failure: {0}")]
    Numerical(String),
    #[error("no convergence after {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },
    #[error("indefinite matrix detected (p^T A p <= 0)")]
    IndefiniteMatrix,
    #[error("indefinite preconditioner detected (r·z <= 0)")]
    IndefinitePreconditioner,
    #[error("sparse matrix has staged entries; call finalize() first")]
    Unfinalized,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl KError {
    pub(crate) fn not_converged<T: num_traits::ToPrimitive>(iterations: usize, residual: T) -> Self {
        KError::NotConverged {
            iterations,
            residual: residual.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// True for the only recoverable kind: the last iterate is still usable.
    pub fn is_not_converged(&self) -> bool {
        matches!(self, KError::NotConverged { .. })
    }
}
