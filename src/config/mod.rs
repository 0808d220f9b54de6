//! Option structs consumed by the solver and preconditioner factories.

pub mod options;
pub use options::{AdaptiveOptions, AmgOptions, KspOptions};
