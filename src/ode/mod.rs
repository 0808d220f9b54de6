//! Explicit integrators for autonomous systems `y' = f(y)`.

pub mod rk4;
pub use rk4::{AdaptiveStats, RungeKutta};
