//! API options for solvers, preconditioners and the adaptive integrator.
//!
//! Every struct carries sensible defaults and `with_*` setters so callers
//! only spell out what they change:
//!
//! ```rust,ignore
//! let opts = KspOptions::default().with_tol(1e-10).with_max_iters(500);
//! ```

use crate::context::ksp_context::SolverKind;
use crate::context::pc_context::PcKind;

/// Krylov solver selection & stopping criteria.
#[derive(Debug, Clone)]
pub struct KspOptions {
    /// Which iterative method to run
    pub kind: SolverKind,
    /// Preconditioner built by the context
    pub pc: PcKind,
    /// Absolute residual tolerance
    pub tol: f64,
    /// Iteration budget (outer restarts for GMRES)
    pub max_iters: usize,
    /// Krylov dimension before a GMRES restart
    pub restart: usize,
}

impl Default for KspOptions {
    fn default() -> Self {
        Self {
            kind: SolverKind::Cg,
            pc: PcKind::None,
            tol: 1e-8,
            max_iters: 1000,
            restart: 30,
        }
    }
}

impl KspOptions {
    pub fn with_kind(mut self, kind: SolverKind) -> Self {
        self.kind = kind;
        self
    }
    pub fn with_pc(mut self, pc: PcKind) -> Self {
        self.pc = pc;
        self
    }
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart;
        self
    }
}

/// Step-size control for adaptive RK4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveOptions<T> {
    /// Safety factor applied to the optimal step scale
    pub safety: T,
    /// Lower clip of the step scale
    pub min_scale: T,
    /// Upper clip of the step scale
    pub max_scale: T,
    /// Integrate up to this time; `None` runs a fixed number of accepted steps
    pub horizon: Option<T>,
}

impl<T: crate::core::traits::Scalar> Default for AdaptiveOptions<T> {
    fn default() -> Self {
        Self {
            safety: T::lit(0.9),
            min_scale: T::lit(0.1),
            max_scale: T::lit(2.0),
            horizon: None,
        }
    }
}

impl<T> AdaptiveOptions<T> {
    pub fn with_safety(mut self, safety: T) -> Self {
        self.safety = safety;
        self
    }
    pub fn with_scale_bounds(mut self, min_scale: T, max_scale: T) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }
    pub fn with_horizon(mut self, horizon: T) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

/// Algebraic multigrid hierarchy parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmgOptions {
    /// Maximum number of levels, finest included
    pub levels: usize,
    /// Pre- and post-smoothing sweeps per level
    pub smoothing_steps: usize,
    /// Strong-coupling threshold θ
    pub theta: f64,
    /// Damping ω of the Jacobi smoother
    pub omega: f64,
    /// Stop coarsening once a level has at most this many rows
    pub coarse_size: usize,
}

impl Default for AmgOptions {
    fn default() -> Self {
        Self {
            levels: 4,
            smoothing_steps: 2,
            theta: 0.08,
            omega: 2.0 / 3.0,
            coarse_size: 8,
        }
    }
}

impl AmgOptions {
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }
    pub fn with_smoothing_steps(mut self, steps: usize) -> Self {
        self.smoothing_steps = steps;
        self
    }
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }
}
