//! Gauss–Legendre quadrature.
//!
//! The `n` nodes are the roots of the Legendre polynomial `Pₙ`, found by
//! Newton's method from the estimate `cos(π(i + 3/4)/(n + 1/2))`. Weights
//! are `2 / ((1 − x²) Pₙ'(x)²)`. An `n`-point rule is exact for
//! polynomials of degree `2n − 1` on `[-1, 1]`.

use crate::core::traits::Scalar;
use crate::error::KError;
use tracing::debug;

const MAX_NEWTON_ITERS: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct GaussQuadrature<T> {
    points: Vec<T>,
    weights: Vec<T>,
}

/// `(Pₙ(x), Pₙ'(x))` by the three-term recurrence.
fn legendre<T: Scalar>(n: usize, x: T) -> (T, T) {
    let mut p_prev = T::one();
    let mut p = x;
    for k in 2..=n {
        let kf = T::lit(k as f64);
        let next = ((T::lit(2.0) * kf - T::one()) * x * p - (kf - T::one()) * p_prev) / kf;
        p_prev = p;
        p = next;
    }
    let dp = T::lit(n as f64) * (x * p - p_prev) / (x * x - T::one());
    (p, dp)
}

impl<T: Scalar> GaussQuadrature<T> {
    /// Build the `n`-point rule on `[-1, 1]`, nodes ascending.
    pub fn new(n: usize) -> Result<Self, KError> {
        if n == 0 {
            return Err(KError::InvalidArgument("quadrature needs at least one point".into()));
        }
        let mut points = vec![T::zero(); n];
        let mut weights = vec![T::zero(); n];
        let pi = T::lit(std::f64::consts::PI);
        // Quadratic convergence: once |dx| is this small the update is exact to rounding.
        let eps = T::epsilon() * T::lit(64.0);

        // Roots come in ± pairs; solve for the non-negative half only.
        for i in 0..(n + 1) / 2 {
            let mut x = (pi * T::lit(i as f64 + 0.75) / T::lit(n as f64 + 0.5)).cos();
            let mut converged = false;
            for _ in 0..MAX_NEWTON_ITERS {
                let (p, dp) = legendre(n, x);
                let dx = p / dp;
                x = x - dx;
                if dx.abs() <= eps {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(KError::Numerical(format!("Legendre root {i} of P_{n} did not converge")));
            }
            let (_, dp) = legendre(n, x);
            let w = T::lit(2.0) / ((T::one() - x * x) * dp * dp);
            points[i] = -x;
            points[n - 1 - i] = x;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }
        debug!(n, "Gauss-Legendre rule built");
        Ok(Self { points, weights })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Nodes on `[-1, 1]`.
    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// `∫ₐᵇ f(x) dx`, mapping the nodes affinely onto `[a, b]`.
    pub fn integrate<F>(&self, mut f: F, a: T, b: T) -> T
    where
        F: FnMut(T) -> T,
    {
        let half = (b - a) * T::lit(0.5);
        let mid = (a + b) * T::lit(0.5);
        let sum = self
            .points
            .iter()
            .zip(&self.weights)
            .fold(T::zero(), |acc, (&x, &w)| acc + w * f(half * x + mid));
        half * sum
    }
}
