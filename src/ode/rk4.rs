//! Classical fourth-order Runge–Kutta.
//!
//! The right-hand side is supplied as `f(y, dy)`, writing `dy/dt` into the
//! pre-sized `dy`. Stage vectors live in the integrator and are reused
//! across steps and calls.
//!
//! Adaptive integration uses step doubling: one step of size `h` is
//! compared with two steps of size `h/2`, the error is
//! `‖y_half − y_full‖ / max(‖y_half‖, 1)`, and the more accurate `y_half`
//! is kept when the error is within tolerance. After every attempt the step
//! is rescaled by `clip(safety · (tol/err)^p, min_scale, max_scale)` with
//! `p = 0.2` after an acceptance and `p = 0.25` after a rejection.

use crate::config::options::AdaptiveOptions;
use crate::core::traits::Scalar;
use crate::error::KError;
use crate::matrix::Vector;
use tracing::{debug, trace, warn};

/// Attempts (accepted plus rejected) allowed per requested step.
const MAX_ATTEMPTS_PER_STEP: usize = 100;

/// Outcome of [`RungeKutta::solve_adaptive`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveStats<T> {
    /// Accepted steps
    pub accepted: usize,
    /// Rejected attempts
    pub rejected: usize,
    /// Time reached, starting from zero
    pub t: T,
    /// Step size proposed for the next step
    pub h: T,
}

#[derive(Clone, Debug, Default)]
pub struct RungeKutta<T> {
    k1: Vector<T>,
    k2: Vector<T>,
    k3: Vector<T>,
    k4: Vector<T>,
    temp: Vector<T>,
}

fn validate<T: Scalar>(y: &Vector<T>, h: T, n: usize) -> Result<(), KError> {
    if y.is_empty() {
        return Err(KError::InvalidArgument("state vector must not be empty".into()));
    }
    if !(h > T::zero()) {
        return Err(KError::InvalidArgument(format!("step size must be positive, got {h}")));
    }
    if n == 0 {
        return Err(KError::InvalidArgument("number of steps must be positive".into()));
    }
    Ok(())
}

impl<T: Scalar> RungeKutta<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, n: usize) {
        if self.k1.len() != n {
            self.k1 = Vector::zeros(n);
            self.k2 = Vector::zeros(n);
            self.k3 = Vector::zeros(n);
            self.k4 = Vector::zeros(n);
            self.temp = Vector::zeros(n);
        }
    }

    /// One RK4 step of size `h`; scratch must already match `y`.
    fn step<F>(&mut self, y: &mut Vector<T>, f: &mut F, h: T)
    where
        F: FnMut(&Vector<T>, &mut Vector<T>),
    {
        let half = h * T::lit(0.5);
        let two = T::lit(2.0);
        let sixth = h / T::lit(6.0);

        f(&*y, &mut self.k1);
        stage(&mut self.temp, y, &self.k1, half);
        f(&self.temp, &mut self.k2);
        stage(&mut self.temp, y, &self.k2, half);
        f(&self.temp, &mut self.k3);
        stage(&mut self.temp, y, &self.k3, h);
        f(&self.temp, &mut self.k4);

        for i in 0..y.len() {
            y[i] = y[i] + sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }
    }

    /// Take `n` fixed steps of size `h`, updating `y` in place.
    ///
    /// `callback`, if given, sees `(i, y)` after step `i` (0-based).
    pub fn solve<F>(
        &mut self,
        y: &mut Vector<T>,
        mut f: F,
        h: T,
        n: usize,
        mut callback: Option<&mut dyn FnMut(usize, &Vector<T>)>,
    ) -> Result<(), KError>
    where
        F: FnMut(&Vector<T>, &mut Vector<T>),
    {
        validate(y, h, n)?;
        self.prepare(y.len());
        for i in 0..n {
            self.step(y, &mut f, h);
            if let Some(cb) = callback.as_mut() {
                cb(i, &*y);
            }
        }
        Ok(())
    }

    /// Integrate with step-doubling error control.
    ///
    /// Without a horizon, exactly `max_steps` steps are accepted. With
    /// `options.horizon = Some(t_end)` integration stops once `t_end` is
    /// reached (the last step is shortened to land on it) and fails with
    /// [`KError::NotConverged`] if `max_steps` accepted steps fall short.
    /// A step size too small to advance `t` fails with [`KError::Numerical`].
    /// More than `100 · max_steps` attempts in total fail with
    /// [`KError::NotConverged`] carrying the last error estimate.
    pub fn solve_adaptive<F>(
        &mut self,
        y: &mut Vector<T>,
        mut f: F,
        h: T,
        tol: T,
        max_steps: usize,
        options: &AdaptiveOptions<T>,
    ) -> Result<AdaptiveStats<T>, KError>
    where
        F: FnMut(&Vector<T>, &mut Vector<T>),
    {
        validate(y, h, max_steps)?;
        if !(tol > T::zero()) {
            return Err(KError::InvalidArgument(format!("tolerance must be positive, got {tol}")));
        }
        if !(options.min_scale > T::zero() && options.min_scale <= options.max_scale && options.safety > T::zero()) {
            return Err(KError::InvalidArgument("invalid step scale bounds or safety factor".into()));
        }
        if let Some(end) = options.horizon {
            if !(end > T::zero()) {
                return Err(KError::InvalidArgument(format!("horizon must be positive, got {end}")));
            }
        }
        self.prepare(y.len());
        debug!(n = y.len(), h = %h, tol = %tol, max_steps, "adaptive RK4 start");

        let mut stats = AdaptiveStats { accepted: 0, rejected: 0, t: T::zero(), h };
        let mut y_full = y.clone();
        let mut y_half = y.clone();
        let max_attempts = max_steps.saturating_mul(MAX_ATTEMPTS_PER_STEP);
        let mut last_err = T::zero();
        loop {
            if options.horizon.is_some_and(|end| stats.t >= end) || stats.accepted == max_steps {
                break;
            }
            let (h_try, lands) = match options.horizon {
                Some(end) if stats.t + stats.h >= end => (end - stats.t, true),
                _ => (stats.h, false),
            };
            if !(h_try > T::zero()) || stats.t + h_try == stats.t {
                warn!(t = %stats.t, h = %h_try, "adaptive RK4 step size underflow");
                return Err(KError::Numerical(format!("step size underflow at t = {}", stats.t)));
            }
            if stats.accepted + stats.rejected >= max_attempts {
                warn!(t = %stats.t, rejected = stats.rejected, err = %last_err, "adaptive RK4 exhausted its attempts");
                return Err(KError::not_converged(stats.accepted, last_err));
            }

            y_full.clone_from(y);
            self.step(&mut y_full, &mut f, h_try);
            y_half.clone_from(y);
            let half = h_try * T::lit(0.5);
            self.step(&mut y_half, &mut f, half);
            self.step(&mut y_half, &mut f, half);

            let err = (&y_half - &y_full).l2_norm() / y_half.l2_norm().max(T::one());
            last_err = err;
            let accepted = err <= tol;
            let p = if accepted {
                std::mem::swap(y, &mut y_half);
                stats.t = if lands { options.horizon.unwrap_or(stats.t + h_try) } else { stats.t + h_try };
                stats.accepted += 1;
                T::lit(0.2)
            } else {
                stats.rejected += 1;
                T::lit(0.25)
            };
            let scale = if err == T::zero() {
                options.max_scale
            } else {
                (options.safety * (tol / err).powf(p)).max(options.min_scale).min(options.max_scale)
            };
            stats.h = h_try * scale;
            trace!(t = %stats.t, err = %err, accepted, next_h = %stats.h, "adaptive RK4 attempt");
        }

        if let Some(end) = options.horizon {
            if stats.t < end {
                warn!(t = %stats.t, horizon = %end, max_steps, "adaptive RK4 ran out of steps");
                return Err(KError::not_converged(stats.accepted, end - stats.t));
            }
        }
        debug!(accepted = stats.accepted, rejected = stats.rejected, t = %stats.t, "adaptive RK4 done");
        Ok(stats)
    }
}

/// `out = y + a·k`.
fn stage<T: Scalar>(out: &mut Vector<T>, y: &Vector<T>, k: &Vector<T>, a: T) {
    for i in 0..y.len() {
        out[i] = y[i] + a * k[i];
    }
}
