//! Convergence order and step control of the RK4 integrator.

use approx::assert_abs_diff_eq;
use krylov_kit::config::AdaptiveOptions;
use krylov_kit::matrix::Vector;
use krylov_kit::ode::RungeKutta;
use krylov_kit::KError;

fn decay(y: &Vector<f64>, dy: &mut Vector<f64>) {
    dy[0] = -y[0];
}

fn oscillator(y: &Vector<f64>, dy: &mut Vector<f64>) {
    dy[0] = y[1];
    dy[1] = -y[0];
}

fn decay_error(h: f64, steps: usize) -> f64 {
    let mut y = Vector::from_vec(vec![1.0]);
    RungeKutta::new().solve(&mut y, decay, h, steps, None).unwrap();
    (y[0] - (-(h * steps as f64)).exp()).abs()
}

#[test]
fn fixed_step_error_is_fourth_order() {
    let coarse = decay_error(0.1, 10);
    let fine = decay_error(0.05, 20);
    let ratio = coarse / fine;
    assert!(ratio > 14.0 && ratio < 18.0, "ratio = {ratio}");
}

#[test]
fn oscillator_stays_on_the_circle() {
    let mut y = Vector::from_vec(vec![1.0, 0.0]);
    let mut radii = Vec::new();
    let mut record = |_: usize, y: &Vector<f64>| radii.push(y.l2_norm());
    let steps = 628;
    RungeKutta::new().solve(&mut y, oscillator, 0.01, steps, Some(&mut record)).unwrap();
    assert_eq!(radii.len(), steps);
    assert!(radii.iter().all(|r| (r - 1.0).abs() < 1e-8));
    assert_abs_diff_eq!(y[0], 6.28f64.cos(), epsilon = 1e-8);
}

#[test]
fn adaptive_reaches_horizon_within_tolerance() {
    let mut y = Vector::from_vec(vec![1.0, 0.0]);
    let opts = AdaptiveOptions::default().with_horizon(3.0);
    let stats = RungeKutta::new().solve_adaptive(&mut y, oscillator, 0.5, 1e-10, 100_000, &opts).unwrap();
    assert_eq!(stats.t, 3.0);
    assert!(stats.accepted > 1);
    assert_abs_diff_eq!(y[0], 3.0f64.cos(), epsilon = 1e-7);
    assert_abs_diff_eq!(y[1], -3.0f64.sin(), epsilon = 1e-7);
}

#[test]
fn accepted_steps_are_monotone_in_budget() {
    let opts = AdaptiveOptions::default().with_horizon(5.0);
    let accepted = |max_steps: usize| {
        let mut y = Vector::from_vec(vec![1.0]);
        match RungeKutta::new().solve_adaptive(&mut y, decay, 0.01, 1e-9, max_steps, &opts) {
            Ok(stats) => stats.accepted,
            Err(KError::NotConverged { iterations, .. }) => iterations,
            Err(e) => panic!("unexpected error: {e}"),
        }
    };
    let counts: Vec<usize> = [1, 2, 5, 10, 50, 1000].into_iter().map(accepted).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    assert_eq!(counts[0], 1);
}

#[test]
fn large_initial_step_is_rejected_then_shrunk() {
    let mut y = Vector::from_vec(vec![1.0]);
    let stats = RungeKutta::new()
        .solve_adaptive(&mut y, decay, 4.0, 1e-10, 3, &AdaptiveOptions::default())
        .unwrap();
    assert!(stats.rejected > 0);
    assert_eq!(stats.accepted, 3);
    assert_abs_diff_eq!(y[0], (-stats.t).exp(), epsilon = 1e-9);
}
