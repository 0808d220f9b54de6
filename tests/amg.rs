//! Algebraic multigrid as a CG preconditioner on the 2D Poisson problem.

use krylov_kit::config::{AmgOptions, KspOptions};
use krylov_kit::context::{KspContext, PcKind, SolverKind};
use krylov_kit::matrix::{CscMatrix, Vector};
use krylov_kit::preconditioner::AlgebraicMultiGrid;
use krylov_kit::solver::{CgSolver, LinearSolver};

/// Five-point Laplacian on an `m×m` grid.
fn poisson_2d(m: usize) -> CscMatrix<f64> {
    let n = m * m;
    let mut a = CscMatrix::new(n, n);
    for gy in 0..m {
        for gx in 0..m {
            let i = gy * m + gx;
            a.add_value(i, i, 4.0).unwrap();
            if gx > 0 {
                a.add_value(i, i - 1, -1.0).unwrap();
            }
            if gx + 1 < m {
                a.add_value(i, i + 1, -1.0).unwrap();
            }
            if gy > 0 {
                a.add_value(i, i - m, -1.0).unwrap();
            }
            if gy + 1 < m {
                a.add_value(i, i + m, -1.0).unwrap();
            }
        }
    }
    a.finalize();
    a
}

#[test]
fn amg_preconditioning_cuts_cg_iterations() {
    let a = poisson_2d(16);
    let n = a.nrows();
    let b = Vector::from_fn(n, |i| ((i % 7) as f64) - 3.0);

    let mut x_plain = Vector::zeros(n);
    let plain = CgSolver::new(1e-8, 1000).solve(&a, None, &b, &mut x_plain).unwrap();

    let amg = AlgebraicMultiGrid::new(&a, AmgOptions::default()).unwrap();
    assert!(amg.num_levels() > 1);
    let mut x_amg = Vector::zeros(n);
    let pre = CgSolver::new(1e-8, 1000).solve(&a, Some(&amg), &b, &mut x_amg).unwrap();

    assert!(pre.converged);
    assert!(pre.iterations < plain.iterations, "{} vs {}", pre.iterations, plain.iterations);
    let r = &b - &a.mul_vec(&x_amg).unwrap();
    assert!(r.l2_norm() <= 1e-8);
}

#[test]
fn context_builds_amg_from_options() {
    let a = poisson_2d(10);
    let n = a.nrows();
    let b = Vector::from_fn(n, |_| 1.0);
    let options = KspOptions::default()
        .with_kind(SolverKind::Cg)
        .with_pc(PcKind::Amg(AmgOptions::default().with_levels(3)))
        .with_tol(1e-10);
    let mut ksp = KspContext::new(a, options).unwrap();
    let mut x = Vector::zeros(n);
    let stats = ksp.solve(&b, &mut x).unwrap();
    assert!(stats.converged);
    let r = &b - &ksp.matrix().mul_vec(&x).unwrap();
    assert!(r.l2_norm() <= 1e-10);
}

#[test]
fn amg_is_accepted_by_name() {
    assert!(matches!("amg".parse::<PcKind>().unwrap(), PcKind::Amg(_)));
}
