use krylov_kit::context::{KspContext, PcKind, SolverKind};
use krylov_kit::matrix::{CscMatrix, Vector};
use krylov_kit::{AmgOptions, KspOptions};

fn main() {
    // 2D Poisson on a 32x32 grid
    let m = 32;
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
    println!("assembled {}x{} matrix with {} non-zeros", n, n, a.nnz());

    let b = Vector::from_fn(n, |_| 1.0);
    let pcs = [PcKind::None, PcKind::Jacobi, PcKind::Ilu, PcKind::Amg(AmgOptions::default())];
    for kind in [SolverKind::Cg, SolverKind::Gmres] {
        for pc in pcs.iter().cloned() {
            let options = KspOptions::default().with_kind(kind).with_pc(pc.clone()).with_tol(1e-8);
            let mut ksp = KspContext::new(a.clone(), options).unwrap();
            let mut x = Vector::zeros(n);
            match ksp.solve(&b, &mut x) {
                Ok(stats) => println!(
                    "{kind:?} + {pc:?}: {} iterations, residual {:e}",
                    stats.iterations, stats.final_residual
                ),
                Err(e) => println!("{kind:?} + {pc:?}: {e}"),
            }
        }
    }
}
