//! Dense containers: matrix-vector and matrix-matrix products, transpose,
//! inner products, checked against faer on seeded random data.

use approx::assert_abs_diff_eq;
use faer::Mat;
use krylov_kit::core::traits::{InnerProduct, MatVec};
use krylov_kit::matrix::{DenseMatrix, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_dense(rng: &mut StdRng, m: usize, n: usize) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0))
}

#[test]
fn matvec_matches_manual_sum() {
    let mut rng = StdRng::seed_from_u64(7);
    let a = random_dense(&mut rng, 5, 4);
    let x = Vector::from_fn(4, |_| rng.gen_range(-1.0..1.0));
    let mut y = Vector::zeros(5);
    a.matvec(&x, &mut y);
    for i in 0..5 {
        let expected: f64 = (0..4).map(|j| a[(i, j)] * x[j]).sum();
        assert_abs_diff_eq!(y[i], expected, epsilon = 1e-12);
    }
    // Same product through the faer wrapper.
    let mut y2 = Vector::zeros(5);
    a.as_faer().matvec(&x, &mut y2);
    for i in 0..5 {
        assert_abs_diff_eq!(y[i], y2[i], epsilon = 1e-14);
    }
}

#[test]
fn matmul_agrees_with_faer() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_dense(&mut rng, 4, 6);
    let b = random_dense(&mut rng, 6, 3);
    let c = a.matmul(&b).unwrap();
    let reference: Mat<f64> = a.as_faer() * b.as_faer();
    for i in 0..4 {
        for j in 0..3 {
            assert_abs_diff_eq!(c[(i, j)], reference[(i, j)], epsilon = 1e-12);
        }
    }
    assert!(a.matmul(&a).is_err());
}

#[test]
fn transpose_is_an_involution() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = random_dense(&mut rng, 3, 7);
    let at = a.transpose();
    assert_eq!(at.nrows(), 7);
    assert_eq!(at[(5, 2)], a[(2, 5)]);
    assert_eq!(at.transpose().max_abs_diff(&a), 0.0);
}

#[test]
fn dot_and_norm() {
    let x = Vector::from_vec(vec![1.0, 2.0, 3.0]);
    let y = Vector::from_vec(vec![4.0, -5.0, 6.0]);
    let ip = ();
    assert_abs_diff_eq!(ip.dot(&x, &y), 12.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ip.norm(&x), 14.0f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn element_access_is_bounds_checked() {
    let mut a = DenseMatrix::<f64>::zeros(2, 2);
    a.set(1, 0, 3.0).unwrap();
    assert_eq!(a.get(1, 0).unwrap(), 3.0);
    assert!(a.get(2, 0).is_err());
    assert!(a.set(0, 2, 1.0).is_err());
    a.swap_rows(0, 1).unwrap();
    assert_eq!(a.row(0).unwrap().as_slice(), &[3.0, 0.0]);
    assert_eq!(a.column(0).unwrap().as_slice(), &[3.0, 0.0]);
}
