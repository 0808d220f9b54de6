//! Householder QR.

use crate::core::traits::Scalar;
use crate::matrix::DenseMatrix;
use tracing::debug;

/// `A = Q·R` with `Q` orthogonal (m×m) and `R` upper triangular (m×n).
#[derive(Clone, Debug)]
pub struct Qr<T> {
    pub q: DenseMatrix<T>,
    pub r: DenseMatrix<T>,
}

fn sign<T: Scalar>(x: T) -> T {
    if x >= T::zero() { T::one() } else { -T::one() }
}

/// Householder QR. Each reflector acts on the sub-column `R[i.., i]`:
/// `v = x + sign(x₀)‖x‖e₀`, `H = I − 2vvᵀ/vᵀv`, then `R ← H·R` and
/// `Q ← Q·Hᵀ`. A sub-column that is already zero is skipped.
pub fn qr<T: Scalar>(a: &DenseMatrix<T>) -> Qr<T> {
    let (m, n) = (a.nrows(), a.ncols());
    let mut r = a.clone();
    let mut q = DenseMatrix::identity(m);
    let two = T::lit(2.0);

    for i in 0..m.min(n) {
        let mut v: Vec<T> = (i..m).map(|k| r[(k, i)]).collect();
        let norm = v.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt();
        if norm == T::zero() {
            continue;
        }
        let alpha = sign(v[0]) * norm;
        v[0] = v[0] + alpha;
        let vtv = v.iter().fold(T::zero(), |acc, &x| acc + x * x);

        for j in i..n {
            let s = v.iter().enumerate().fold(T::zero(), |acc, (k, &vk)| acc + vk * r[(i + k, j)]);
            let f = two * s / vtv;
            for (k, &vk) in v.iter().enumerate() {
                r[(i + k, j)] = r[(i + k, j)] - f * vk;
            }
        }
        // The reflector maps the sub-column onto -alpha·e₀ exactly.
        r[(i, i)] = -alpha;
        for k in (i + 1)..m {
            r[(k, i)] = T::zero();
        }

        for p in 0..m {
            let s = v.iter().enumerate().fold(T::zero(), |acc, (k, &vk)| acc + q[(p, i + k)] * vk);
            let f = two * s / vtv;
            for (k, &vk) in v.iter().enumerate() {
                q[(p, i + k)] = q[(p, i + k)] - f * vk;
            }
        }
    }
    debug!(rows = m, cols = n, "Householder QR complete");
    Qr { q, r }
}
