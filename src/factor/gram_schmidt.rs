//! Classical Gram–Schmidt orthogonalization.

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::matrix::Vector;

/// `u − (u·v / v·v)·v`; `u` is returned unchanged when `v` is zero.
pub fn sub_projection<T: Scalar>(u: &Vector<T>, v: &Vector<T>) -> Vector<T> {
    let vv = v.dot(v);
    if vv == T::zero() {
        return u.clone();
    }
    let mut out = u.clone();
    out.axpy(-(u.dot(v) / vv), v);
    out
}

/// Orthonormalize `columns` in order.
///
/// A zero column comes out as the zero vector, so the result is only
/// orthonormal for independent input.
pub fn gram_schmidt<T: Scalar>(columns: &[Vector<T>]) -> Result<Vec<Vector<T>>, KError> {
    let Some(first) = columns.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();
    if columns.iter().any(|c| c.len() != n) {
        return Err(KError::InvalidArgument("Gram-Schmidt columns differ in length".into()));
    }
    let mut out: Vec<Vector<T>> = Vec::with_capacity(columns.len());
    for a in columns {
        let mut u = a.clone();
        for q in &out {
            u.axpy(-a.dot(q), q);
        }
        u.normalize();
        out.push(u);
    }
    Ok(out)
}
