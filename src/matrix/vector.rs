//! Owned dense vector.
//!
//! Length is fixed at construction. Elementwise operators on vectors of
//! different lengths are programming errors and panic, the same way the
//! `MatVec` implementations assert their shapes.

use crate::core::traits::Scalar;
use crate::error::KError;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    /// All-zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self { data: vec![T::zero(); n] }
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn from_fn(n: usize, f: impl FnMut(usize) -> T) -> Self {
        Self { data: (0..n).map(f).collect() }
    }

    /// Standard basis vector `e_i` of length `n`.
    pub fn unit(i: usize, n: usize) -> Self {
        let mut v = Self::zeros(n);
        v.data[i] = T::one();
        v
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Checked read.
    pub fn get(&self, i: usize) -> Result<T, KError> {
        self.data.get(i).copied().ok_or_else(|| KError::OutOfRange {
            row: i,
            col: 0,
            nrows: self.len(),
            ncols: 1,
        })
    }

    /// Checked write.
    pub fn set(&mut self, i: usize, value: T) -> Result<(), KError> {
        let n = self.len();
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(KError::OutOfRange { row: i, col: 0, nrows: n, ncols: 1 }),
        }
    }

    /// `u · v`.
    pub fn dot(&self, other: &Self) -> T {
        assert_eq!(self.len(), other.len(), "Vectors must have the same length");
        self.data
            .iter()
            .zip(&other.data)
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    pub fn l2_norm(&self) -> T {
        self.dot(self).sqrt()
    }

    /// Scale to unit length; the zero vector is left untouched.
    pub fn normalize(&mut self) {
        let norm = self.l2_norm();
        if norm == T::zero() {
            return;
        }
        for v in &mut self.data {
            *v = *v / norm;
        }
    }

    /// `self ← self + alpha · x`.
    pub fn axpy(&mut self, alpha: T, x: &Self) {
        assert_eq!(self.len(), x.len(), "Vectors must have the same length");
        for (yi, &xi) in self.data.iter_mut().zip(&x.data) {
            *yi = *yi + alpha * xi;
        }
    }

    pub fn scale(&mut self, alpha: T) {
        for v in &mut self.data {
            *v = *v * alpha;
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T> AsMut<[T]> for Vector<T> {
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T: Scalar> Add for &Vector<T> {
    type Output = Vector<T>;
    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        assert_eq!(self.len(), rhs.len(), "Vectors must have the same length");
        Vector::from_fn(self.len(), |i| self.data[i] + rhs.data[i])
    }
}

impl<T: Scalar> Sub for &Vector<T> {
    type Output = Vector<T>;
    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        assert_eq!(self.len(), rhs.len(), "Vectors must have the same length");
        Vector::from_fn(self.len(), |i| self.data[i] - rhs.data[i])
    }
}

impl<T: Scalar> Add for Vector<T> {
    type Output = Vector<T>;
    fn add(self, rhs: Vector<T>) -> Vector<T> {
        &self + &rhs
    }
}

impl<T: Scalar> Sub for Vector<T> {
    type Output = Vector<T>;
    fn sub(self, rhs: Vector<T>) -> Vector<T> {
        &self - &rhs
    }
}

impl<T: Scalar> AddAssign<&Vector<T>> for Vector<T> {
    fn add_assign(&mut self, rhs: &Vector<T>) {
        self.axpy(T::one(), rhs);
    }
}

impl<T: Scalar> SubAssign<&Vector<T>> for Vector<T> {
    fn sub_assign(&mut self, rhs: &Vector<T>) {
        self.axpy(-T::one(), rhs);
    }
}

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;
    fn mul(self, alpha: T) -> Vector<T> {
        Vector::from_fn(self.len(), |i| self.data[i] * alpha)
    }
}

impl<T: Scalar> Mul<T> for Vector<T> {
    type Output = Vector<T>;
    fn mul(mut self, alpha: T) -> Vector<T> {
        self.scale(alpha);
        self
    }
}

impl<T: Scalar> Neg for &Vector<T> {
    type Output = Vector<T>;
    fn neg(self) -> Vector<T> {
        self * -T::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_leaves_zero_vector_alone() {
        let mut z = Vector::<f64>::zeros(3);
        z.normalize();
        assert_eq!(z.as_slice(), &[0.0, 0.0, 0.0]);

        let mut v = Vector::<f64>::from_vec(vec![3.0, 0.0, 4.0]);
        v.normalize();
        assert!((v.l2_norm() - 1.0).abs() < 1e-15);
        assert_eq!(v[0], 0.6);
    }

    #[test]
    fn checked_access_reports_out_of_range() {
        let mut v = Vector::<f64>::zeros(2);
        assert!(v.set(1, 4.0).is_ok());
        assert_eq!(v.get(1).unwrap(), 4.0);
        assert!(matches!(v.get(2), Err(KError::OutOfRange { row: 2, .. })));
        assert!(v.set(5, 1.0).is_err());
    }

    #[test]
    fn arithmetic_operators() {
        let u = Vector::from_vec(vec![1.0, 2.0]);
        let v = Vector::from_vec(vec![3.0, -1.0]);
        assert_eq!((&u + &v).as_slice(), &[4.0, 1.0]);
        assert_eq!((&u - &v).as_slice(), &[-2.0, 3.0]);
        assert_eq!((&u * 2.0).as_slice(), &[2.0, 4.0]);
        assert_eq!(u.dot(&v), 1.0);
        let mut w = u.clone();
        w.axpy(2.0, &v);
        assert_eq!(w.as_slice(), &[7.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn mismatched_lengths_panic() {
        let u = Vector::<f64>::zeros(2);
        let v = Vector::<f64>::zeros(3);
        let _ = u.dot(&v);
    }
}
