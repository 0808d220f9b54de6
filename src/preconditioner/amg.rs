//! Aggregation-based algebraic multigrid over CSC matrices.
//!
//! Setup repeatedly coarsens the operator:
//!
//! 1. strong couplings `|a_ij| / sqrt(|a_ii a_jj|) > θ`,
//! 2. pairwise aggregation (each unvisited row joins its strongest
//!    unvisited neighbour, or stays a singleton),
//! 3. piecewise-constant prolongation `P`, restriction `R = Pᵀ`,
//! 4. Galerkin coarse operator `A_c = Pᵀ A P`.
//!
//! Coarsening stops at the level limit, once a level is small enough, or
//! when aggregation no longer reduces the size. The coarsest operator is
//! factored with pivoted LU. A V-cycle smooths with damped Jacobi before
//! and after the coarse-grid correction.

use crate::config::options::AmgOptions;
use crate::core::traits::{Diagonal, MatVec, Scalar};
use crate::error::KError;
use crate::factor::lu::LuFactors;
use crate::matrix::{CscMatrix, Vector};
use crate::preconditioner::Preconditioner;
use tracing::{debug, trace};

struct AmgLevel<T> {
    a: CscMatrix<T>,
    inv_diag: Vec<T>,
    interpolation: CscMatrix<T>,
    restriction: CscMatrix<T>,
}

/// Level hierarchy plus coarse LU; applies one V-cycle as a preconditioner.
pub struct AlgebraicMultiGrid<T> {
    levels: Vec<AmgLevel<T>>,
    coarse: LuFactors<T>,
    options: AmgOptions,
    omega: T,
}

pub type AmgPreconditioner<T> = AlgebraicMultiGrid<T>;

impl<T: Scalar> AlgebraicMultiGrid<T> {
    /// Build the level hierarchy for `a`.
    pub fn new(a: &CscMatrix<T>, options: AmgOptions) -> Result<Self, KError> {
        if !a.is_finalized() {
            return Err(KError::Unfinalized);
        }
        if a.nrows() != a.ncols() {
            return Err(KError::InvalidArgument(format!(
                "AMG needs a square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if options.levels == 0 {
            return Err(KError::InvalidArgument("AMG needs at least one level".into()));
        }
        let theta = T::lit(options.theta);
        let mut levels = Vec::new();
        let mut current = a.clone();
        while levels.len() + 1 < options.levels && current.nrows() > options.coarse_size {
            let n = current.nrows();
            let (aggregates, n_coarse) = pairwise_aggregation(&current, theta);
            if n_coarse >= n {
                trace!(n, "aggregation stalled, stopping coarsening");
                break;
            }
            let interpolation = construct_prolongation(&aggregates, n_coarse)?;
            let restriction = interpolation.transpose()?;
            let coarse = restriction.matmul(&current)?.matmul(&interpolation)?;
            trace!(level = levels.len(), fine = n, coarse = n_coarse, "AMG level built");
            levels.push(AmgLevel {
                inv_diag: inverse_diagonal(&current)?,
                a: current,
                interpolation,
                restriction,
            });
            current = coarse;
        }
        debug!(levels = levels.len() + 1, coarsest = current.nrows(), "AMG hierarchy ready");
        let coarse = LuFactors::factor(&current.to_dense())?;
        Ok(Self {
            levels,
            coarse,
            omega: T::lit(options.omega),
            options,
        })
    }

    /// Number of levels, coarsest included.
    pub fn num_levels(&self) -> usize {
        self.levels.len() + 1
    }

    /// One V-cycle for `A·x = b`, improving `x` in place.
    pub fn vcycle(&self, b: &Vector<T>, x: &mut Vector<T>) -> Result<(), KError> {
        let n = self.levels.first().map_or(self.coarse.permutation().len(), |l| l.a.nrows());
        if b.len() != n || x.len() != n {
            return Err(KError::InvalidArgument(format!(
                "AMG hierarchy has {} unknowns, got b of length {} and x of length {}",
                n,
                b.len(),
                x.len()
            )));
        }
        self.cycle(0, b, x)
    }

    /// Build a hierarchy for `a` and run a single V-cycle on `x`.
    pub fn amg_vcycle(
        a: &CscMatrix<T>,
        b: &Vector<T>,
        x: &mut Vector<T>,
        levels: usize,
        smoothing_steps: usize,
        theta: f64,
    ) -> Result<(), KError> {
        let options = AmgOptions::default()
            .with_levels(levels)
            .with_smoothing_steps(smoothing_steps)
            .with_theta(theta);
        Self::new(a, options)?.vcycle(b, x)
    }

    fn cycle(&self, level: usize, b: &Vector<T>, x: &mut Vector<T>) -> Result<(), KError> {
        let Some(lvl) = self.levels.get(level) else {
            *x = self.coarse.solve(b)?;
            return Ok(());
        };
        self.smooth(lvl, b, x);

        let mut ax = Vector::zeros(b.len());
        lvl.a.matvec(x, &mut ax);
        let residual = b - &ax;
        let coarse_rhs = lvl.restriction.mul_vec(&residual)?;
        let mut coarse_x = Vector::zeros(coarse_rhs.len());
        self.cycle(level + 1, &coarse_rhs, &mut coarse_x)?;
        let correction = lvl.interpolation.mul_vec(&coarse_x)?;
        *x += &correction;

        self.smooth(lvl, b, x);
        Ok(())
    }

    /// Damped Jacobi: `x ← x + ω D⁻¹ (b − A x)`.
    fn smooth(&self, lvl: &AmgLevel<T>, b: &Vector<T>, x: &mut Vector<T>) {
        let mut ax = Vector::zeros(b.len());
        for _ in 0..self.options.smoothing_steps {
            lvl.a.matvec(x, &mut ax);
            for i in 0..x.len() {
                x[i] = x[i] + self.omega * lvl.inv_diag[i] * (b[i] - ax[i]);
            }
        }
    }
}

impl<T: Scalar> Preconditioner<CscMatrix<T>, Vector<T>> for AlgebraicMultiGrid<T> {
    /// One V-cycle from a zero initial guess.
    fn apply(&self, r: &Vector<T>, z: &mut Vector<T>) -> Result<(), KError> {
        z.fill(T::zero());
        self.vcycle(r, z)
    }

    fn setup(&mut self, a: &CscMatrix<T>) -> Result<(), KError> {
        *self = Self::new(a, self.options)?;
        Ok(())
    }
}

fn inverse_diagonal<T: Scalar>(a: &CscMatrix<T>) -> Result<Vec<T>, KError> {
    a.diagonal()
        .into_iter()
        .enumerate()
        .map(|(i, d)| if d == T::zero() { Err(KError::ZeroPivot(i)) } else { Ok(T::one() / d) })
        .collect()
}

/// Aggregate id per row and the number of aggregates.
fn pairwise_aggregation<T: Scalar>(a: &CscMatrix<T>, theta: T) -> (Vec<usize>, usize) {
    let n = a.nrows();
    let diag: Vec<T> = a.diagonal().into_iter().map(|d| d.abs()).collect();
    let mut aggregates = vec![usize::MAX; n];
    let mut aggregate_id = 0;

    for i in 0..n {
        if aggregates[i] != usize::MAX {
            continue;
        }
        // Column i holds a_ki; for the symmetric operators AMG targets this
        // is row i as well.
        let mut strongest: Option<(usize, T)> = None;
        for (k, v) in a.column(i) {
            if k == i || aggregates[k] != usize::MAX {
                continue;
            }
            let scale = (diag[i] * diag[k]).sqrt();
            if scale == T::zero() {
                continue;
            }
            let strength = v.abs() / scale;
            if strength > theta && strongest.is_none_or(|(_, s)| strength > s) {
                strongest = Some((k, strength));
            }
        }
        aggregates[i] = aggregate_id;
        if let Some((k, _)) = strongest {
            aggregates[k] = aggregate_id;
        }
        aggregate_id += 1;
    }
    (aggregates, aggregate_id)
}

/// `P(i, aggregates[i]) = 1`.
fn construct_prolongation<T: Scalar>(aggregates: &[usize], n_coarse: usize) -> Result<CscMatrix<T>, KError> {
    let mut p = CscMatrix::new(aggregates.len(), n_coarse);
    for (i, &agg) in aggregates.iter().enumerate() {
        p.add_value(i, agg, T::one())?;
    }
    p.finalize();
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poisson_1d(n: usize) -> CscMatrix<f64> {
        let mut a = CscMatrix::new(n, n);
        for i in 0..n {
            a.add_value(i, i, 2.0).unwrap();
            if i > 0 {
                a.add_value(i, i - 1, -1.0).unwrap();
                a.add_value(i - 1, i, -1.0).unwrap();
            }
        }
        a.finalize();
        a
    }

    fn residual_norm(a: &CscMatrix<f64>, b: &Vector<f64>, x: &Vector<f64>) -> f64 {
        (b - &a.mul_vec(x).unwrap()).l2_norm()
    }

    #[test]
    fn pairs_neighbours_of_a_chain() {
        let a = poisson_1d(6);
        let (agg, n_coarse) = pairwise_aggregation(&a, 0.25);
        assert_eq!(n_coarse, 3);
        assert_eq!(agg, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn diagonal_matrix_does_not_coarsen() {
        let a = CscMatrix::from_triplets(20, 20, &(0..20).map(|i| (i, i, 1.0 + i as f64)).collect::<Vec<_>>())
            .unwrap();
        let amg = AlgebraicMultiGrid::new(&a, AmgOptions::default()).unwrap();
        assert_eq!(amg.num_levels(), 1);
        let b = Vector::from_fn(20, |i| 1.0 + i as f64);
        let mut x = Vector::zeros(20);
        amg.vcycle(&b, &mut x).unwrap();
        assert!(residual_norm(&a, &b, &x) < 1e-12);
    }

    #[test]
    fn galerkin_operator_is_restricted_poisson() {
        let a = poisson_1d(16);
        let amg = AlgebraicMultiGrid::new(&a, AmgOptions::default().with_levels(2)).unwrap();
        assert_eq!(amg.num_levels(), 2);
        let lvl = &amg.levels[0];
        assert_eq!(lvl.interpolation.ncols(), 8);
        // Pᵀ A P of a pair-aggregated chain: 2 on the diagonal, -1 off it.
        let coarse = lvl.restriction.matmul(&a).unwrap().matmul(&lvl.interpolation).unwrap();
        assert_eq!(coarse.get(0, 0).unwrap(), 2.0);
        assert_eq!(coarse.get(1, 0).unwrap(), -1.0);
    }

    #[test]
    fn repeated_vcycles_reduce_the_residual() {
        let n = 32;
        let a = poisson_1d(n);
        let b = Vector::from_fn(n, |i| ((i + 1) as f64).sin());
        let mut x = Vector::zeros(n);
        let amg = AlgebraicMultiGrid::new(&a, AmgOptions::default().with_levels(3)).unwrap();
        let r0 = residual_norm(&a, &b, &x);
        for _ in 0..50 {
            amg.vcycle(&b, &mut x).unwrap();
        }
        let last = residual_norm(&a, &b, &x);
        assert!(last < 0.5 * r0);
    }

    #[test]
    fn one_shot_vcycle_and_shape_checks() {
        let a = poisson_1d(10);
        let b = Vector::from_fn(10, |_| 1.0);
        let mut x = Vector::zeros(10);
        AlgebraicMultiGrid::amg_vcycle(&a, &b, &mut x, 2, 2, 0.25).unwrap();
        assert!(residual_norm(&a, &b, &x) < b.l2_norm());
        assert!(AlgebraicMultiGrid::amg_vcycle(&a, &b, &mut Vector::zeros(3), 2, 2, 0.25).is_err());
        assert!(AlgebraicMultiGrid::new(&a, AmgOptions::default().with_levels(0)).is_err());
    }
}
