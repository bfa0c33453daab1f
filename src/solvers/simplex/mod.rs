//! Revised simplex solvers over a dense canonical tableau.
//!
//! [`Simplex`] canonicalizes the constraint system directly and iterates the
//! revised simplex method from the resulting basis; it fails with
//! [`NoFeasibleBasis`](crate::error::LinearProgramError::NoFeasibleBasis)
//! when column swaps cannot produce one. [`TwoPhase`] adds the auxiliary
//! feasibility problem for exactly that case and is the solver to reach for
//! by default.
mod canonical;
mod engine;
mod two_phase;

pub use two_phase::{TwoPhase, TwoPhaseBuilder};

use ndarray::{Array1, Axis};

use crate::error::{LinearProgramError, MatrixError};
use crate::float::Float;
use crate::linear_program::Problem;
use crate::matrix::Matrix;
use crate::solvers::{OptimizeResult, Solver};

use canonical::canonicalize;
use engine::{Optimum, Stop};

/// Builder struct to customize the [`Simplex`] solver.
///
/// After constructing the default builder with [`Simplex::custom`], use the
/// other methods to update specific settings, and finally call
/// [`build`](SimplexBuilder::build) to validate the customized settings and
/// create the solver.
pub struct SimplexBuilder<F> {
    tol: F,
    pivot_tol: F,
    max_iter: usize,
}

impl<F: Float> SimplexBuilder<F> {
    pub(crate) fn new() -> SimplexBuilder<F> {
        SimplexBuilder {
            tol: F::cast(1e-4),
            pivot_tol: F::zero(),
            max_iter: 1000,
        }
    }

    /// Set the feasibility tolerance used by the canonical-form test.
    /// Should be a small positive value.
    pub fn tol(mut self, tol: F) -> Self {
        self.tol = tol;
        self
    }

    /// Set the tolerance of the pricing and ratio-test sign comparisons.
    /// Zero (the default) reproduces the strict `< 0` tests of the textbook
    /// method.
    pub fn pivot_tol(mut self, pivot_tol: F) -> Self {
        self.pivot_tol = pivot_tol;
        self
    }

    /// Maximum number of pivots before we give up on trying to solve the
    /// problem.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Validate the settings and construct the solver.
    /// Returns an `InvalidParameter` error if one of the input constraints is violated.
    pub fn build(self) -> Result<Simplex<F>, LinearProgramError<F>> {
        if self.tol <= F::zero() {
            return Err(LinearProgramError::InvalidParameter(
                "The tolerance must be positive.",
            ));
        }
        if self.pivot_tol < F::zero() {
            return Err(LinearProgramError::InvalidParameter(
                "The pivot tolerance must be nonnegative.",
            ));
        }
        if self.max_iter == 0 {
            return Err(LinearProgramError::InvalidParameter(
                "The iteration limit must be at least 1.",
            ));
        }
        Ok(Simplex {
            tol: self.tol,
            pivot_tol: self.pivot_tol,
            max_iter: self.max_iter,
        })
    }
}

/// Single-phase revised simplex solver.
///
/// Expects a constraint system that canonicalizes by Gauss-Jordan
/// elimination and column swaps alone; most systems built from `<=`
/// constraints with nonnegative bounds qualify. Systems that do not are
/// reported as `NoFeasibleBasis` — use [`TwoPhase`] for those.
#[derive(PartialEq, Debug)]
pub struct Simplex<F> {
    tol: F,
    pivot_tol: F,
    max_iter: usize,
}

impl<F: Float> Default for Simplex<F> {
    /// The simplex solver with default configuration.
    fn default() -> Self {
        SimplexBuilder::new().build().unwrap()
    }
}

impl<F: Float> Simplex<F> {
    /// Construct a new solver, to be customized through the builder pattern.
    ///
    /// ```rust
    /// use approx::assert_abs_diff_eq;
    /// use ndarray::array;
    /// use simplex_lp::prelude::*;
    ///
    /// let A_ub = array![[1.0, 1.0], [1.0, 3.0]];
    /// let b_ub = array![4.0, 6.0];
    /// let c = array![-1.0, -1.0];
    ///
    /// let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();
    /// let solver = Simplex::custom().max_iter(100).build().unwrap();
    /// let res = solver.solve(&problem).unwrap();
    ///
    /// assert_abs_diff_eq!(*res.fun(), -4.0, epsilon = 1e-6);
    /// ```
    pub fn custom() -> SimplexBuilder<F> {
        SimplexBuilder::new()
    }
}

impl<F: Float> Solver<F> for Simplex<F> {
    fn solve(&self, problem: &Problem<F>) -> Result<OptimizeResult<F>, LinearProgramError<F>> {
        let (a, b, c, cols) = system_from_problem(problem)?;
        let system = canonicalize(a, b, c, cols, self.tol)?;
        into_result(engine::run(system, self.pivot_tol, self.max_iter), problem, 0)
    }
}

/// Pull the equality-form triple out of a [`Problem`] as matrices, with the
/// identity column permutation.
fn system_from_problem<F: Float>(
    problem: &Problem<F>,
) -> Result<(Matrix<F>, Matrix<F>, Matrix<F>, Vec<usize>), LinearProgramError<F>> {
    let (m, n) = problem.A().dim();
    if n < m {
        return Err(LinearProgramError::IncompatibleInputDimensions);
    }
    let a = Matrix::from(problem.A().clone());
    let b = Matrix::from(problem.b().clone().insert_axis(Axis(0)));
    let c = Matrix::from(problem.c().clone().insert_axis(Axis(0)));
    Ok((a, b, c, (0..n).collect()))
}

/// Report a solution vector in the caller's variable order, dropping the
/// entries of columns the caller never supplied (artificials).
fn unpermute<F: Float>(
    x: &Matrix<F>,
    cols: &[usize],
    n: usize,
) -> Result<Array1<F>, MatrixError> {
    let mut out = Array1::zeros(n);
    for (pos, &id) in cols.iter().enumerate() {
        if id < n {
            out[id] = x.at(0, pos)?;
        }
    }
    Ok(out)
}

/// Translate an engine outcome into the public result type: un-permute the
/// solution, strip slack entries and fold in the objective offset.
fn into_result<F: Float>(
    outcome: Result<Optimum<F>, Stop<F>>,
    problem: &Problem<F>,
    prior_iterations: usize,
) -> Result<OptimizeResult<F>, LinearProgramError<F>> {
    let n = problem.A().ncols();
    match outcome {
        Ok(opt) => {
            let x = unpermute(&opt.x, &opt.system.cols, n)?;
            Ok(OptimizeResult::new(
                problem.denormalize_x_into(x),
                opt.objective + problem.c0(),
                prior_iterations + opt.iterations,
            ))
        }
        Err(Stop::Unbounded) => Err(LinearProgramError::Unbounded),
        Err(Stop::IterationLimit { x, cols }) => {
            let x = unpermute(&x, &cols, n)?;
            Err(LinearProgramError::IterationLimitExceeded(
                problem.denormalize_x_into(x),
            ))
        }
        Err(Stop::Numeric(e)) => Err(e.into()),
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn default_builder_doesnt_panic() {
        let solver = Simplex::<f64>::default();
        let solver_long_way_round = Simplex::custom().build().unwrap();
        assert_eq!(solver, solver_long_way_round);
    }

    #[test]
    fn builder_rejects_bad_parameters() {
        assert!(matches!(
            Simplex::<f64>::custom().tol(-1.0).build(),
            Err(LinearProgramError::InvalidParameter(_))
        ));
        assert!(matches!(
            Simplex::<f64>::custom().max_iter(0).build(),
            Err(LinearProgramError::InvalidParameter(_))
        ));
    }

    #[test]
    fn reaches_the_optimal_vertex() {
        let _ = env_logger::builder().is_test(true).try_init();

        // min -x1 - x2 over x1 + x2 <= 4, x1 + 3 x2 <= 6
        let A_ub = array![[1.0, 1.0], [1.0, 3.0]];
        let b_ub = array![4.0, 6.0];
        let c = array![-1.0, -1.0];
        let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();

        let res = Simplex::default().solve(&problem).unwrap();
        assert_abs_diff_eq!(*res.fun(), -4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(res.x(), &array![3.0, 1.0], epsilon = 1e-6);
        for (lhs, ub) in A_ub.dot(res.x()).iter().zip(b_ub.iter()) {
            assert!(lhs <= &(ub + 1e-6));
        }
    }

    #[test]
    fn pivots_away_from_the_starting_basis() {
        // the canonical basis starts at (3, 1); the optimum is the origin
        let A_ub = array![[1.0, 1.0], [1.0, 3.0]];
        let b_ub = array![4.0, 6.0];
        let c = array![1.0, 1.0];
        let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();

        let res = Simplex::default().solve(&problem).unwrap();
        assert_abs_diff_eq!(*res.fun(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(res.x(), &array![0.0, 0.0], epsilon = 1e-6);
        assert_eq!(res.iteration(), 2);
    }

    #[test]
    fn missing_bound_is_unbounded() {
        // max x1 with no constraint limiting it from above
        let A_ub = array![[-1.0]];
        let b_ub = array![0.0];
        let c = array![-1.0];
        let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();

        let err = Simplex::default().solve(&problem).unwrap_err();
        assert!(matches!(err, LinearProgramError::Unbounded));
    }

    #[test]
    fn degenerate_vertex_terminates() {
        // three constraints meet at (2, 0); the basis is degenerate there
        let A_ub = array![[1.0, 1.0], [1.0, -1.0], [1.0, 0.0]];
        let b_ub = array![2.0, 2.0, 2.0];
        let c = array![-1.0, 0.0];
        let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();

        let res = Simplex::default().solve(&problem).unwrap();
        assert_abs_diff_eq!(*res.fun(), -2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(res.x()[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn no_feasible_basis_is_reported() {
        // a duplicated equality row cannot be canonicalized by column swaps
        let A_eq = array![[1.0, 1.0], [1.0, 1.0]];
        let b_eq = array![1.0, 1.0];
        let c = array![1.0, 0.0];
        let problem = Problem::target(&c).eq(&A_eq, &b_eq).build().unwrap();

        let err = Simplex::default().solve(&problem).unwrap_err();
        assert!(matches!(err, LinearProgramError::NoFeasibleBasis));
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let A_ub = array![[1.0, 1.0], [1.0, 3.0]];
        let b_ub = array![4.0, 6.0];
        let c = array![1.0, 1.0];
        let problem = Problem::target(&c).ub(&A_ub, &b_ub).build().unwrap();

        let solver = Simplex::custom().max_iter(1).build().unwrap();
        let err = solver.solve(&problem).unwrap_err();
        assert!(matches!(err, LinearProgramError::IterationLimitExceeded(_)));
    }

    #[test]
    fn over_determined_systems_are_rejected() {
        // more constraint rows than columns after slack conversion
        let A_eq = array![[1.0], [1.0]];
        let b_eq = array![1.0, 2.0];
        let c = array![1.0];
        let problem = Problem::target(&c).eq(&A_eq, &b_eq).build().unwrap();

        let err = Simplex::default().solve(&problem).unwrap_err();
        assert!(matches!(
            err,
            LinearProgramError::IncompatibleInputDimensions
        ));
    }
}
