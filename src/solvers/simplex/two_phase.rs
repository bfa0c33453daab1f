//! The two-phase method for systems without an obvious starting basis.
//!
//! Phase 1 minimizes the sum of one artificial variable per constraint row;
//! a nonzero optimum means the constraints are contradictory. Otherwise the
//! artificial variables are eliminated from the basis and phase 2 optimizes
//! the real objective from the feasible basis found.
use log::debug;
use ndarray::Array1;

use crate::error::LinearProgramError;
use crate::float::Float;
use crate::linear_program::Problem;
use crate::matrix::Matrix;
use crate::solvers::{OptimizeResult, Solver};

use super::canonical::{canonicalize, CanonicalSystem};
use super::engine::{self, Optimum};
use super::{into_result, system_from_problem};

/// Builder struct to customize the [`TwoPhase`] solver.
///
/// After constructing the default builder with [`TwoPhase::custom`], use the
/// other methods to update specific settings, and finally call
/// [`build`](TwoPhaseBuilder::build) to validate the customized settings and
/// create the solver.
pub struct TwoPhaseBuilder<F> {
    tol: F,
    pivot_tol: F,
    max_iter: usize,
}

impl<F: Float> TwoPhaseBuilder<F> {
    pub(crate) fn new() -> TwoPhaseBuilder<F> {
        TwoPhaseBuilder {
            tol: F::cast(1e-4),
            pivot_tol: F::zero(),
            max_iter: 1000,
        }
    }

    /// Set the feasibility tolerance: the canonical-form test and the
    /// phase-1 optimum are compared against zero with this slack. Should be
    /// a small positive value.
    pub fn tol(mut self, tol: F) -> Self {
        self.tol = tol;
        self
    }

    /// Set the tolerance of the pricing and ratio-test sign comparisons.
    /// Zero (the default) reproduces the strict `< 0` tests of the textbook
    /// method; a small positive value trades a little optimality for
    /// robustness on ill-conditioned data.
    pub fn pivot_tol(mut self, pivot_tol: F) -> Self {
        self.pivot_tol = pivot_tol;
        self
    }

    /// Maximum number of pivots per phase before we give up on trying to
    /// solve the problem.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Validate the settings and construct the solver.
    /// Returns an `InvalidParameter` error if one of the input constraints is violated.
    pub fn build(self) -> Result<TwoPhase<F>, LinearProgramError<F>> {
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
        Ok(TwoPhase {
            tol: self.tol,
            pivot_tol: self.pivot_tol,
            max_iter: self.max_iter,
        })
    }
}

/// Two-phase revised simplex solver.
///
/// Handles any linear program a [`Problem`](crate::linear_program::Problem)
/// can describe: when the constraint system admits no starting basis by
/// column swaps alone, a phase-1 feasibility problem is solved first.
///
/// To get started quickly, use the [`default`](TwoPhase::default) method to
/// initialize the solver with default parameters; see
/// [`custom`](TwoPhase::custom) for the builder.
#[derive(PartialEq, Debug)]
pub struct TwoPhase<F> {
    tol: F,
    pivot_tol: F,
    max_iter: usize,
}

impl<F: Float> Default for TwoPhase<F> {
    /// The two-phase solver with default configuration.
    fn default() -> Self {
        TwoPhaseBuilder::new().build().unwrap()
    }
}

impl<F: Float> Solver<F> for TwoPhase<F> {
    fn solve(&self, problem: &Problem<F>) -> Result<OptimizeResult<F>, LinearProgramError<F>> {
        let (a, b, c, cols) = system_from_problem(problem)?;

        // no artificials needed when the system canonicalizes directly
        match canonicalize(a.clone(), b.clone(), c, cols, self.tol) {
            Ok(system) => {
                return into_result(engine::run(system, self.pivot_tol, self.max_iter), problem, 0)
            }
            Err(LinearProgramError::NoFeasibleBasis) => {}
            Err(e) => return Err(e),
        }
        debug!("two-phase: no direct basis, solving the auxiliary problem");
        self.solve_with_artificials(a, b, problem)
    }
}

impl<F: Float> TwoPhase<F> {
    /// Construct a new solver, to be customized through the builder pattern.
    pub fn custom() -> TwoPhaseBuilder<F> {
        TwoPhaseBuilder::new()
    }

    fn solve_with_artificials(
        &self,
        mut a: Matrix<F>,
        mut b: Matrix<F>,
        problem: &Problem<F>,
    ) -> Result<OptimizeResult<F>, LinearProgramError<F>> {
        let m = a.height();
        let n = a.width();

        // flip rows until the right-hand side is nonnegative
        for i in 0..m {
            if b.at(0, i)? < F::zero() {
                for j in 0..n {
                    let v = -a.at(i, j)?;
                    *a.at_mut(i, j)? = v;
                }
                let v = -b.at(0, i)?;
                *b.at_mut(0, i)? = v;
            }
        }

        // phase 1: the artificial columns lead, so the identity basis is
        // immediate and the auxiliary objective is their sum
        let mut a1 = Matrix::identity(m);
        a1.append_columns(&a)?;
        let mut c1 = Matrix::zeros(1, m + n);
        for i in 0..m {
            *c1.at_mut(0, i)? = F::one();
        }
        let cols1: Vec<usize> = (0..m).map(|i| n + i).chain(0..n).collect();

        let system = canonicalize(a1, b, c1, cols1, self.tol)?;
        let phase1 = match engine::run(system, self.pivot_tol, self.max_iter) {
            Ok(opt) => opt,
            Err(stop) => return into_result(Err(stop), problem, 0),
        };
        debug!("two-phase: auxiliary optimum {}", phase1.objective);
        if phase1.objective.abs() > self.tol {
            return Err(LinearProgramError::Infeasible);
        }

        let iterations = phase1.iterations;
        let system = strip_artificials(phase1, n, self.tol, problem.c())?;
        into_result(
            engine::run(system, self.pivot_tol, self.max_iter),
            problem,
            iterations,
        )
    }
}

/// Rewrite the phase-1 optimum in final-basis coordinates, pivot every
/// remaining artificial column out of the basis (or drop its row when the
/// constraint turned out redundant), then delete the artificial columns and
/// attach the real objective `costs` to what is left.
fn strip_artificials<F: Float>(
    opt: Optimum<F>,
    n: usize,
    tol: F,
    costs: &Array1<F>,
) -> Result<CanonicalSystem<F>, LinearProgramError<F>> {
    let Optimum {
        system: mut sys, ..
    } = opt;

    // final-basis coordinates: every basic column becomes a unit column
    let basis_matrix = sys.columns(&sys.basis)?;
    let binv = basis_matrix.inv()?;
    let mut a = binv.mul(&sys.a)?;
    let mut rhs = binv.mul(&sys.b.transpose())?;

    let mut r = 0;
    while r < sys.basis.len() {
        let basic_col = sys.basis[r];
        if sys.cols[basic_col] < n {
            r += 1;
            continue;
        }
        // a zero-valued artificial is still basic in row r
        let mut pivot_col = None;
        for j in 0..a.width() {
            if sys.cols[j] < n && a.at(r, j)?.abs() > tol {
                pivot_col = Some(j);
                break;
            }
        }
        match pivot_col {
            Some(j) => {
                debug!("two-phase: pivoting artificial out of row {r} against column {j}");
                let piv = a.at(r, j)?;
                for k in 0..a.width() {
                    let v = a.at(r, k)? / piv;
                    *a.at_mut(r, k)? = v;
                }
                let v = rhs.at(r, 0)? / piv;
                *rhs.at_mut(r, 0)? = v;

                let pivot_row = a.row_vec(r)?;
                let pivot_rhs = rhs.at(r, 0)?;
                for i in 0..a.height() {
                    if i == r {
                        continue;
                    }
                    let coef = a.at(i, j)?;
                    if coef == F::zero() {
                        continue;
                    }
                    for k in 0..a.width() {
                        let v = a.at(i, k)? - coef * pivot_row[k];
                        *a.at_mut(i, k)? = v;
                    }
                    let v = rhs.at(i, 0)? - coef * pivot_rhs;
                    *rhs.at_mut(i, 0)? = v;
                }

                if let Some(qp) = sys.nonbasis.iter().position(|&q| q == j) {
                    sys.nonbasis[qp] = basic_col;
                }
                sys.basis[r] = j;
                r += 1;
            }
            None => {
                debug!("two-phase: constraint row {r} is redundant, dropping it");
                a = a.remove_row(r)?;
                rhs = rhs.remove_row(r)?;
                sys.basis.remove(r);
                sys.nonbasis.push(basic_col);
            }
        }
    }

    // delete the artificial columns and reindex what survives
    let width = a.width();
    let mut new_pos = vec![usize::MAX; width];
    let mut next = 0;
    for pos in 0..width {
        if sys.cols[pos] < n {
            new_pos[pos] = next;
            next += 1;
        }
    }
    for pos in (0..width).rev() {
        if sys.cols[pos] >= n {
            a = a.remove_column(pos)?;
        }
    }
    let basis: Vec<usize> = sys.basis.iter().map(|&p| new_pos[p]).collect();
    let nonbasis: Vec<usize> = sys
        .nonbasis
        .iter()
        .filter(|&&p| sys.cols[p] < n)
        .map(|&p| new_pos[p])
        .collect();
    let cols: Vec<usize> = sys.cols.iter().copied().filter(|&id| id < n).collect();

    let mut c = Matrix::zeros(1, cols.len());
    for (pos, &id) in cols.iter().enumerate() {
        *c.at_mut(0, pos)? = costs[id];
    }

    Ok(CanonicalSystem {
        a,
        b: rhs.transpose(),
        c,
        basis,
        nonbasis,
        cols,
        offset: F::zero(),
    })
}
