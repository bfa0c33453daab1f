//! The revised simplex pivoting loop.
//!
//! Operates on a [`CanonicalSystem`]: price the non-basic columns, pick the
//! entering column by Bland's rule, run the ratio test, pivot, repeat. The
//! loop terminates at an optimum, at an unbounded ray, or at the iteration
//! cap.
use log::{debug, trace};

use crate::error::MatrixError;
use crate::float::Float;
use crate::matrix::Matrix;

use super::canonical::CanonicalSystem;

/// A finished run: the system with its final basis partition, the optimal
/// basic solution and objective value, and the number of pivots taken.
pub(crate) struct Optimum<F> {
    pub(crate) system: CanonicalSystem<F>,
    pub(crate) x: Matrix<F>,
    pub(crate) objective: F,
    pub(crate) iterations: usize,
}

/// Why a run stopped without an optimum.
pub(crate) enum Stop<F> {
    /// The ratio test found no positive direction entry.
    Unbounded,
    /// The pivot cap was reached; carries the incumbent solution and the
    /// column permutation needed to report it.
    IterationLimit { x: Matrix<F>, cols: Vec<usize> },
    Numeric(MatrixError),
}

impl<F> From<MatrixError> for Stop<F> {
    fn from(e: MatrixError) -> Self {
        Stop::Numeric(e)
    }
}

impl<F: Float> std::fmt::Debug for Stop<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stop::Unbounded => write!(f, "Unbounded"),
            Stop::IterationLimit { x, .. } => write!(f, "IterationLimit({x:?})"),
            Stop::Numeric(e) => write!(f, "Numeric({e:?})"),
        }
    }
}

fn dot<F: Float>(c: &Matrix<F>, x: &Matrix<F>) -> Result<F, MatrixError> {
    c.mul(&x.transpose())?.at(0, 0)
}

/// Iterate pricing, ratio test and pivot steps until optimal.
///
/// Comparisons against zero in the pricing and ratio steps use `pivot_tol`;
/// zero keeps the strict `< 0` / `> 0` tests of the textbook method.
pub(crate) fn run<F: Float>(
    mut system: CanonicalSystem<F>,
    pivot_tol: F,
    max_iter: usize,
) -> Result<Optimum<F>, Stop<F>> {
    let mut x = system.initial_x()?;

    for iteration in 1..=max_iter {
        // dual prices u solve u·B = Cb
        let basis_matrix = system.columns(&system.basis)?;
        let basis_costs = system.costs(&system.basis)?;
        let u = basis_costs.mul(&basis_matrix.inv()?)?;

        // reduced costs of the non-basic columns: r = Cq - u·Kq
        let nonbasis_columns = system.columns(&system.nonbasis)?;
        let nonbasis_costs = system.costs(&system.nonbasis)?;
        let reduced = nonbasis_costs.sub(&u.mul(&nonbasis_columns)?)?.row_vec(0)?;

        // Bland's rule: among negative reduced costs, enter the lowest column
        let entering = reduced
            .iter()
            .enumerate()
            .filter(|&(_, &rc)| rc < -pivot_tol)
            .map(|(pos, _)| pos)
            .min_by_key(|&pos| system.nonbasis[pos]);
        let Some(enter_pos) = entering else {
            let objective = dot(&system.c, &x)? - system.offset;
            debug!("simplex: optimal after {} pivots, objective {objective}", iteration - 1);
            return Ok(Optimum {
                system,
                x,
                objective,
                iterations: iteration - 1,
            });
        };
        let entering_column = system.nonbasis[enter_pos];

        // direction y solves B·y = K_l
        let y = basis_matrix
            .solve(&system.a.column(entering_column)?)?
            .to_vec();
        if y.iter().all(|&v| v <= pivot_tol) {
            debug!("simplex: column {entering_column} has no positive direction entry, unbounded");
            return Err(Stop::Unbounded);
        }

        // ratio test; ties go to the first row encountered
        let mut t = F::infinity();
        let mut leave_pos = 0;
        for (i, &yi) in y.iter().enumerate() {
            if yi > pivot_tol {
                let ratio = x.at(0, system.basis[i])? / yi;
                if ratio < t {
                    t = ratio;
                    leave_pos = i;
                }
            }
        }
        let leaving_column = system.basis[leave_pos];
        trace!(
            "simplex: iteration {iteration}: column {entering_column} enters, \
             column {leaving_column} leaves, step {t}"
        );

        // move to the adjacent vertex and swap the basis entries
        for (i, &yi) in y.iter().enumerate() {
            let p = system.basis[i];
            let v = x.at(0, p)? - yi * t;
            *x.at_mut(0, p)? = v;
        }
        *x.at_mut(0, entering_column)? = t;
        system.basis[leave_pos] = entering_column;
        system.nonbasis[enter_pos] = leaving_column;
    }

    debug!("simplex: iteration limit of {max_iter} reached");
    Err(Stop::IterationLimit {
        x,
        cols: system.cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn system(
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        c: Vec<f64>,
    ) -> CanonicalSystem<f64> {
        let a = Matrix::from_rows(a).unwrap();
        let m = a.height();
        let n = a.width();
        CanonicalSystem {
            a,
            b: Matrix::from_row(b),
            c: Matrix::from_row(c),
            basis: (0..m).collect(),
            nonbasis: (m..n).collect(),
            cols: (0..n).collect(),
            offset: 0.0,
        }
    }

    #[test]
    fn pivots_to_the_optimum() {
        // min -x3 with x1 + x3 = 2, x2 + 2 x3 = 3
        let sys = system(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 2.0]],
            vec![2.0, 3.0],
            vec![0.0, 0.0, -1.0],
        );
        let opt = run(sys, 0.0, 100).unwrap();
        assert_abs_diff_eq!(opt.objective, -1.5, epsilon = 1e-9);
        assert_eq!(opt.x.row_vec(0).unwrap(), vec![0.5, 0.0, 1.5]);
        assert_eq!(opt.iterations, 1);
        assert_eq!(opt.system.basis, vec![0, 2]);
    }

    #[test]
    fn tied_ratio_test_terminates() {
        // both rows limit the entering column at the same step length
        let sys = system(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]],
            vec![2.0, 2.0],
            vec![0.0, 0.0, -1.0],
        );
        let opt = run(sys, 0.0, 100).unwrap();
        assert_abs_diff_eq!(opt.objective, -2.0, epsilon = 1e-9);
        assert_eq!(opt.x.row_vec(0).unwrap(), vec![0.0, 0.0, 2.0]);
        assert_eq!(opt.iterations, 1);
    }

    #[test]
    fn all_nonpositive_direction_is_unbounded() {
        let sys = system(vec![vec![1.0, -1.0]], vec![2.0], vec![0.0, -1.0]);
        assert!(matches!(run(sys, 0.0, 100), Err(Stop::Unbounded)));
    }

    #[test]
    fn iteration_cap_reports_the_incumbent() {
        let sys = system(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 2.0]],
            vec![2.0, 3.0],
            vec![0.0, 0.0, -1.0],
        );
        match run(sys, 0.0, 1) {
            Err(Stop::IterationLimit { x, .. }) => {
                // one pivot has been taken, optimality was never tested
                assert_eq!(x.row_vec(0).unwrap(), vec![0.5, 0.0, 1.5]);
            }
            _ => panic!("expected the iteration cap to trigger"),
        }
    }

    #[test]
    fn basic_solution_stays_feasible() {
        // A x = b holds for the reported optimum
        let sys = system(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 2.0]],
            vec![2.0, 3.0],
            vec![0.0, 0.0, -1.0],
        );
        let a = sys.a.clone();
        let b = sys.b.clone();
        let opt = run(sys, 0.0, 100).unwrap();
        let residual = a
            .mul(&opt.x.transpose())
            .unwrap()
            .sub(&b.transpose())
            .unwrap();
        assert_abs_diff_eq!(residual.norm1(), 0.0, epsilon = 1e-9);
    }
}
