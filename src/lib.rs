//! A pure-Rust dense-matrix revised simplex solver for linear programs with equality and inequality constraints.
//!
//! # Linear programs
//!
//! A linear program is a mathematical optimization problem defined as:
//!
//! ```text
//!    min_x c'x
//!    st A_eq'x == b_eq
//!       A_ub'x <= b_ub
//!            x >= 0
//! ```
//!
//! The crate converts such a problem to slack form, constructs a starting
//! basis by Gauss-Jordan canonicalization (falling back to a phase-1
//! feasibility problem when no basis can be found that way), and iterates
//! the revised simplex method with Bland's anti-cycling rule until the
//! problem is reported optimal, infeasible or unbounded.
//!
//! # Example
//! ```
//! use approx::assert_abs_diff_eq;
//! use ndarray::array;
//!
//! use simplex_lp::prelude::*;
//!
//! let A_ub = array![[1.0, 1.0], [1.0, 3.0]];
//! let b_ub = array![4.0, 6.0];
//! let c = array![-1.0, -1.0];
//!
//! let problem = Problem::target(&c)
//!     // If you define neither equality nor inequality constraints,
//!     // the problem returns as unconstrained.
//!     .ub(&A_ub, &b_ub)
//!     .build()
//!     .unwrap();
//!
//!     // These are the default values you can overwrite.
//!     // You may omit any option for which the default is good enough for you
//! let solver = TwoPhase::custom()
//!     .tol(1e-4)
//!     .pivot_tol(0.0)
//!     .max_iter(1000)
//!     .build()
//!     .unwrap();
//!
//! let res = solver.solve(&problem).unwrap();
//!
//! assert_abs_diff_eq!(*res.fun(), -4.0, epsilon = 1e-6);
//! assert_abs_diff_eq!(res.x(), &array![3.0, 1.0], epsilon = 1e-6);
//! ```
//!
//! # Outcomes
//!
//! Infeasibility and unboundedness are ordinary outcomes of a solve, not
//! crashes: they come back as the
//! [`Infeasible`](error::LinearProgramError::Infeasible) and
//! [`Unbounded`](error::LinearProgramError::Unbounded) error values. Shape
//! mismatches, out-of-range indices and singular basis matrices abort the
//! solve with the offending operation and dimensions attached.

pub mod error;
pub(crate) mod float;
pub mod linear_program;
pub mod matrix;
pub mod prelude;
pub mod solvers;

pub use linear_program::{Problem, ProblemBuilder};
pub use solvers::OptimizeResult;

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn make_problem() -> Problem<f64> {
        let A_ub = array![[-3f64, 1.], [1., 2.]];
        let b_ub = array![6., 4.];
        let A_eq = array![[1., 1.]];
        let b_eq = array![1.];
        let c = array![-1., 4.];
        Problem::target(&c)
            .ub(&A_ub, &b_ub)
            .eq(&A_eq, &b_eq)
            .build()
            .unwrap()
    }

    #[test]
    fn test_problem_interface() {
        let problem = make_problem();
        problem.A();
        problem.b();
        problem.c();
    }

    #[test]
    fn test_two_phase_interface() {
        let problem = make_problem();
        let solver = TwoPhase::custom().build().unwrap();
        let res = solver.solve(&problem).unwrap();

        assert_abs_diff_eq!(*res.x(), array![1., 0.], epsilon = 1e-6);
        assert_abs_diff_eq!(*res.fun(), -1., epsilon = 1e-6);
    }

    #[test]
    fn test_simplex_interface() {
        let problem = make_problem();
        let solver = Simplex::custom().build().unwrap();
        let res = solver.solve(&problem).unwrap();

        assert_abs_diff_eq!(*res.x(), array![1., 0.], epsilon = 1e-6);
    }
}
