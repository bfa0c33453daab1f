//! Canonical-form construction.
//!
//! A system is canonical when its right-hand side is nonnegative and the
//! leading m×m block of the constraint matrix is the identity, so that the
//! first m columns are a feasible starting basis. [`canonicalize`] brings a
//! system into this shape by Gauss-Jordan elimination, swapping in
//! sign-compatible columns where the diagonal pivot would drive the
//! right-hand side negative.
use log::debug;

use crate::error::{LinearProgramError, MatrixError};
use crate::float::Float;
use crate::matrix::Matrix;

/// A system in canonical coordinates together with its basis bookkeeping.
///
/// `cols` maps each column position to the variable index the caller knows
/// it by; column swaps are recorded here so solutions can be reported in the
/// caller's order. `offset` is the accumulated constant `Fo`: the true
/// objective value is `-Fo + c·x`.
pub(crate) struct CanonicalSystem<F> {
    pub(crate) a: Matrix<F>,
    /// Right-hand side as a 1×m row.
    pub(crate) b: Matrix<F>,
    pub(crate) c: Matrix<F>,
    /// Basic column positions, one per constraint row.
    pub(crate) basis: Vec<usize>,
    /// Non-basic column positions.
    pub(crate) nonbasis: Vec<usize>,
    pub(crate) cols: Vec<usize>,
    pub(crate) offset: F,
}

impl<F: Float> std::fmt::Debug for CanonicalSystem<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalSystem")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("c", &self.c)
            .field("basis", &self.basis)
            .field("nonbasis", &self.nonbasis)
            .field("cols", &self.cols)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<F: Float> CanonicalSystem<F> {
    /// The sub-matrix made of the given column positions, in order.
    pub(crate) fn columns(&self, positions: &[usize]) -> Result<Matrix<F>, MatrixError> {
        let mut out = Matrix::zeros(self.a.height(), 0);
        for &pos in positions {
            out.append_columns(&self.a.column(pos)?)?;
        }
        Ok(out)
    }

    /// The cost coefficients of the given column positions as a 1×k row.
    pub(crate) fn costs(&self, positions: &[usize]) -> Result<Matrix<F>, MatrixError> {
        let mut out = Matrix::zeros(1, positions.len());
        for (k, &pos) in positions.iter().enumerate() {
            *out.at_mut(0, k)? = self.c.at(0, pos)?;
        }
        Ok(out)
    }

    /// The starting basic solution: `x[basis[i]] = b[i]`, zero elsewhere.
    pub(crate) fn initial_x(&self) -> Result<Matrix<F>, MatrixError> {
        let mut x = Matrix::zeros(1, self.a.width());
        for (i, &p) in self.basis.iter().enumerate() {
            *x.at_mut(0, p)? = self.b.at(0, i)?;
        }
        Ok(x)
    }
}

/// `b >= 0` everywhere and the leading m×m block of `a` is the identity
/// within `tol`.
pub(crate) fn is_canonical<F: Float>(
    a: &Matrix<F>,
    b: &Matrix<F>,
    tol: F,
) -> Result<bool, MatrixError> {
    for v in b.row_vec(0)? {
        if v < F::zero() {
            return Ok(false);
        }
    }
    for i in 0..a.height() {
        for j in 0..a.height() {
            let want = if i == j { F::one() } else { F::zero() };
            if (a.at(i, j)? - want).abs() > tol {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// The lowest-index column right of `i` whose entry in row `i` can serve as
/// the pivot: sign-compatible with `rhs` or, when `rhs` is zero, simply
/// nonzero.
fn pivot_candidate<F: Float>(
    a: &Matrix<F>,
    i: usize,
    rhs: F,
    tol: F,
) -> Result<Option<usize>, MatrixError> {
    for j in i + 1..a.width() {
        let entry = a.at(i, j)?;
        let compatible = if rhs.abs() <= tol {
            entry.abs() > tol
        } else {
            entry * rhs > tol
        };
        if compatible {
            return Ok(Some(j));
        }
    }
    Ok(None)
}

/// Bring `(a, b, c)` into canonical form, yielding the basis partition
/// `P = {0..m-1}`, `Q = {m..n-1}` and the accumulated objective offset.
///
/// Column swaps are applied to `a`, `c` and `cols` together. A row with no
/// sign-compatible pivot candidate fails with
/// [`LinearProgramError::NoFeasibleBasis`], as does a system that does not
/// settle within the sweep cap.
pub(crate) fn canonicalize<F: Float>(
    mut a: Matrix<F>,
    mut b: Matrix<F>,
    mut c: Matrix<F>,
    mut cols: Vec<usize>,
    tol: F,
) -> Result<CanonicalSystem<F>, LinearProgramError<F>> {
    let m = a.height();
    let n = a.width();
    let mut offset = F::zero();

    let max_sweeps = m * n + 1;
    let mut sweeps = 0;
    while !is_canonical(&a, &b, tol)? {
        sweeps += 1;
        if sweeps > max_sweeps {
            debug!("canonicalize: no convergence after {max_sweeps} sweeps");
            return Err(LinearProgramError::NoFeasibleBasis);
        }
        for i in 0..m {
            let pivot = a.at(i, i)?;
            let rhs = b.at(0, i)?;
            if pivot * rhs < F::zero() || pivot.abs() <= tol {
                match pivot_candidate(&a, i, rhs, tol)? {
                    Some(j) => {
                        debug!("canonicalize: column {} takes pivot position {}", cols[j], i);
                        a.swap_columns(i, j)?;
                        c.swap_columns(i, j)?;
                        cols.swap(i, j);
                    }
                    None => return Err(LinearProgramError::NoFeasibleBasis),
                }
            }

            // clear column i: zeros above and below the pivot, then pivot = 1
            let pivot = a.at(i, i)?;
            let pivot_row = a.row_vec(i)?;
            let pivot_rhs = b.at(0, i)?;
            for r in 0..m {
                if r == i {
                    continue;
                }
                let coef = a.at(r, i)? / pivot;
                for k in 0..n {
                    let v = a.at(r, k)? - coef * pivot_row[k];
                    *a.at_mut(r, k)? = v;
                }
                let v = b.at(0, r)? - coef * pivot_rhs;
                *b.at_mut(0, r)? = v;
            }
            for k in 0..n {
                let v = a.at(i, k)? / pivot;
                *a.at_mut(i, k)? = v;
            }
            let v = b.at(0, i)? / pivot;
            *b.at_mut(0, i)? = v;

            // reduce the objective row against the (now scaled) pivot row
            let coef = c.at(0, i)?;
            for k in 0..n {
                let v = c.at(0, k)? - coef * a.at(i, k)?;
                *c.at_mut(0, k)? = v;
            }
            offset = offset - coef * b.at(0, i)?;
        }
    }

    Ok(CanonicalSystem {
        a,
        b,
        c,
        basis: (0..m).collect(),
        nonbasis: (m..n).collect(),
        cols,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-4;

    fn m(rows: Vec<Vec<f64>>) -> Matrix<f64> {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn already_canonical_system_is_recognized() {
        let a = m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, -1.0]]);
        let b = Matrix::from_row(vec![3.0, 4.0]);
        assert!(is_canonical(&a, &b, TOL).unwrap());

        let negative_rhs = Matrix::from_row(vec![3.0, -4.0]);
        assert!(!is_canonical(&a, &negative_rhs, TOL).unwrap());
    }

    #[test]
    fn canonicalize_produces_identity_and_nonnegative_rhs() {
        let a = m(vec![vec![1.0, 1.0, 1.0, 0.0], vec![1.0, 3.0, 0.0, 1.0]]);
        let b = Matrix::from_row(vec![4.0, 6.0]);
        let c = Matrix::from_row(vec![-1.0, -1.0, 0.0, 0.0]);

        let system = canonicalize(a, b, c, (0..4).collect(), TOL).unwrap();
        assert!(is_canonical(&system.a, &system.b, TOL).unwrap());
        assert_eq!(system.basis, vec![0, 1]);
        assert_eq!(system.nonbasis, vec![2, 3]);
        assert_eq!(system.cols, vec![0, 1, 2, 3]);
        assert_abs_diff_eq!(system.b.at(0, 0).unwrap(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(system.b.at(0, 1).unwrap(), 1.0, epsilon = 1e-9);
        // basis costs are reduced to zero, the offset absorbs them
        assert_abs_diff_eq!(system.c.at(0, 0).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(system.c.at(0, 1).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(system.offset, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn sign_conflicts_are_resolved_by_column_swaps() {
        // the diagonal entry of row 0 would leave b negative; column 1 fits
        let a = m(vec![vec![1.0, -1.0, 1.0]]);
        let b = Matrix::from_row(vec![-2.0]);
        let c = Matrix::from_row(vec![1.0, 1.0, 0.0]);

        let system = canonicalize(a, b, c, (0..3).collect(), TOL).unwrap();
        assert!(is_canonical(&system.a, &system.b, TOL).unwrap());
        assert_eq!(system.cols[0], 1);
        assert_abs_diff_eq!(system.b.at(0, 0).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn no_sign_compatible_pivot_fails_explicitly() {
        let a = m(vec![vec![1.0, 1.0]]);
        let b = Matrix::from_row(vec![-1.0]);
        let c = Matrix::from_row(vec![1.0, 0.0]);

        let err = canonicalize(a, b, c, (0..2).collect(), TOL).unwrap_err();
        assert!(matches!(err, LinearProgramError::NoFeasibleBasis));
    }

    #[test]
    fn redundant_rows_fail_instead_of_dividing_by_zero() {
        let a = m(vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let b = Matrix::from_row(vec![1.0, 1.0]);
        let c = Matrix::from_row(vec![1.0, 0.0]);

        let err = canonicalize(a, b, c, (0..2).collect(), TOL).unwrap_err();
        assert!(matches!(err, LinearProgramError::NoFeasibleBasis));
    }

    #[test]
    fn initial_x_scatters_b_over_the_basis() {
        let a = m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, -1.0]]);
        let b = Matrix::from_row(vec![3.0, 4.0]);
        let c = Matrix::from_row(vec![0.0, 0.0, 1.0]);
        let system = canonicalize(a, b, c, (0..3).collect(), TOL).unwrap();

        let x = system.initial_x().unwrap();
        assert_eq!(x.row_vec(0).unwrap(), vec![3.0, 4.0, 0.0]);
    }
}
