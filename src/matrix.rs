//! Dense 2-D matrix used by the simplex solvers.
//!
//! The shape is fixed at construction, the contents are mutable. Element
//! accesses are bounds-checked and fail with [`MatrixError::IndexOutOfRange`];
//! operations on incompatible shapes fail with
//! [`MatrixError::DimensionMismatch`]. Equality is exact element-wise
//! comparison; callers that need tolerance comparisons apply their own
//! epsilon.
use ndarray::{concatenate, Array1, Array2, Axis};
use std::fmt;
use std::ops::{Add, Mul};

use crate::error::MatrixError;
use crate::float::Float;

#[derive(Clone, PartialEq)]
pub struct Matrix<F> {
    data: Array2<F>,
}

impl<F: Float> Matrix<F> {
    /// An `height`×`width` matrix of zeros.
    pub fn zeros(height: usize, width: usize) -> Self {
        Matrix {
            data: Array2::zeros((height, width)),
        }
    }

    /// An `height`×`width` matrix with every element set to `value`.
    pub fn filled(height: usize, width: usize, value: F) -> Self {
        Matrix {
            data: Array2::from_elem((height, width), value),
        }
    }

    /// The `size`×`size` identity matrix.
    pub fn identity(size: usize) -> Self {
        Matrix {
            data: Array2::eye(size),
        }
    }

    /// Build a matrix from explicit rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<F>>) -> Result<Self, MatrixError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MatrixError::DimensionMismatch {
                    op: "from_rows",
                    detail: format!("row {} has {} elements, expected {}", i, row.len(), width),
                });
            }
        }
        Ok(Matrix {
            data: Array2::from_shape_fn((height, width), |(i, j)| rows[i][j]),
        })
    }

    /// Build a 1×n row matrix from a flat vector.
    pub fn from_row(values: Vec<F>) -> Self {
        Matrix {
            data: Array1::from_vec(values).insert_axis(Axis(0)),
        }
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    fn check(op: &'static str, index: usize, limit: usize) -> Result<(), MatrixError> {
        if index < limit {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange { op, index, limit })
        }
    }

    /// Bounds-checked element read.
    pub fn at(&self, i: usize, j: usize) -> Result<F, MatrixError> {
        Self::check("at", i, self.height())?;
        Self::check("at", j, self.width())?;
        Ok(self.data[[i, j]])
    }

    /// Bounds-checked mutable element access.
    pub fn at_mut(&mut self, i: usize, j: usize) -> Result<&mut F, MatrixError> {
        Self::check("at_mut", i, self.height())?;
        Self::check("at_mut", j, self.width())?;
        Ok(&mut self.data[[i, j]])
    }

    /// Extract row `i` as a 1×w matrix.
    pub fn row(&self, i: usize) -> Result<Matrix<F>, MatrixError> {
        Self::check("row", i, self.height())?;
        Ok(Matrix {
            data: self.data.row(i).insert_axis(Axis(0)).to_owned(),
        })
    }

    /// Extract column `j` as an h×1 matrix.
    pub fn column(&self, j: usize) -> Result<Matrix<F>, MatrixError> {
        Self::check("column", j, self.width())?;
        Ok(Matrix {
            data: self.data.column(j).insert_axis(Axis(1)).to_owned(),
        })
    }

    /// Row `i` as a flat vector.
    pub fn row_vec(&self, i: usize) -> Result<Vec<F>, MatrixError> {
        Self::check("row_vec", i, self.height())?;
        Ok(self.data.row(i).to_vec())
    }

    /// All elements in row-major order.
    pub fn to_vec(&self) -> Vec<F> {
        self.data.iter().copied().collect()
    }

    pub fn transpose(&self) -> Matrix<F> {
        Matrix {
            data: self.data.t().to_owned(),
        }
    }

    fn require_same_shape(&self, rhs: &Self, op: &'static str) -> Result<(), MatrixError> {
        if self.height() != rhs.height() || self.width() != rhs.width() {
            return Err(MatrixError::DimensionMismatch {
                op,
                detail: format!(
                    "{}x{} and {}x{}",
                    self.height(),
                    self.width(),
                    rhs.height(),
                    rhs.width()
                ),
            });
        }
        Ok(())
    }

    pub fn add(&self, rhs: &Self) -> Result<Matrix<F>, MatrixError> {
        self.require_same_shape(rhs, "add")?;
        Ok(Matrix {
            data: &self.data + &rhs.data,
        })
    }

    pub fn sub(&self, rhs: &Self) -> Result<Matrix<F>, MatrixError> {
        self.require_same_shape(rhs, "sub")?;
        Ok(Matrix {
            data: &self.data - &rhs.data,
        })
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Self) -> Result<Matrix<F>, MatrixError> {
        self.require_same_shape(rhs, "hadamard")?;
        Ok(Matrix {
            data: &self.data * &rhs.data,
        })
    }

    /// Matrix product. Defined when `self.width() == rhs.height()`.
    pub fn mul(&self, rhs: &Self) -> Result<Matrix<F>, MatrixError> {
        if self.width() != rhs.height() {
            return Err(MatrixError::DimensionMismatch {
                op: "mul",
                detail: format!(
                    "{}x{} * {}x{} (left width must equal right height)",
                    self.height(),
                    self.width(),
                    rhs.height(),
                    rhs.width()
                ),
            });
        }
        Ok(Matrix {
            data: self.data.dot(&rhs.data),
        })
    }

    /// Multiply every element by `scalar`.
    pub fn scale(&self, scalar: F) -> Matrix<F> {
        Matrix {
            data: &self.data * scalar,
        }
    }

    /// Add `scalar` to every element.
    pub fn shift(&self, scalar: F) -> Matrix<F> {
        Matrix {
            data: &self.data + scalar,
        }
    }

    /// Append the columns of `other` after the columns of `self`.
    ///
    /// Heights must match. The operand is copied into the result before
    /// anything is written; appending a clone of `self` to `self` is fine.
    pub fn append_columns(&mut self, other: &Matrix<F>) -> Result<(), MatrixError> {
        if self.height() != other.height() {
            return Err(MatrixError::DimensionMismatch {
                op: "append_columns",
                detail: format!("heights {} and {}", self.height(), other.height()),
            });
        }
        self.data = concatenate(Axis(1), &[self.data.view(), other.data.view()]).map_err(
            |_| MatrixError::DimensionMismatch {
                op: "append_columns",
                detail: format!("heights {} and {}", self.height(), other.height()),
            },
        )?;
        Ok(())
    }

    /// Swap columns `i` and `j` in place.
    pub fn swap_columns(&mut self, i: usize, j: usize) -> Result<(), MatrixError> {
        Self::check("swap_columns", i, self.width())?;
        Self::check("swap_columns", j, self.width())?;
        for k in 0..self.height() {
            self.data.swap([k, i], [k, j]);
        }
        Ok(())
    }

    /// A copy of the matrix with row `index` removed and the remaining rows
    /// reindexed.
    pub fn remove_row(&self, index: usize) -> Result<Matrix<F>, MatrixError> {
        Self::check("remove_row", index, self.height())?;
        let keep: Vec<usize> = (0..self.height()).filter(|&i| i != index).collect();
        Ok(Matrix {
            data: self.data.select(Axis(0), &keep),
        })
    }

    /// A copy of the matrix with column `index` removed and the remaining
    /// columns reindexed.
    pub fn remove_column(&self, index: usize) -> Result<Matrix<F>, MatrixError> {
        Self::check("remove_column", index, self.width())?;
        let keep: Vec<usize> = (0..self.width()).filter(|&j| j != index).collect();
        Ok(Matrix {
            data: self.data.select(Axis(1), &keep),
        })
    }

    fn require_square(&self, op: &'static str) -> Result<(), MatrixError> {
        if self.height() != self.width() {
            return Err(MatrixError::DimensionMismatch {
                op,
                detail: format!("{}x{} is not square", self.height(), self.width()),
            });
        }
        Ok(())
    }

    /// The minor of element `(r, c)`: the matrix with row `r` and column `c`
    /// removed.
    fn minor(&self, r: usize, c: usize) -> Matrix<F> {
        Matrix {
            data: Array2::from_shape_fn((self.height() - 1, self.width() - 1), |(i, j)| {
                self.data[[i + usize::from(i >= r), j + usize::from(j >= c)]]
            }),
        }
    }

    /// Determinant by cofactor expansion along row 0.
    ///
    /// Runs in factorial time; fine for the basis sizes the solvers work
    /// with, not for large matrices. The determinant of the empty 0×0 matrix
    /// is 1, so that adjugates of 1×1 matrices come out right.
    pub fn det(&self) -> Result<F, MatrixError> {
        self.require_square("det")?;
        let n = self.height();
        if n == 0 {
            return Ok(F::one());
        }
        if n == 1 {
            return Ok(self.data[[0, 0]]);
        }
        let mut d = F::zero();
        let mut sign = F::one();
        for i in 0..n {
            d = d + sign * self.data[[0, i]] * self.minor(0, i).det()?;
            sign = -sign;
        }
        Ok(d)
    }

    /// Adjugate: the transpose of the cofactor matrix.
    pub fn adj(&self) -> Result<Matrix<F>, MatrixError> {
        self.require_square("adj")?;
        let n = self.height();
        let mut cof = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let sign = if (i + j) % 2 == 0 { F::one() } else { -F::one() };
                cof.data[[i, j]] = sign * self.minor(i, j).det()?;
            }
        }
        Ok(cof.transpose())
    }

    /// Inverse via the adjugate. Fails with [`MatrixError::Singular`] when
    /// the determinant is zero.
    pub fn inv(&self) -> Result<Matrix<F>, MatrixError> {
        let d = self.det()?;
        if d == F::zero() {
            return Err(MatrixError::Singular);
        }
        Ok(self.adj()?.scale(F::one() / d))
    }

    /// Solve `self * x = rhs` for a column vector `rhs`.
    pub fn solve(&self, rhs: &Matrix<F>) -> Result<Matrix<F>, MatrixError> {
        if rhs.width() != 1 || rhs.height() != self.height() {
            return Err(MatrixError::DimensionMismatch {
                op: "solve",
                detail: format!(
                    "right-hand side is {}x{}, expected {}x1",
                    rhs.height(),
                    rhs.width(),
                    self.height()
                ),
            });
        }
        self.inv()?.mul(rhs)
    }

    /// Sum of the absolute values of all elements.
    pub fn norm1(&self) -> F {
        self.data.iter().fold(F::zero(), |acc, v| acc + v.abs())
    }
}

impl<F: Float> From<Array2<F>> for Matrix<F> {
    fn from(data: Array2<F>) -> Self {
        Matrix { data }
    }
}

impl<F: Float> Mul<F> for &Matrix<F> {
    type Output = Matrix<F>;

    fn mul(self, scalar: F) -> Matrix<F> {
        self.scale(scalar)
    }
}

impl<F: Float> Add<F> for &Matrix<F> {
    type Output = Matrix<F>;

    fn add(self, scalar: F) -> Matrix<F> {
        self.shift(scalar)
    }
}

impl Mul<&Matrix<f64>> for f64 {
    type Output = Matrix<f64>;

    fn mul(self, rhs: &Matrix<f64>) -> Matrix<f64> {
        rhs.scale(self)
    }
}

impl Mul<&Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn mul(self, rhs: &Matrix<f32>) -> Matrix<f32> {
        rhs.scale(self)
    }
}

impl Add<&Matrix<f64>> for f64 {
    type Output = Matrix<f64>;

    fn add(self, rhs: &Matrix<f64>) -> Matrix<f64> {
        rhs.shift(self)
    }
}

impl Add<&Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn add(self, rhs: &Matrix<f32>) -> Matrix<f32> {
        rhs.shift(self)
    }
}

impl<F: Float> fmt::Display for Matrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.height() {
            for j in 0..self.width() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.data[[i, j]])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<F: Float> fmt::Debug for Matrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}x{} matrix", self.height(), self.width())?;
        fmt::Display::fmt(self, f)
    }
}
