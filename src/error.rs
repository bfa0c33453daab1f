use ndarray::Array1;
use std::fmt::Debug;
use thiserror::Error;

/// Failure of a single matrix operation.
///
/// These are programming or input errors, not solver outcomes: a shape that
/// does not fit the operation, an index outside the matrix, or an inversion
/// of a matrix without an inverse. Every variant carries the operation and
/// the offending shapes or indices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("{op}: incompatible dimensions ({detail})")]
    DimensionMismatch { op: &'static str, detail: String },
    #[error("{op}: index {index} out of range (limit {limit})")]
    IndexOutOfRange {
        op: &'static str,
        index: usize,
        limit: usize,
    },
    #[error("matrix is singular, it has no inverse")]
    Singular,
}

#[derive(Error, Debug)]
pub enum LinearProgramError<F: Debug> {
    #[error("The problem is unconstrained, meaning the solution is the all-zeros vector if `c` is nonnegative, or unbounded otherwise.")]
    Unconstrained,
    #[error("The dimensions of your cost- and constraint arrays do not align.")]
    IncompatibleInputDimensions,
    #[error("A parameter was set to an invalid value: {0}")]
    InvalidParameter(&'static str),
    #[error("No starting basis with nonnegative basic values could be constructed by column swaps. The two-phase solver handles such systems.")]
    NoFeasibleBasis,
    #[error("The solver finished successfully, it appears that the problem is infeasible.")]
    Infeasible,
    #[error("The solver finished successfully, it appears that your problem is unbounded.")]
    Unbounded,
    #[error("The solver failed to converge within the maximum number of iterations. Best solution after the final iteration:\n{0:#?}")]
    IterationLimitExceeded(Array1<F>),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
