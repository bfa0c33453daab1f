#[doc(no_inline)]
pub use crate::error::{LinearProgramError, MatrixError};
#[doc(no_inline)]
pub use crate::linear_program::Problem;
#[doc(no_inline)]
pub use crate::matrix::Matrix;
#[doc(no_inline)]
pub use crate::solvers::Simplex;
#[doc(no_inline)]
pub use crate::solvers::Solver;
#[doc(no_inline)]
pub use crate::solvers::TwoPhase;
