use ndarray::NdFloat;
use num_traits::NumCast;

/// Scalar type the matrix and the solvers are generic over. `f64` is the
/// sensible default; `f32` works but leaves little numerical headroom.
pub trait Float: NdFloat {
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f64 {}
impl Float for f32 {}
