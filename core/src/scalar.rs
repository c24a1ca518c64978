use std::fmt;
use std::iter::Sum;

use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};

/// Floating-point scalar a descriptor can be computed in.
///
/// Implemented for `f32` and `f64` through the blanket impl below; vote
/// accumulation, binning, and normalization all happen in this type.
pub trait Real:
    Float + FloatConst + NumAssign + FromPrimitive + Sum + Default + fmt::Debug + Send + Sync + 'static
{
}

impl<T> Real for T where
    T: Float
        + FloatConst
        + NumAssign
        + FromPrimitive
        + Sum
        + Default
        + fmt::Debug
        + Send
        + Sync
        + 'static
{
}
