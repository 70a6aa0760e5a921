use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits needed throughout geodiff. The
/// `nalgebra::RealField` bound lets the same scalar drive vector values,
/// rotation kinematics and the dense Jacobian matrices. Only primitive float
/// types implement this.
pub trait Float:
    NumFloat
    + FloatConst
    + FromPrimitive
    + nalgebra::RealField
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}
