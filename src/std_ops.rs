//! `std::ops` sugar for building expression trees.
//!
//! The operators construct nodes without constraining the operand kinds;
//! invalid combinations (adding a vector to a rotation, say) fail to compile
//! where the tree is evaluated, at the missing `UnaryOp`/`BinaryOp` impl.
//! Binary `-` desugars to `lhs + (-rhs)`, so only `Sum` and `Minus` exist as
//! additive tags.
//!
//! `f32`/`f64` literals on the left of `*` and `+` are lifted into constant
//! [`Scalar`] leaves. A constant built this way has fresh storage on every
//! use, so it is never "the same variable" as any target.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::expr::{Binary, Unary};
use crate::leaf::{Scalar, Vec3};
use crate::ops::{Minus, Scale, ScaleDiv, Sum};

macro_rules! impl_builder_ops {
    ($Ty:ident<$($G:ident),*>) => {
        impl<$($G,)* Rhs> Add<Rhs> for $Ty<$($G),*> {
            type Output = Binary<Sum, Self, Rhs>;

            #[inline]
            fn add(self, rhs: Rhs) -> Self::Output {
                Binary::new(self, rhs)
            }
        }

        impl<$($G,)* Rhs> Sub<Rhs> for $Ty<$($G),*> {
            type Output = Binary<Sum, Self, Unary<Minus, Rhs>>;

            #[inline]
            fn sub(self, rhs: Rhs) -> Self::Output {
                Binary::new(self, Unary::new(rhs))
            }
        }

        impl<$($G,)* Rhs> Mul<Rhs> for $Ty<$($G),*> {
            type Output = Binary<Scale, Self, Rhs>;

            #[inline]
            fn mul(self, rhs: Rhs) -> Self::Output {
                Binary::new(self, rhs)
            }
        }

        impl<$($G,)* Rhs> Div<Rhs> for $Ty<$($G),*> {
            type Output = Binary<ScaleDiv, Self, Rhs>;

            #[inline]
            fn div(self, rhs: Rhs) -> Self::Output {
                Binary::new(self, rhs)
            }
        }

        impl<$($G),*> Neg for $Ty<$($G),*> {
            type Output = Unary<Minus, Self>;

            #[inline]
            fn neg(self) -> Self::Output {
                Unary::new(self)
            }
        }
    };
}

impl_builder_ops!(Vec3<F>);
impl_builder_ops!(Scalar<F>);
impl_builder_ops!(Unary<O, R0>);
impl_builder_ops!(Binary<O, L0, R0>);

// Mixed ops: raw float literals on the left lift into constant Scalar leaves.
// We generate these for f32 and f64 via a macro, per concrete rhs shape.
macro_rules! impl_literal_ops {
    ($f:ty => $Rhs:ty) => {
        impl Mul<$Rhs> for $f {
            type Output = Binary<Scale, Scalar<$f>, $Rhs>;

            #[inline]
            fn mul(self, rhs: $Rhs) -> Self::Output {
                Binary::new(Scalar::new(self), rhs)
            }
        }

        impl Add<$Rhs> for $f {
            type Output = Binary<Sum, Scalar<$f>, $Rhs>;

            #[inline]
            fn add(self, rhs: $Rhs) -> Self::Output {
                Binary::new(Scalar::new(self), rhs)
            }
        }
    };
    ($f:ty => $Rhs:ty, <$($G:ident),+>) => {
        impl<$($G),+> Mul<$Rhs> for $f {
            type Output = Binary<Scale, Scalar<$f>, $Rhs>;

            #[inline]
            fn mul(self, rhs: $Rhs) -> Self::Output {
                Binary::new(Scalar::new(self), rhs)
            }
        }

        impl<$($G),+> Add<$Rhs> for $f {
            type Output = Binary<Sum, Scalar<$f>, $Rhs>;

            #[inline]
            fn add(self, rhs: $Rhs) -> Self::Output {
                Binary::new(Scalar::new(self), rhs)
            }
        }
    };
}

macro_rules! impl_literal_ops_for {
    ($f:ty) => {
        impl_literal_ops!($f => Vec3<$f>);
        impl_literal_ops!($f => Scalar<$f>);
        impl_literal_ops!($f => Unary<O, R0>, <O, R0>);
        impl_literal_ops!($f => Binary<O, L0, R0>, <O, L0, R0>);
    };
}

impl_literal_ops_for!(f32);
impl_literal_ops_for!(f64);
