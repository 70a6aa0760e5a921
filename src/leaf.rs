//! Leaf expressions: concrete quantities backed by shared storage.
//!
//! A leaf's identity is its storage, not its value. Cloning a leaf handle
//! aliases the same backing `Arc`, so the clone and the original are the same
//! variable to the Jacobian evaluator; building a new leaf with equal
//! coefficients yields an independent variable. This is what makes
//! `∂x/∂y = 0` hold for distinct variables of the same space, and what makes
//! an aliased leaf used twice in one expression sum its branch Jacobians.

use std::any::TypeId;
use std::sync::Arc;

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::evaluator::LeafEval;
use crate::expr::Expression;
use crate::float::Float;
use crate::jacobian::LeafJac;

/// A leaf expression holding its value in shared storage.
pub trait Leaf<F: Float>: Expression<F> {
    /// Copy the stored value out of the backing storage.
    fn stored(&self) -> Self::Value;
}

macro_rules! impl_leaf_expression {
    ($Ty:ident, $Value:ty, $dim:expr) => {
        impl<F: Float> Expression<F> for $Ty<F> {
            type Value = $Value;
            const TANGENT_DIM: usize = $dim;

            type Eval<'e>
                = LeafEval<'e, F, Self>
            where
                Self: 'e;

            type Jac<'j, 'e: 'j, T: Expression<F>>
                = LeafJac<F>
            where
                Self: 'e,
                T: 'j;

            fn evaluator(&self) -> Self::Eval<'_> {
                LeafEval::new(self)
            }

            fn jacobian_tree<'j, 'e: 'j, T: Expression<F>>(
                _eval: &'j Self::Eval<'e>,
                _target: &'j T,
            ) -> Self::Jac<'j, 'e, T> {
                LeafJac::new()
            }

            fn may_contain<T: Expression<F>>() -> bool {
                TypeId::of::<Self>() == TypeId::of::<T>()
            }

            fn is_same(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.storage, &other.storage)
            }
        }

        impl<F: Float> Leaf<F> for $Ty<F> {
            fn stored(&self) -> Self::Value {
                *self.storage
            }
        }
    };
}

/// A 3-vector leaf.
///
/// `clone` aliases the same variable; `new`/`from_vector` always create an
/// independent one.
#[derive(Clone, Debug)]
pub struct Vec3<F> {
    storage: Arc<Vector3<F>>,
}

impl<F: Float> Vec3<F> {
    /// New independent vector leaf.
    pub fn new(x: F, y: F, z: F) -> Self {
        Vec3 {
            storage: Arc::new(Vector3::new(x, y, z)),
        }
    }

    /// New independent vector leaf from an nalgebra vector.
    pub fn from_vector(v: Vector3<F>) -> Self {
        Vec3 {
            storage: Arc::new(v),
        }
    }

    /// The stored value.
    pub fn value(&self) -> Vector3<F> {
        *self.storage
    }
}

impl_leaf_expression!(Vec3, Vector3<F>, 3);

/// A scalar leaf.
///
/// Scalar literals on the left of `*`/`+` are lifted into constant `Scalar`
/// leaves automatically; keep a handle to a `Scalar` you intend to
/// differentiate against.
#[derive(Clone, Debug)]
pub struct Scalar<F> {
    storage: Arc<F>,
}

impl<F: Float> Scalar<F> {
    /// New independent scalar leaf.
    pub fn new(value: F) -> Self {
        Scalar {
            storage: Arc::new(value),
        }
    }

    /// The stored value.
    pub fn value(&self) -> F {
        *self.storage
    }
}

impl_leaf_expression!(Scalar, F, 1);

/// A rotation leaf: an element of SO(3) stored as a unit quaternion.
///
/// Tangent vectors live in so(3) under the left (global) perturbation
/// convention `q ⊞ w = exp(w) ∘ q`.
#[derive(Clone, Debug)]
pub struct Rot3<F> {
    storage: Arc<UnitQuaternion<F>>,
}

impl<F: Float> Rot3<F> {
    /// The identity rotation, as a new independent leaf.
    pub fn identity() -> Self {
        Rot3 {
            storage: Arc::new(UnitQuaternion::identity()),
        }
    }

    /// New independent rotation leaf from a unit quaternion.
    pub fn from_quaternion(q: UnitQuaternion<F>) -> Self {
        Rot3 {
            storage: Arc::new(q),
        }
    }

    /// New independent rotation leaf from an axis and an angle.
    pub fn from_axis_angle(axis: &Unit<Vector3<F>>, angle: F) -> Self {
        Rot3 {
            storage: Arc::new(UnitQuaternion::from_axis_angle(axis, angle)),
        }
    }

    /// New independent rotation leaf from a rotation vector `w = θ·axis`.
    pub fn from_scaled_axis(w: Vector3<F>) -> Self {
        Rot3 {
            storage: Arc::new(UnitQuaternion::from_scaled_axis(w)),
        }
    }

    /// The stored value.
    pub fn value(&self) -> UnitQuaternion<F> {
        *self.storage
    }
}

impl_leaf_expression!(Rot3, UnitQuaternion<F>, 3);
