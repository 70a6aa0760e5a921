//! Operator tags and their forward-value and local-partial rules.
//!
//! Each operator is a zero-sized tag implementing [`UnaryOp`] or [`BinaryOp`]
//! per supported operand combination; the expression nodes dispatch on the
//! operand value types, so one tag covers e.g. scalar×vector and vector×scalar
//! multiplication with the per-side partial shapes of each form.
//!
//! Local partials are small dense matrices. The evaluator multiplies them
//! against child Jacobians, so shape conventions matter: a partial of an
//! `m`-dimensional result with respect to an `n`-dimensional operand is
//! `m × n` (a column for ∂(s·v)/∂s, a row for ∂‖v‖/∂v, a scaled identity for
//! ∂(s·v)/∂v).
//!
//! SO(3) partials use the left (global) perturbation `q ⊞ w = exp(w) ∘ q`.
//!
//! The rules here are total over well-typed operands; non-differentiable
//! points (the norm gradient at zero, division by a zero scalar) surface as
//! the backing arithmetic's NaN/infinity and propagate unchanged.

use nalgebra::{DMatrix, Matrix3, UnitQuaternion, Vector3};

use crate::float::Float;

/// Forward-evaluation and local-partial rules for a unary operator tag.
pub trait UnaryOp<F: Float, In>: 'static {
    /// Value type this operator produces.
    type Output: Clone + 'static;

    /// Tangent dimension of the output.
    const TANGENT_DIM: usize;

    /// Forward evaluation rule.
    fn value(input: &In) -> Self::Output;

    /// Local partial ∂output/∂input at the cached values.
    fn partial(value: &Self::Output, input: &In) -> DMatrix<F>;
}

/// Forward-evaluation and local-partial rules for a binary operator tag.
pub trait BinaryOp<F: Float, L, R>: 'static {
    /// Value type this operator produces.
    type Output: Clone + 'static;

    /// Tangent dimension of the output.
    const TANGENT_DIM: usize;

    /// Forward evaluation rule.
    fn value(lhs: &L, rhs: &R) -> Self::Output;

    /// Local partial ∂output/∂lhs at the cached values.
    fn left_partial(value: &Self::Output, lhs: &L, rhs: &R) -> DMatrix<F>;

    /// Local partial ∂output/∂rhs at the cached values.
    fn right_partial(value: &Self::Output, lhs: &L, rhs: &R) -> DMatrix<F>;
}

// ── Partial-matrix helpers ──

fn identity<F: Float>(dim: usize) -> DMatrix<F> {
    DMatrix::identity(dim, dim)
}

fn scaled_identity<F: Float>(dim: usize, s: F) -> DMatrix<F> {
    DMatrix::from_diagonal_element(dim, dim, s)
}

fn column<F: Float>(v: &Vector3<F>) -> DMatrix<F> {
    DMatrix::from_column_slice(3, 1, v.as_slice())
}

fn row<F: Float>(v: &Vector3<F>) -> DMatrix<F> {
    DMatrix::from_row_slice(1, 3, v.as_slice())
}

fn element<F: Float>(s: F) -> DMatrix<F> {
    DMatrix::from_element(1, 1, s)
}

fn rotation<F: Float>(q: &UnitQuaternion<F>) -> DMatrix<F> {
    let m = q.to_rotation_matrix();
    DMatrix::from_column_slice(3, 3, m.matrix().as_slice())
}

fn skew<F: Float>(v: &Vector3<F>) -> DMatrix<F> {
    let o = F::zero();
    DMatrix::from_row_slice(
        3,
        3,
        &[o, -v.z, v.y, v.z, o, -v.x, -v.y, v.x, o],
    )
}

// ── Addition and negation ──

/// Vector or scalar addition.
#[derive(Clone, Copy, Debug)]
pub struct Sum;

impl<F: Float> BinaryOp<F, Vector3<F>, Vector3<F>> for Sum {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &Vector3<F>, rhs: &Vector3<F>) -> Vector3<F> {
        lhs + rhs
    }

    fn left_partial(_: &Vector3<F>, _: &Vector3<F>, _: &Vector3<F>) -> DMatrix<F> {
        identity(3)
    }

    fn right_partial(_: &Vector3<F>, _: &Vector3<F>, _: &Vector3<F>) -> DMatrix<F> {
        identity(3)
    }
}

impl<F: Float> BinaryOp<F, F, F> for Sum {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(lhs: &F, rhs: &F) -> F {
        *lhs + *rhs
    }

    fn left_partial(_: &F, _: &F, _: &F) -> DMatrix<F> {
        identity(1)
    }

    fn right_partial(_: &F, _: &F, _: &F) -> DMatrix<F> {
        identity(1)
    }
}

/// Negation of a vector or scalar.
#[derive(Clone, Copy, Debug)]
pub struct Minus;

impl<F: Float> UnaryOp<F, Vector3<F>> for Minus {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(input: &Vector3<F>) -> Vector3<F> {
        -input
    }

    fn partial(_: &Vector3<F>, _: &Vector3<F>) -> DMatrix<F> {
        scaled_identity(3, -F::one())
    }
}

impl<F: Float> UnaryOp<F, F> for Minus {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(input: &F) -> F {
        -*input
    }

    fn partial(_: &F, _: &F) -> DMatrix<F> {
        element(-F::one())
    }
}

// ── Multiplication and division ──

/// Multiplication: scalar×vector, vector×scalar, scalar×scalar.
#[derive(Clone, Copy, Debug)]
pub struct Scale;

impl<F: Float> BinaryOp<F, F, Vector3<F>> for Scale {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &F, rhs: &Vector3<F>) -> Vector3<F> {
        rhs * *lhs
    }

    /// ∂(s·v)/∂s is the vector itself, as a column.
    fn left_partial(_: &Vector3<F>, _: &F, rhs: &Vector3<F>) -> DMatrix<F> {
        column(rhs)
    }

    fn right_partial(_: &Vector3<F>, lhs: &F, _: &Vector3<F>) -> DMatrix<F> {
        scaled_identity(3, *lhs)
    }
}

impl<F: Float> BinaryOp<F, Vector3<F>, F> for Scale {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &Vector3<F>, rhs: &F) -> Vector3<F> {
        lhs * *rhs
    }

    fn left_partial(_: &Vector3<F>, _: &Vector3<F>, rhs: &F) -> DMatrix<F> {
        scaled_identity(3, *rhs)
    }

    fn right_partial(_: &Vector3<F>, lhs: &Vector3<F>, _: &F) -> DMatrix<F> {
        column(lhs)
    }
}

impl<F: Float> BinaryOp<F, F, F> for Scale {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(lhs: &F, rhs: &F) -> F {
        *lhs * *rhs
    }

    fn left_partial(_: &F, _: &F, rhs: &F) -> DMatrix<F> {
        element(*rhs)
    }

    fn right_partial(_: &F, lhs: &F, _: &F) -> DMatrix<F> {
        element(*lhs)
    }
}

/// Division by a scalar.
#[derive(Clone, Copy, Debug)]
pub struct ScaleDiv;

impl<F: Float> BinaryOp<F, Vector3<F>, F> for ScaleDiv {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &Vector3<F>, rhs: &F) -> Vector3<F> {
        lhs / *rhs
    }

    fn left_partial(_: &Vector3<F>, _: &Vector3<F>, rhs: &F) -> DMatrix<F> {
        scaled_identity(3, F::one() / *rhs)
    }

    /// ∂(v/s)/∂s = -v/s², as a column.
    fn right_partial(_: &Vector3<F>, lhs: &Vector3<F>, rhs: &F) -> DMatrix<F> {
        column(&(-(lhs / (*rhs * *rhs))))
    }
}

impl<F: Float> BinaryOp<F, F, F> for ScaleDiv {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(lhs: &F, rhs: &F) -> F {
        *lhs / *rhs
    }

    fn left_partial(_: &F, _: &F, rhs: &F) -> DMatrix<F> {
        element(F::one() / *rhs)
    }

    fn right_partial(_: &F, lhs: &F, rhs: &F) -> DMatrix<F> {
        element(-*lhs / (*rhs * *rhs))
    }
}

// ── Vector reductions ──

/// L2 norm of a vector.
#[derive(Clone, Copy, Debug)]
pub struct Norm;

impl<F: Float> UnaryOp<F, Vector3<F>> for Norm {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(input: &Vector3<F>) -> F {
        input.norm()
    }

    /// Gradient of the L2 norm: vᵀ/‖v‖.
    fn partial(value: &F, input: &Vector3<F>) -> DMatrix<F> {
        row(&(input / *value))
    }
}

/// Squared L2 norm of a vector.
#[derive(Clone, Copy, Debug)]
pub struct SquaredNorm;

impl<F: Float> UnaryOp<F, Vector3<F>> for SquaredNorm {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(input: &Vector3<F>) -> F {
        input.norm_squared()
    }

    /// Gradient of the squared L2 norm: 2vᵀ.
    fn partial(_: &F, input: &Vector3<F>) -> DMatrix<F> {
        let two = F::one() + F::one();
        row(&(input * two))
    }
}

/// Unit vector in the direction of the input.
#[derive(Clone, Copy, Debug)]
pub struct Normalize;

impl<F: Float> UnaryOp<F, Vector3<F>> for Normalize {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(input: &Vector3<F>) -> Vector3<F> {
        input.normalize()
    }

    /// (I − n·nᵀ)/‖v‖, with n the cached unit vector.
    fn partial(value: &Vector3<F>, input: &Vector3<F>) -> DMatrix<F> {
        let m = (Matrix3::identity() - value * value.transpose()) / input.norm();
        DMatrix::from_column_slice(3, 3, m.as_slice())
    }
}

/// Dot product of two vectors.
#[derive(Clone, Copy, Debug)]
pub struct Dot;

impl<F: Float> BinaryOp<F, Vector3<F>, Vector3<F>> for Dot {
    type Output = F;
    const TANGENT_DIM: usize = 1;

    fn value(lhs: &Vector3<F>, rhs: &Vector3<F>) -> F {
        lhs.dot(rhs)
    }

    fn left_partial(_: &F, _: &Vector3<F>, rhs: &Vector3<F>) -> DMatrix<F> {
        row(rhs)
    }

    fn right_partial(_: &F, lhs: &Vector3<F>, _: &Vector3<F>) -> DMatrix<F> {
        row(lhs)
    }
}

// ── SO(3) operators ──

/// Rotation of a vector by an SO(3) element.
#[derive(Clone, Copy, Debug)]
pub struct Rotate;

impl<F: Float> BinaryOp<F, UnitQuaternion<F>, Vector3<F>> for Rotate {
    type Output = Vector3<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &UnitQuaternion<F>, rhs: &Vector3<F>) -> Vector3<F> {
        lhs.transform_vector(rhs)
    }

    /// ∂(q∘v)/∂q = −[q∘v]× under the left perturbation.
    fn left_partial(value: &Vector3<F>, _: &UnitQuaternion<F>, _: &Vector3<F>) -> DMatrix<F> {
        -skew(value)
    }

    /// ∂(q∘v)/∂v = R(q).
    fn right_partial(_: &Vector3<F>, lhs: &UnitQuaternion<F>, _: &Vector3<F>) -> DMatrix<F> {
        rotation(lhs)
    }
}

/// Composition of two SO(3) elements.
#[derive(Clone, Copy, Debug)]
pub struct Compose;

impl<F: Float> BinaryOp<F, UnitQuaternion<F>, UnitQuaternion<F>> for Compose {
    type Output = UnitQuaternion<F>;
    const TANGENT_DIM: usize = 3;

    fn value(lhs: &UnitQuaternion<F>, rhs: &UnitQuaternion<F>) -> UnitQuaternion<F> {
        lhs * rhs
    }

    /// Perturbing the left factor perturbs the product directly.
    fn left_partial(
        _: &UnitQuaternion<F>,
        _: &UnitQuaternion<F>,
        _: &UnitQuaternion<F>,
    ) -> DMatrix<F> {
        identity(3)
    }

    /// A right-factor perturbation is conjugated through the left factor:
    /// the adjoint, R(lhs).
    fn right_partial(
        _: &UnitQuaternion<F>,
        lhs: &UnitQuaternion<F>,
        _: &UnitQuaternion<F>,
    ) -> DMatrix<F> {
        rotation(lhs)
    }
}

/// Inverse of an SO(3) element.
#[derive(Clone, Copy, Debug)]
pub struct Invert;

impl<F: Float> UnaryOp<F, UnitQuaternion<F>> for Invert {
    type Output = UnitQuaternion<F>;
    const TANGENT_DIM: usize = 3;

    fn value(input: &UnitQuaternion<F>) -> UnitQuaternion<F> {
        input.inverse()
    }

    /// ∂(q⁻¹)/∂q = −R(q⁻¹).
    fn partial(value: &UnitQuaternion<F>, _: &UnitQuaternion<F>) -> DMatrix<F> {
        -rotation(value)
    }
}
