//! The typed expression tree: the [`Expression`] trait, the generic
//! [`Unary`]/[`Binary`] operator nodes, and the builder methods.
//!
//! An expression is an immutable tree of operator nodes over leaf quantities
//! (see [`crate::leaf`]). Per expression type the trait statically provides
//! the evaluated value type, the tangent dimension, the structural containment
//! predicate used to prune Jacobian recursion, and storage-identity
//! comparison. Evaluator trees ([`crate::evaluator`], [`crate::jacobian`])
//! are derived from these associated types.

use std::any::{Any, TypeId};
use std::marker::PhantomData;

use crate::evaluator::EvalNode;
use crate::float::Float;
use crate::jacobian::JacNode;
use crate::ops::{Compose, Dot, Invert, Norm, Normalize, Rotate, SquaredNorm};

/// A differentiable expression over the scalar field `F`.
///
/// Implemented by leaf types and by the [`Unary`]/[`Binary`] operator nodes.
/// The associated items drive both tree walkers: [`Expression::evaluator`]
/// builds the value-evaluator tree (each node's value computed exactly once),
/// and [`crate::JacobianEvaluator`] builds the Jacobian tree on top of it.
pub trait Expression<F: Float>: Any + Sized {
    /// The plain value produced when this expression is evaluated.
    type Value: Clone + 'static;

    /// Tangent-space dimension of the value. The Jacobian of `Self` with
    /// respect to a target `T` has shape `(Self::TANGENT_DIM, T::TANGENT_DIM)`.
    const TANGENT_DIM: usize;

    /// Value-evaluator node for this expression.
    type Eval<'e>: EvalNode<'e, F, Self>
    where
        Self: 'e;

    /// Jacobian-evaluator node for this expression's structure, against a
    /// target `T`. Built only through [`crate::JacobianEvaluator`], which
    /// handles the self-target and unrelated cases first.
    type Jac<'j, 'e: 'j, T: Expression<F>>: JacNode<F>
    where
        Self: 'e,
        T: 'j;

    /// Build the value-evaluator tree, computing each node's value bottom-up.
    fn evaluator(&self) -> Self::Eval<'_>;

    /// Build the structural Jacobian-evaluator node for this expression.
    fn jacobian_tree<'j, 'e: 'j, T: Expression<F>>(
        eval: &'j Self::Eval<'e>,
        target: &'j T,
    ) -> Self::Jac<'j, 'e, T>;

    /// Structural containment: may the subtree rooted here contain a leaf (or
    /// subexpression) of exact type `T`?
    ///
    /// This is a sound over-approximation computed from types alone, never
    /// from storage. A `false` answer proves the target cannot appear below
    /// this node, so the Jacobian evaluator skips the subtree entirely.
    fn may_contain<T: Expression<F>>() -> bool;

    /// Storage identity against another expression of the same type.
    ///
    /// Leaves compare backing storage; composite nodes recurse. Two
    /// structurally equal expressions over independently built leaves are
    /// *not* the same.
    fn is_same(&self, other: &Self) -> bool;
}

/// A unary operator node: tag `O` applied to child expression `R`.
#[derive(Clone, Copy, Debug)]
pub struct Unary<O, R> {
    pub(crate) rhs: R,
    op: PhantomData<O>,
}

impl<O, R> Unary<O, R> {
    /// Apply operator tag `O` to `rhs`.
    #[inline]
    pub fn new(rhs: R) -> Self {
        Unary {
            rhs,
            op: PhantomData,
        }
    }

    /// The child expression.
    #[inline]
    pub fn rhs(&self) -> &R {
        &self.rhs
    }
}

/// A binary operator node: tag `O` applied to children `L` and `R`.
#[derive(Clone, Copy, Debug)]
pub struct Binary<O, L, R> {
    pub(crate) lhs: L,
    pub(crate) rhs: R,
    op: PhantomData<O>,
}

impl<O, L, R> Binary<O, L, R> {
    /// Apply operator tag `O` to `lhs` and `rhs`.
    #[inline]
    pub fn new(lhs: L, rhs: R) -> Self {
        Binary {
            lhs,
            rhs,
            op: PhantomData,
        }
    }

    /// The left child expression.
    #[inline]
    pub fn lhs(&self) -> &L {
        &self.lhs
    }

    /// The right child expression.
    #[inline]
    pub fn rhs(&self) -> &R {
        &self.rhs
    }
}

impl<F, O, R> Expression<F> for Unary<O, R>
where
    F: Float,
    R: Expression<F>,
    O: crate::ops::UnaryOp<F, R::Value>,
{
    type Value = O::Output;
    const TANGENT_DIM: usize = O::TANGENT_DIM;

    type Eval<'e>
        = crate::evaluator::UnaryEval<'e, F, O, R>
    where
        Self: 'e;

    type Jac<'j, 'e: 'j, T: Expression<F>>
        = crate::jacobian::UnaryJac<'j, 'e, F, O, R, T>
    where
        Self: 'e,
        T: 'j;

    fn evaluator(&self) -> Self::Eval<'_> {
        crate::evaluator::UnaryEval::new(self)
    }

    fn jacobian_tree<'j, 'e: 'j, T: Expression<F>>(
        eval: &'j Self::Eval<'e>,
        target: &'j T,
    ) -> Self::Jac<'j, 'e, T> {
        crate::jacobian::UnaryJac::new(eval, target)
    }

    fn may_contain<T: Expression<F>>() -> bool {
        TypeId::of::<Self>() == TypeId::of::<T>() || R::may_contain::<T>()
    }

    fn is_same(&self, other: &Self) -> bool {
        self.rhs.is_same(&other.rhs)
    }
}

impl<F, O, L, R> Expression<F> for Binary<O, L, R>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: crate::ops::BinaryOp<F, L::Value, R::Value>,
{
    type Value = O::Output;
    const TANGENT_DIM: usize = O::TANGENT_DIM;

    type Eval<'e>
        = crate::evaluator::BinaryEval<'e, F, O, L, R>
    where
        Self: 'e;

    type Jac<'j, 'e: 'j, T: Expression<F>>
        = crate::jacobian::BinaryJac<'j, 'e, F, O, L, R, T>
    where
        Self: 'e,
        T: 'j;

    fn evaluator(&self) -> Self::Eval<'_> {
        crate::evaluator::BinaryEval::new(self)
    }

    fn jacobian_tree<'j, 'e: 'j, T: Expression<F>>(
        eval: &'j Self::Eval<'e>,
        target: &'j T,
    ) -> Self::Jac<'j, 'e, T> {
        crate::jacobian::BinaryJac::new(eval, target)
    }

    fn may_contain<T: Expression<F>>() -> bool {
        TypeId::of::<Self>() == TypeId::of::<T>()
            || L::may_contain::<T>()
            || R::may_contain::<T>()
    }

    fn is_same(&self, other: &Self) -> bool {
        self.lhs.is_same(&other.lhs) && self.rhs.is_same(&other.rhs)
    }
}

/// Builder methods available on every expression.
///
/// These construct operator nodes without checking operand kinds; the operand
/// requirements are enforced where the node is evaluated, through the
/// [`crate::ops::UnaryOp`]/[`crate::ops::BinaryOp`] bounds.
pub trait ExpressionExt<F: Float>: Expression<F> {
    /// L2 norm of a vector expression.
    fn norm(self) -> Unary<Norm, Self> {
        Unary::new(self)
    }

    /// Squared L2 norm of a vector expression.
    fn squared_norm(self) -> Unary<SquaredNorm, Self> {
        Unary::new(self)
    }

    /// Unit vector in the direction of a vector expression.
    fn normalized(self) -> Unary<Normalize, Self> {
        Unary::new(self)
    }

    /// Dot product of two vector expressions.
    fn dot<R>(self, rhs: R) -> Binary<Dot, Self, R> {
        Binary::new(self, rhs)
    }

    /// Apply a rotation expression to a vector expression.
    fn rotate<R>(self, rhs: R) -> Binary<Rotate, Self, R> {
        Binary::new(self, rhs)
    }

    /// Compose two rotation expressions.
    fn compose<R>(self, rhs: R) -> Binary<Compose, Self, R> {
        Binary::new(self, rhs)
    }

    /// Inverse of a rotation expression.
    fn inverse(self) -> Unary<Invert, Self> {
        Unary::new(self)
    }
}

impl<F: Float, E: Expression<F>> ExpressionExt<F> for E {}
