//! The value-evaluator tree.
//!
//! A tree isomorphic to the expression, built children-first, each node
//! computing and caching its value exactly once at construction. After that,
//! `value()` is a pure lookup; the tree is immutable and safe to share.
//! Jacobian evaluators ([`crate::jacobian`]) borrow this tree for the cached
//! values at every node.

use crate::expr::{Binary, Expression, Unary};
use crate::float::Float;
use crate::jacobian::JacobianEvaluator;
use crate::leaf::Leaf;
use crate::ops::{BinaryOp, UnaryOp};

/// A node of the value-evaluator tree for expression type `E`.
pub trait EvalNode<'e, F: Float, E: Expression<F>> {
    /// The expression node this evaluator was built from.
    fn expr(&self) -> &'e E;

    /// The cached value, computed once at construction.
    fn value(&self) -> &E::Value;
}

/// Value evaluator for a leaf: copies the stored value out once.
pub struct LeafEval<'e, F: Float, L: Leaf<F>> {
    expr: &'e L,
    value: L::Value,
}

impl<'e, F: Float, L: Leaf<F>> LeafEval<'e, F, L> {
    pub(crate) fn new(expr: &'e L) -> Self {
        LeafEval {
            expr,
            value: expr.stored(),
        }
    }

    /// Build a Jacobian evaluator over this tree against `target`.
    pub fn jacobian_for<'j, T>(&'j self, target: &'j T) -> JacobianEvaluator<'j, 'e, F, L, T>
    where
        T: Expression<F>,
        L: Expression<F, Eval<'e> = Self>,
    {
        JacobianEvaluator::new(self, target)
    }
}

impl<'e, F: Float, L: Leaf<F>> EvalNode<'e, F, L> for LeafEval<'e, F, L> {
    fn expr(&self) -> &'e L {
        self.expr
    }

    fn value(&self) -> &L::Value {
        &self.value
    }
}

/// Value evaluator for a unary operator node.
pub struct UnaryEval<'e, F, O, R>
where
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
{
    expr: &'e Unary<O, R>,
    rhs: R::Eval<'e>,
    value: O::Output,
}

impl<'e, F, O, R> UnaryEval<'e, F, O, R>
where
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
{
    pub(crate) fn new(expr: &'e Unary<O, R>) -> Self {
        let rhs = expr.rhs().evaluator();
        let value = O::value(rhs.value());
        UnaryEval { expr, rhs, value }
    }

    /// The child's value-evaluator node.
    pub fn rhs_eval(&self) -> &R::Eval<'e> {
        &self.rhs
    }

    /// Build a Jacobian evaluator over this tree against `target`.
    pub fn jacobian_for<'j, T: Expression<F>>(
        &'j self,
        target: &'j T,
    ) -> JacobianEvaluator<'j, 'e, F, Unary<O, R>, T> {
        JacobianEvaluator::new(self, target)
    }
}

impl<'e, F, O, R> EvalNode<'e, F, Unary<O, R>> for UnaryEval<'e, F, O, R>
where
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
{
    fn expr(&self) -> &'e Unary<O, R> {
        self.expr
    }

    fn value(&self) -> &O::Output {
        &self.value
    }
}

/// Value evaluator for a binary operator node.
pub struct BinaryEval<'e, F, O, L, R>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
{
    expr: &'e Binary<O, L, R>,
    lhs: L::Eval<'e>,
    rhs: R::Eval<'e>,
    value: O::Output,
}

impl<'e, F, O, L, R> BinaryEval<'e, F, O, L, R>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
{
    pub(crate) fn new(expr: &'e Binary<O, L, R>) -> Self {
        let lhs = expr.lhs().evaluator();
        let rhs = expr.rhs().evaluator();
        let value = O::value(lhs.value(), rhs.value());
        BinaryEval {
            expr,
            lhs,
            rhs,
            value,
        }
    }

    /// The left child's value-evaluator node.
    pub fn lhs_eval(&self) -> &L::Eval<'e> {
        &self.lhs
    }

    /// The right child's value-evaluator node.
    pub fn rhs_eval(&self) -> &R::Eval<'e> {
        &self.rhs
    }

    /// Build a Jacobian evaluator over this tree against `target`.
    pub fn jacobian_for<'j, T: Expression<F>>(
        &'j self,
        target: &'j T,
    ) -> JacobianEvaluator<'j, 'e, F, Binary<O, L, R>, T> {
        JacobianEvaluator::new(self, target)
    }
}

impl<'e, F, O, L, R> EvalNode<'e, F, Binary<O, L, R>> for BinaryEval<'e, F, O, L, R>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
{
    fn expr(&self) -> &'e Binary<O, L, R> {
        self.expr
    }

    fn value(&self) -> &O::Output {
        &self.value
    }
}
