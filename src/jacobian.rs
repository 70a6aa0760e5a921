//! The Jacobian-evaluator tree.
//!
//! A second tree that rides on top of the value evaluator and propagates
//! derivatives from one chosen target leaf up to the root by the chain rule.
//! Each node resolves, at construction, into exactly one recursion shape:
//!
//! * **self-target**: the node's type equals the target's type; the Jacobian
//!   is the identity when the storage matches, absent otherwise,
//! * **unrelated**: the structural [`Expression::may_contain`] predicate
//!   rules the target out, so no child evaluators are built at all,
//! * **nested**: recurse into the children that may contain the target and
//!   chain their Jacobians through the operator's local partials.
//!
//! "Absent" (`None`) means the true Jacobian is the zero matrix; it is never
//! materialized below the driver boundary, and no multiplication against it
//! is ever performed.

use std::any::Any;
use std::marker::PhantomData;

use nalgebra::DMatrix;

use crate::evaluator::{BinaryEval, EvalNode, UnaryEval};
use crate::expr::Expression;
use crate::float::Float;
use crate::ops::{BinaryOp, UnaryOp};

/// A node of the Jacobian-evaluator tree.
pub trait JacNode<F: Float> {
    /// The Jacobian of this node's value with respect to the target, or
    /// `None` when it is exactly zero.
    fn jacobian(&self) -> Option<DMatrix<F>>;
}

/// Jacobian evaluator for expression `E` against target `T`.
///
/// Construction resolves the recursion shape once; [`Self::jacobian`] is then
/// a pure query over the cached values. The result has shape
/// `(E::TANGENT_DIM, T::TANGENT_DIM)` when present.
pub struct JacobianEvaluator<'j, 'e, F, E, T>
where
    'e: 'j,
    F: Float,
    E: Expression<F>,
    T: Expression<F>,
{
    kind: Kind<'j, 'e, F, E, T>,
}

enum Kind<'j, 'e, F, E, T>
where
    'e: 'j,
    F: Float,
    E: Expression<F>,
    T: Expression<F>,
{
    /// `E` and `T` are the same expression type. `is_same` caches the storage
    /// identity check made at construction.
    SelfTarget { is_same: bool },
    /// The target type provably cannot occur in this subtree.
    Unrelated,
    /// Recurse through the expression's structure.
    Nested(E::Jac<'j, 'e, T>),
}

impl<'j, 'e: 'j, F, E, T> JacobianEvaluator<'j, 'e, F, E, T>
where
    F: Float,
    E: Expression<F>,
    T: Expression<F>,
{
    /// Build the Jacobian evaluator for `eval`'s expression against `target`.
    ///
    /// The self-target check comes first so that a shared subexpression used
    /// as the target yields the identity at the matching node; the structural
    /// containment check then prunes subtrees that cannot hold the target.
    pub fn new(eval: &'j E::Eval<'e>, target: &'j T) -> Self {
        let kind = if let Some(same_typed) = (target as &dyn Any).downcast_ref::<E>() {
            Kind::SelfTarget {
                is_same: eval.expr().is_same(same_typed),
            }
        } else if E::may_contain::<T>() {
            Kind::Nested(E::jacobian_tree(eval, target))
        } else {
            Kind::Unrelated
        };
        JacobianEvaluator { kind }
    }

    /// The Jacobian, or `None` when it is exactly zero.
    ///
    /// Pure: depends only on the cached values and the target, and recomputes
    /// on every call. Callers wanting the matrix repeatedly should store it.
    pub fn jacobian(&self) -> Option<DMatrix<F>> {
        match &self.kind {
            // d(x)/d(x) is the identity.
            Kind::SelfTarget { is_same: true } => {
                Some(DMatrix::identity(E::TANGENT_DIM, E::TANGENT_DIM))
            }
            // Same type over different storage is an independent variable;
            // an unrelated subtree cannot depend on the target at all.
            Kind::SelfTarget { is_same: false } | Kind::Unrelated => None,
            Kind::Nested(node) => node.jacobian(),
        }
    }
}

impl<'j, 'e: 'j, F, E, T> JacNode<F> for JacobianEvaluator<'j, 'e, F, E, T>
where
    F: Float,
    E: Expression<F>,
    T: Expression<F>,
{
    fn jacobian(&self) -> Option<DMatrix<F>> {
        JacobianEvaluator::jacobian(self)
    }
}

/// Structural Jacobian node for a leaf.
///
/// Never queried in practice: a leaf either matches the target type (handled
/// by the self-target case) or cannot contain it (handled by the unrelated
/// case). Exists to give leaves a `Jac` associated type.
pub struct LeafJac<F> {
    _marker: PhantomData<F>,
}

impl<F> LeafJac<F> {
    pub(crate) fn new() -> Self {
        LeafJac {
            _marker: PhantomData,
        }
    }
}

impl<F: Float> JacNode<F> for LeafJac<F> {
    fn jacobian(&self) -> Option<DMatrix<F>> {
        None
    }
}

/// Jacobian node for a unary operator: chains the child's Jacobian through
/// the operator's local partial.
pub struct UnaryJac<'j, 'e, F, O, R, T>
where
    'e: 'j,
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
    T: Expression<F>,
{
    eval: &'j UnaryEval<'e, F, O, R>,
    rhs: JacobianEvaluator<'j, 'e, F, R, T>,
}

impl<'j, 'e: 'j, F, O, R, T> UnaryJac<'j, 'e, F, O, R, T>
where
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
    T: Expression<F>,
{
    pub(crate) fn new(eval: &'j UnaryEval<'e, F, O, R>, target: &'j T) -> Self {
        UnaryJac {
            eval,
            rhs: JacobianEvaluator::new(eval.rhs_eval(), target),
        }
    }
}

impl<'j, 'e: 'j, F, O, R, T> JacNode<F> for UnaryJac<'j, 'e, F, O, R, T>
where
    F: Float,
    R: Expression<F>,
    O: UnaryOp<F, R::Value>,
    T: Expression<F>,
{
    fn jacobian(&self) -> Option<DMatrix<F>> {
        self.rhs.jacobian().map(|rhs_jac| {
            O::partial(self.eval.value(), self.eval.rhs_eval().value()) * rhs_jac
        })
    }
}

/// Jacobian node for a binary operator.
///
/// A child Jacobian evaluator is constructed only for sides whose subtree may
/// contain the target; the other side is never visited. Present children are
/// combined as `left_partial · Jl + right_partial · Jr`, dropping the terms
/// whose Jacobian is absent.
pub struct BinaryJac<'j, 'e, F, O, L, R, T>
where
    'e: 'j,
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
    T: Expression<F>,
{
    eval: &'j BinaryEval<'e, F, O, L, R>,
    lhs: Option<JacobianEvaluator<'j, 'e, F, L, T>>,
    rhs: Option<JacobianEvaluator<'j, 'e, F, R, T>>,
}

impl<'j, 'e: 'j, F, O, L, R, T> BinaryJac<'j, 'e, F, O, L, R, T>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
    T: Expression<F>,
{
    pub(crate) fn new(eval: &'j BinaryEval<'e, F, O, L, R>, target: &'j T) -> Self {
        let lhs = if L::may_contain::<T>() {
            Some(JacobianEvaluator::new(eval.lhs_eval(), target))
        } else {
            None
        };
        let rhs = if R::may_contain::<T>() {
            Some(JacobianEvaluator::new(eval.rhs_eval(), target))
        } else {
            None
        };
        BinaryJac { eval, lhs, rhs }
    }
}

impl<'j, 'e: 'j, F, O, L, R, T> JacNode<F> for BinaryJac<'j, 'e, F, O, L, R, T>
where
    F: Float,
    L: Expression<F>,
    R: Expression<F>,
    O: BinaryOp<F, L::Value, R::Value>,
    T: Expression<F>,
{
    fn jacobian(&self) -> Option<DMatrix<F>> {
        let lhs_jac = self.lhs.as_ref().and_then(|l| l.jacobian());
        let rhs_jac = self.rhs.as_ref().and_then(|r| r.jacobian());
        let value = self.eval.value();
        let lhs_value = self.eval.lhs_eval().value();
        let rhs_value = self.eval.rhs_eval().value();
        match (lhs_jac, rhs_jac) {
            (Some(lj), Some(rj)) => Some(
                O::left_partial(value, lhs_value, rhs_value) * lj
                    + O::right_partial(value, lhs_value, rhs_value) * rj,
            ),
            (Some(lj), None) => Some(O::left_partial(value, lhs_value, rhs_value) * lj),
            (None, Some(rj)) => Some(O::right_partial(value, lhs_value, rhs_value) * rj),
            (None, None) => None,
        }
    }
}
