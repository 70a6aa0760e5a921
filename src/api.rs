//! Driver functions: evaluate an expression, compute Jacobians against one
//! or more targets, and target resolution.

use nalgebra::DMatrix;

use crate::evaluator::EvalNode;
use crate::expr::Expression;
use crate::float::Float;
use crate::jacobian::JacobianEvaluator;

/// Resolves a user-supplied differentiation target to the leaf identity to
/// compare against.
///
/// For expressions (leaves included) this is a passthrough. It is the
/// extension point for proxy or alias types that differentiate with respect
/// to another object.
pub trait WrtTarget<F: Float> {
    /// The expression actually differentiated against.
    type Target: Expression<F>;

    /// The resolved target.
    fn wrt(&self) -> &Self::Target;
}

impl<F: Float, E: Expression<F>> WrtTarget<F> for E {
    type Target = E;

    #[inline]
    fn wrt(&self) -> &E {
        self
    }
}

/// Evaluate an expression to its plain value.
///
/// Builds the value-evaluator tree (each node computed exactly once,
/// children first) and returns the root's value.
///
/// ```
/// use geodiff::{evaluate, ExpressionExt, Vec3};
///
/// let a = Vec3::new(3.0, 4.0, 0.0);
/// assert_eq!(evaluate(&a.clone().norm()), 5.0);
/// ```
pub fn evaluate<F: Float, E: Expression<F>>(expr: &E) -> E::Value {
    expr.evaluator().value().clone()
}

/// Compute the Jacobian of `expr` with respect to `target`.
///
/// The result has shape `(E::TANGENT_DIM, Target::TANGENT_DIM)`. An absent
/// Jacobian (the target does not occur in the expression) is materialized
/// here, and only here, as an explicit zero matrix.
///
/// Targets are compared by storage identity: cloning a leaf aliases the same
/// variable, while a separately built leaf with equal value is independent.
///
/// ```
/// use geodiff::{jacobian, Vec3};
///
/// let a = Vec3::new(1.0, 2.0, 3.0);
/// let b = Vec3::new(4.0, 5.0, 6.0);
/// let j = jacobian(&(a.clone() + b.clone()), &a);
/// assert_eq!(j, nalgebra::DMatrix::identity(3, 3));
/// ```
pub fn jacobian<F: Float, E: Expression<F>, W: WrtTarget<F>>(
    expr: &E,
    target: &W,
) -> DMatrix<F> {
    let v_eval = expr.evaluator();
    one_jacobian::<F, E, W::Target>(&v_eval, target.wrt())
}

/// Compute one Jacobian over an existing value-evaluator tree.
fn one_jacobian<'j, 'e: 'j, F: Float, E: Expression<F>, T: Expression<F>>(
    eval: &'j E::Eval<'e>,
    target: &'j T,
) -> DMatrix<F> {
    let j_eval = JacobianEvaluator::<F, E, T>::new(eval, target);
    j_eval
        .jacobian()
        .unwrap_or_else(|| DMatrix::zeros(E::TANGENT_DIM, T::TANGENT_DIM))
}

/// A tuple of differentiation targets for [`value_and_jacobians`].
///
/// Implemented for tuples of target references up to arity 4 (and for the
/// empty tuple, which yields no Jacobians).
pub trait TargetSet<F: Float, E: Expression<F>> {
    /// One `DMatrix` per target, in target order.
    type Jacobians;

    /// Compute all Jacobians over one shared value-evaluator tree.
    fn jacobians<'j, 'e: 'j>(&'j self, eval: &'j E::Eval<'e>) -> Self::Jacobians;
}

impl<F: Float, E: Expression<F>> TargetSet<F, E> for () {
    type Jacobians = ();

    fn jacobians<'j, 'e: 'j>(&'j self, _eval: &'j E::Eval<'e>) {}
}

macro_rules! jacobian_ty {
    ($W:ident) => { DMatrix<F> };
}

macro_rules! impl_target_set {
    ($($W:ident . $idx:tt),+) => {
        impl<'t, F: Float, E: Expression<F>, $($W: WrtTarget<F>),+> TargetSet<F, E>
            for ($(&'t $W,)+)
        {
            type Jacobians = ($(jacobian_ty!($W),)+);

            fn jacobians<'j, 'e: 'j>(&'j self, eval: &'j E::Eval<'e>) -> Self::Jacobians {
                ($(one_jacobian::<F, E, $W::Target>(eval, self.$idx.wrt()),)+)
            }
        }
    };
}

impl_target_set!(W0.0);
impl_target_set!(W0.0, W1.1);
impl_target_set!(W0.0, W1.1, W2.2);
impl_target_set!(W0.0, W1.1, W2.2, W3.3);

/// Evaluate an expression and compute its Jacobians against several targets
/// over a single shared value-evaluator tree.
///
/// The value evaluator is built once; every target gets its own Jacobian
/// evaluator borrowing the same cached values. Output order matches target
/// order. Passing `()` returns just the value.
///
/// ```
/// use geodiff::{value_and_jacobians, Scalar, Vec3};
///
/// let s = Scalar::new(2.0);
/// let a = Vec3::new(1.0, 0.0, 0.0);
/// let (value, (j_s, j_a)) = value_and_jacobians(&(s.clone() * a.clone()), (&s, &a));
/// assert_eq!(value, nalgebra::Vector3::new(2.0, 0.0, 0.0));
/// assert_eq!(j_s, nalgebra::DMatrix::from_column_slice(3, 1, &[1.0, 0.0, 0.0]));
/// assert_eq!(j_a, nalgebra::DMatrix::from_diagonal_element(3, 3, 2.0));
/// ```
pub fn value_and_jacobians<F: Float, E: Expression<F>, TS: TargetSet<F, E>>(
    expr: &E,
    targets: TS,
) -> (E::Value, TS::Jacobians) {
    let v_eval = expr.evaluator();
    let jacobians = targets.jacobians(&v_eval);
    (v_eval.value().clone(), jacobians)
}
