//! Instrumented operators proving the evaluator's caching and pruning
//! contracts: each node's value is computed exactly once per value-evaluator
//! tree, and subtrees that cannot contain the target never have their local
//! partials evaluated. Custom operators plug in through the public
//! `UnaryOp`/`BinaryOp` seam.

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use geodiff::ops::UnaryOp;
use geodiff::{jacobian, value_and_jacobians, Expression, ExpressionExt, Scalar, Unary, Vec3};
use nalgebra::DMatrix;

static SQUARE_VALUES: AtomicUsize = AtomicUsize::new(0);
static SQUARE_PARTIALS: AtomicUsize = AtomicUsize::new(0);

/// x² with invocation counters. Used by `value_computed_once_per_tree` only.
struct CountingSquare;

impl UnaryOp<f64, f64> for CountingSquare {
    type Output = f64;
    const TANGENT_DIM: usize = 1;

    fn value(input: &f64) -> f64 {
        SQUARE_VALUES.fetch_add(1, Ordering::Relaxed);
        input * input
    }

    fn partial(_value: &f64, input: &f64) -> DMatrix<f64> {
        SQUARE_PARTIALS.fetch_add(1, Ordering::Relaxed);
        DMatrix::from_element(1, 1, 2.0 * input)
    }
}

#[test]
fn value_computed_once_per_tree() {
    let s = Scalar::new(3.0);
    let e = Unary::<CountingSquare, Scalar<f64>>::new(s.clone());

    // One shared value evaluator, two Jacobian evaluators: the forward rule
    // must run exactly once.
    let (value, (j1, j2)) = value_and_jacobians(&e, (&s, &s));
    assert_eq!(SQUARE_VALUES.load(Ordering::Relaxed), 1);
    assert_relative_eq!(value, 9.0);
    assert_eq!(j1, DMatrix::from_element(1, 1, 6.0));
    assert_eq!(j1, j2);
    // The local partial ran once per Jacobian query.
    assert_eq!(SQUARE_PARTIALS.load(Ordering::Relaxed), 2);
}

static PRUNED_PARTIALS: AtomicUsize = AtomicUsize::new(0);

/// x² counting local-partial invocations. Used by
/// `unrelated_subtree_is_never_visited` only.
struct PrunedSquare;

impl UnaryOp<f64, f64> for PrunedSquare {
    type Output = f64;
    const TANGENT_DIM: usize = 1;

    fn value(input: &f64) -> f64 {
        input * input
    }

    fn partial(_value: &f64, input: &f64) -> DMatrix<f64> {
        PRUNED_PARTIALS.fetch_add(1, Ordering::Relaxed);
        DMatrix::from_element(1, 1, 2.0 * input)
    }
}

#[test]
fn unrelated_subtree_is_never_visited() {
    let s = Scalar::new(3.0);
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);

    // The left subtree holds only scalar leaves; the target is a vector
    // leaf, so no Jacobian evaluator may be instantiated on that side.
    let e = Unary::<PrunedSquare, Scalar<f64>>::new(s.clone()) + a.clone().dot(b.clone());
    let j = jacobian(&e, &a);

    assert_eq!(PRUNED_PARTIALS.load(Ordering::Relaxed), 0);
    assert_eq!(j, DMatrix::from_row_slice(1, 3, &[4.0, 5.0, 6.0]));
}

#[test]
fn repeated_queries_are_pure() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    let e = a.clone().dot(b.clone());

    let eval = e.evaluator();
    let j_eval = eval.jacobian_for(&a);
    let first = j_eval.jacobian();
    let second = j_eval.jacobian();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn empty_target_tuple_returns_just_the_value() {
    let a = Vec3::new(3.0, 4.0, 0.0);
    let e = a.clone().norm();
    let (value, ()) = value_and_jacobians(&e, ());
    assert_relative_eq!(value, 5.0);
}
