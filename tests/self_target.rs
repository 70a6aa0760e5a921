//! Self-target identity: storage identity decides, structural equality never
//! does, and composite expressions can themselves be targets.

use geodiff::{jacobian, Scalar, Vec3};
use nalgebra::DMatrix;

#[test]
fn leaf_wrt_itself_is_identity() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(jacobian(&a, &a), DMatrix::identity(3, 3));

    let s = Scalar::new(5.0);
    assert_eq!(jacobian(&s, &s), DMatrix::identity(1, 1));
}

#[test]
fn cloned_leaf_is_the_same_variable() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let alias = a.clone();
    assert_eq!(jacobian(&alias, &a), DMatrix::identity(3, 3));
}

#[test]
fn root_shared_composite_target_is_identity() {
    // Differentiating an expression with respect to itself yields the
    // identity of the root's tangent shape.
    let s = Scalar::new(2.0);
    let a = Vec3::new(1.0, 2.0, 3.0);
    let e = s.clone() * a.clone();
    assert_eq!(jacobian(&e, &e), DMatrix::identity(3, 3));

    // A clone shares every leaf's storage, so it is the same expression.
    let t = e.clone();
    assert_eq!(jacobian(&e, &t), DMatrix::identity(3, 3));
}

#[test]
fn structurally_equal_composite_is_not_the_same() {
    let e = Scalar::new(2.0) * Vec3::new(1.0, 2.0, 3.0);
    let other = Scalar::new(2.0) * Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(jacobian(&e, &other), DMatrix::zeros(3, 3));
}

#[test]
fn nested_shared_subexpression_target() {
    // The shared inner sum is found below the root; its node yields the
    // identity and chains through the scale's partial.
    let s = Scalar::new(2.0);
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    let inner = a.clone() + b.clone();
    let outer = s.clone() * inner.clone();
    assert_eq!(
        jacobian(&outer, &inner),
        DMatrix::from_diagonal_element(3, 3, 2.0)
    );
}

#[test]
fn swapped_operands_are_not_the_same_expression() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    let e = a.clone() + b.clone();
    let swapped = b.clone() + a.clone();
    assert_eq!(jacobian(&e, &swapped), DMatrix::zeros(3, 3));
}
