//! Forward evaluation across the operator library.

use approx::assert_relative_eq;
use geodiff::{evaluate, ExpressionExt, Rot3, Scalar, Vec3};
use nalgebra::Vector3;

#[test]
fn sum_of_vectors() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    assert_eq!(
        evaluate(&(a.clone() + b.clone())),
        Vector3::new(5.0, 7.0, 9.0)
    );
}

#[test]
fn difference_desugars_to_sum_with_negation() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    assert_eq!(
        evaluate(&(a.clone() - b.clone())),
        Vector3::new(-3.0, -3.0, -3.0)
    );
    assert_eq!(evaluate(&(-a.clone())), Vector3::new(-1.0, -2.0, -3.0));
}

#[test]
fn scale_forms() {
    let s = Scalar::new(2.0);
    let a = Vec3::new(1.0, 2.0, 3.0);
    let expected = Vector3::new(2.0, 4.0, 6.0);

    assert_eq!(evaluate(&(s.clone() * a.clone())), expected);
    assert_eq!(evaluate(&(a.clone() * s.clone())), expected);
    // Literals on the left lift into constant Scalar leaves.
    assert_eq!(evaluate(&(2.0 * a.clone())), expected);
    assert_eq!(evaluate(&(s.clone() * s.clone())), 4.0);
}

#[test]
fn division_by_scalar() {
    let s = Scalar::new(2.0);
    let a = Vec3::new(2.0, 4.0, 6.0);
    assert_eq!(
        evaluate(&(a.clone() / s.clone())),
        Vector3::new(1.0, 2.0, 3.0)
    );
    assert_eq!(evaluate(&(Scalar::new(3.0) / s.clone())), 1.5);
}

#[test]
fn norms_and_dot() {
    let a = Vec3::new(3.0, 4.0, 0.0);
    let b = Vec3::new(1.0, 0.0, -2.0);

    assert_relative_eq!(evaluate(&a.clone().norm()), 5.0);
    assert_relative_eq!(evaluate(&a.clone().squared_norm()), 25.0);
    assert_relative_eq!(evaluate(&a.clone().dot(b.clone())), 3.0);
    assert_relative_eq!(
        evaluate(&a.clone().normalized()),
        Vector3::new(0.6, 0.8, 0.0)
    );
}

#[test]
fn nested_expression() {
    let s = Scalar::new(0.5);
    let a = Vec3::new(1.0, 2.0, 2.0);
    let b = Vec3::new(1.0, 0.0, 0.0);
    // ‖0.5·a + b‖ = ‖(1.5, 1, 1)‖
    let e = (s.clone() * a.clone() + b.clone()).norm();
    assert_relative_eq!(evaluate(&e), (1.5f64 * 1.5 + 2.0).sqrt());
}

#[test]
fn rotation_operators() {
    let r1 = Rot3::from_scaled_axis(Vector3::new(0.3, -0.2, 0.5));
    let r2 = Rot3::from_scaled_axis(Vector3::new(-0.1, 0.4, 0.2));
    let a = Vec3::new(1.0, 2.0, -0.5);
    let (q1, q2, v) = (r1.value(), r2.value(), a.value());

    assert_relative_eq!(
        evaluate(&r1.clone().rotate(a.clone())),
        q1.transform_vector(&v),
        epsilon = 1e-12
    );

    let composed = evaluate(&r1.clone().compose(r2.clone()));
    assert_relative_eq!(composed.angle_to(&(q1 * q2)), 0.0, epsilon = 1e-12);

    let inverted = evaluate(&r1.clone().inverse());
    assert_relative_eq!(inverted.angle_to(&q1.inverse()), 0.0, epsilon = 1e-12);

    // Rotating by q then q⁻¹ is the identity on the vector.
    let round_trip = r1.clone().inverse().rotate(r1.clone().rotate(a.clone()));
    assert_relative_eq!(evaluate(&round_trip), v, epsilon = 1e-12);
}

#[test]
fn scalar_chain() {
    let s = Scalar::new(3.0);
    let t = Scalar::new(4.0);
    // s·t + s
    let e = s.clone() * t.clone() + s.clone();
    assert_relative_eq!(evaluate(&e), 15.0);
}
