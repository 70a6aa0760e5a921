//! Differentiable geometry expressions with forward-mode Jacobians.
//!
//! geodiff builds typed symbolic expression trees over vector, scalar, and
//! rotation leaves, evaluates them to concrete values, and computes the
//! Jacobian of the result with respect to any chosen leaf in a single tree
//! traversal. Derivatives propagate from the leaf toward the root by the
//! chain rule; subtrees that provably cannot contain the target are never
//! visited, and zero Jacobians are never materialized below the driver
//! boundary.
//!
//! Leaves are identified by storage, not by value: cloning a leaf handle
//! aliases the same variable, while separately built leaves with equal
//! coefficients are independent (`∂x/∂y = 0`).
//!
//! ```
//! use geodiff::{jacobian, ExpressionExt, Scalar, Vec3};
//!
//! let s = Scalar::new(2.0);
//! let a = Vec3::new(1.0, 2.0, 3.0);
//!
//! // ∂(s·a)/∂a = s·I₃
//! let j = jacobian(&(s.clone() * a.clone()), &a);
//! assert_eq!(j, nalgebra::DMatrix::from_diagonal_element(3, 3, 2.0));
//!
//! // ∂‖a‖²/∂a = 2aᵀ
//! let j = jacobian(&a.clone().squared_norm(), &a);
//! assert_eq!(j, nalgebra::DMatrix::from_row_slice(1, 3, &[2.0, 4.0, 6.0]));
//! ```

pub mod api;
pub mod evaluator;
pub mod expr;
pub mod float;
pub mod jacobian;
pub mod leaf;
pub mod ops;
mod std_ops;

pub use api::{evaluate, jacobian, value_and_jacobians, TargetSet, WrtTarget};
pub use evaluator::EvalNode;
pub use expr::{Binary, Expression, ExpressionExt, Unary};
pub use float::Float;
pub use jacobian::{JacNode, JacobianEvaluator};
pub use leaf::{Leaf, Rot3, Scalar, Vec3};

/// Type alias for 3-vector leaves over `f64`.
pub type Vec3d = Vec3<f64>;
/// Type alias for 3-vector leaves over `f32`.
pub type Vec3f = Vec3<f32>;
/// Type alias for rotation leaves over `f64`.
pub type Rot3d = Rot3<f64>;
/// Type alias for rotation leaves over `f32`.
pub type Rot3f = Rot3<f32>;
