//! Numeric vector formulas over `nalgebra` vectors.
//!
//! Dot and cross products are nalgebra's own (`a.dot(&b)`, `a.cross(&b)`).

use crate::latex::{join_components, I_HAT, J_HAT, K_HAT};
use crate::vector_expr::VectorExpr3D;
use nalgebra::{Matrix3x1, Vector2, Vector3};

/// Pythagorean magnitude `sqrt(x^2 + y^2 + z^2)`.
pub fn magnitude(vector: &Vector3<f64>) -> f64 {
    vector.norm()
}

pub fn magnitude_2d(vector: &Vector2<f64>) -> f64 {
    vector.norm()
}

/// Unit vector parallel to `vector`. A zero vector yields NaN components.
pub fn unit_vector(vector: &Vector3<f64>) -> Vector3<f64> {
    vector / magnitude(vector)
}

pub fn unit_vector_2d(vector: &Vector2<f64>) -> Vector2<f64> {
    vector / magnitude_2d(vector)
}

/// Angle in radians between two vectors placed tail to tail.
pub fn angle_between(one: &Vector3<f64>, two: &Vector3<f64>) -> f64 {
    (one.dot(two) / (magnitude(one) * magnitude(two))).acos()
}

pub fn angle_between_2d(one: &Vector2<f64>, two: &Vector2<f64>) -> f64 {
    (one.dot(two) / (magnitude_2d(one) * magnitude_2d(two))).acos()
}

/// LaTeX component representation, e.g. `1\hat{\textbf{i}}+-2\hat{\textbf{k}}`.
/// Axes that are exactly zero are omitted.
pub fn component_representation(vector: &Vector3<f64>) -> String {
    join_components([
        (vector.x == 0.0, vector.x.to_string(), I_HAT),
        (vector.y == 0.0, vector.y.to_string(), J_HAT),
        (vector.z == 0.0, vector.z.to_string(), K_HAT),
    ])
}

pub fn component_representation_2d(vector: &Vector2<f64>) -> String {
    join_components([
        (vector.x == 0.0, vector.x.to_string(), I_HAT),
        (vector.y == 0.0, vector.y.to_string(), J_HAT),
    ])
}

pub fn to_column_matrix(vector: &Vector3<f64>) -> Matrix3x1<f64> {
    Matrix3x1::new(vector.x, vector.y, vector.z)
}

pub fn from_column_matrix(matrix: &Matrix3x1<f64>) -> Vector3<f64> {
    Vector3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)])
}

/// Lifts a numeric vector into constant symbolic components.
pub fn to_vector_expr(vector: &Vector3<f64>) -> VectorExpr3D {
    VectorExpr3D::from_vector(vector)
}
