//! Rotation matrices for changing between coordinate frames.
//!
//! The matrices are passive: `R * p` expresses a point given in the fixed frame in the
//! rotated frame, and `R^T * p` goes back. Compose body-fixed rotations by multiplying
//! the later rotation on the left, e.g. `rotation_matrix_y(b) * rotation_matrix_z(a)`.

use crate::vector::{from_column_matrix, to_column_matrix};
use nalgebra::{Matrix3, Vector3};

/// Frame rotated by `angle` radians about the x axis.
pub fn rotation_matrix_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

/// Frame rotated by `angle` radians about the y axis.
pub fn rotation_matrix_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    )
}

/// Frame rotated by `angle` radians about the z axis.
pub fn rotation_matrix_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Components of `point` in the frame `rotation` maps into.
pub fn transform(rotation: &Matrix3<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    from_column_matrix(&(rotation * to_column_matrix(point)))
}

/// Components of `point` back in the frame `rotation` maps from.
pub fn inverse_transform(rotation: &Matrix3<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    from_column_matrix(&(rotation.transpose() * to_column_matrix(point)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn degrees(angle: f64) -> f64 {
        angle * PI / 180.0
    }

    #[test]
    fn composed_rotation_moves_points_between_frames() {
        // Ex 3.3
        let rotation = rotation_matrix_y(degrees(65.0)) * rotation_matrix_z(degrees(-145.0));
        let expected = Matrix3::new(
            -0.34618861305875404, -0.24240387650610415, -0.9063077870366499, //
            0.5735764363510464, -0.8191520442889916, 0.0, //
            -0.7424038765061038, -0.5198367907256848, 0.42261826174069944,
        );
        assert_abs_diff_eq!(rotation, expected, epsilon = 1e-12);

        let point = Vector3::new(2.0, -4.0, 3.0);
        assert_abs_diff_eq!(
            transform(&rotation, &point),
            Vector3::new(-2.4417, 4.4238, 1.8624),
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(
            inverse_transform(&rotation, &point),
            Vector3::new(-5.2139, 1.2323, -0.5448),
            epsilon = 1e-4
        );
    }

    #[test]
    fn rotations_are_orthonormal_and_invertible() {
        let point = Vector3::new(0.3, -1.7, 2.2);
        for rotation in [
            rotation_matrix_x(0.4),
            rotation_matrix_y(-1.1),
            rotation_matrix_z(2.9),
        ] {
            assert_abs_diff_eq!(rotation * rotation.transpose(), Matrix3::identity(), epsilon = 1e-12);
            assert_abs_diff_eq!(rotation.determinant(), 1.0, epsilon = 1e-12);
            let there = transform(&rotation, &point);
            assert_abs_diff_eq!(inverse_transform(&rotation, &there), point, epsilon = 1e-12);
        }
    }

    #[test]
    fn quarter_turn_about_z_is_passive() {
        // The new x axis points along the old y axis, so the old y axis reads as +x.
        let rotation = rotation_matrix_z(PI / 2.0);
        assert_abs_diff_eq!(
            transform(&rotation, &Vector3::new(0.0, 1.0, 0.0)),
            Vector3::new(1.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        let about_x = rotation_matrix_x(PI / 2.0);
        assert_abs_diff_eq!(
            transform(&about_x, &Vector3::new(0.0, 0.0, 1.0)),
            Vector3::new(0.0, 1.0, 0.0),
            epsilon = 1e-12
        );
    }
}
