//! Central-difference derivatives of sampled functions.
//!
//! `central_difference` estimates `f'(t)` from two samples half an interval either side
//! of `t`. The truncation error is `O(interval^2)`; the rounding error of the
//! subtraction grows like `eps * |f| / interval`. Neither routine picks the interval.

use crate::equation_engine::{Bindings, Expr, ExprError};
use log::trace;
use nalgebra::Vector3;

/// `(sample(time + interval/2) - sample(time - interval/2)) / interval`.
///
/// Sampling errors propagate unchanged.
pub fn central_difference<E, F>(sample: F, time: f64, interval: f64) -> Result<Vector3<f64>, E>
where
    F: Fn(f64) -> Result<Vector3<f64>, E>,
{
    let ahead = sample(time + interval / 2.0)?;
    let behind = sample(time - interval / 2.0)?;
    trace!(
        "central difference at {} over {}: {:?} - {:?}",
        time,
        interval,
        ahead,
        behind
    );
    Ok((ahead - behind) / interval)
}

/// Scalar counterpart of `central_difference` for a single expression in `variable`.
pub fn central_difference_scalar(
    expr: &Expr,
    variable: &str,
    time: f64,
    interval: f64,
) -> Result<f64, ExprError> {
    let sample = |value: f64| {
        let mut bindings = Bindings::new();
        bindings.insert(variable.to_string(), value);
        Ok::<_, ExprError>(Vector3::new(expr.evaluate(&bindings)?, 0.0, 0.0))
    };
    Ok(central_difference(sample, time, interval)?.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_expr::VectorExpr3D;

    #[test]
    fn square_has_slope_four_at_two() {
        let path = VectorExpr3D::parse("t^2", "0", "0").unwrap();
        let rate = path.finite_central_difference(2.0, 1e-3).unwrap();
        assert!((rate.x - 4.0).abs() < 1e-9);
        assert_eq!(rate.y, 0.0);
        assert_eq!(rate.z, 0.0);
    }

    #[test]
    fn scalar_difference_tracks_the_analytic_derivative() {
        let expr = Expr::parse("sin(3*x) + x^3").unwrap();
        let analytic = expr.differentiate("x").evaluate_at("x", 0.7).unwrap();
        let approx = central_difference_scalar(&expr, "x", 0.7, 1e-4).unwrap();
        assert!((approx - analytic).abs() < 1e-6);
    }

    #[test]
    fn scalar_and_vector_differences_agree_exactly() {
        let path = VectorExpr3D::parse("2000 + 100*t - t^3", "0", "0").unwrap();
        let vector = path.finite_central_difference(1.3, 1e-3).unwrap();
        let scalar = central_difference_scalar(&path.x, "t", 1.3, 1e-3).unwrap();
        assert_eq!(scalar.to_bits(), vector.x.to_bits());
    }

    #[test]
    fn closures_can_be_sampled_directly() {
        let sample = |t: f64| Ok::<_, ExprError>(Vector3::new(t.exp(), 3.0 * t, -t * t));
        let rate = central_difference(sample, 0.0, 1e-4).unwrap();
        assert!((rate - Vector3::new(1.0, 3.0, 0.0)).norm() < 1e-8);
    }

    #[test]
    fn unbound_variables_surface_as_errors() {
        let path = VectorExpr3D::parse("t", "t * w", "0").unwrap();
        assert_eq!(
            path.finite_central_difference(1.0, 1e-3),
            Err(ExprError::UnboundVariable("w".to_string()))
        );
        let expr = Expr::parse("a + t").unwrap();
        assert!(central_difference_scalar(&expr, "t", 0.0, 1e-3).is_err());
    }
}
