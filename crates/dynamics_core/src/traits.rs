use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types the expression VM can evaluate over.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A real-valued function of one real variable that can be sampled by a quadrature rule.
pub trait Integrand {
    /// Evaluates the function at `x`.
    fn value(&self, x: f64) -> f64;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64,
{
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A rule that approximates a definite integral.
pub trait Quadrature {
    /// Approximates the integral of `f` over `[a, b]`.
    /// a: lower limit
    /// b: upper limit (may be less than `a`, which flips the sign)
    fn integrate(&self, f: &impl Integrand, a: f64, b: f64) -> f64;
}
