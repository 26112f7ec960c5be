use crate::equation_engine::{Bindings, Expr, ExprError};
use crate::finite_difference::central_difference;
use crate::latex::{join_components, I_HAT, J_HAT, K_HAT};
use nalgebra::Vector3;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Name of the time variable bound by `solve_at_time` and differentiated by the
/// kinematic helpers.
pub const TIME_VARIABLE: &str = "t";

/// A 3D vector whose components are symbolic expressions.
///
/// Arithmetic between vectors is component-wise (`x` with `x`, `y` with `y`, ...); only
/// `cross` mixes axes.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorExpr3D {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
}

impl VectorExpr3D {
    pub fn new(x: Expr, y: Expr, z: Expr) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(Expr::zero(), Expr::zero(), Expr::zero())
    }

    pub fn from_vector(vector: &Vector3<f64>) -> Self {
        Self::new(
            Expr::num(vector.x),
            Expr::num(vector.y),
            Expr::num(vector.z),
        )
    }

    /// Parses one expression per axis.
    pub fn parse(x: &str, y: &str, z: &str) -> Result<Self, ExprError> {
        Ok(Self::new(Expr::parse(x)?, Expr::parse(y)?, Expr::parse(z)?))
    }

    pub fn cross(&self, other: &VectorExpr3D) -> VectorExpr3D {
        VectorExpr3D::new(
            &self.y * &other.z - &self.z * &other.y,
            &self.z * &other.x - &self.x * &other.z,
            &self.x * &other.y - &self.y * &other.x,
        )
    }

    pub fn differentiate(&self, var: &str) -> VectorExpr3D {
        self.map(|axis| axis.differentiate(var))
    }

    pub fn simplify(&self) -> VectorExpr3D {
        self.map(Expr::simplify)
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<Vector3<f64>, ExprError> {
        Ok(Vector3::new(
            self.x.evaluate(bindings)?,
            self.y.evaluate(bindings)?,
            self.z.evaluate(bindings)?,
        ))
    }

    /// Evaluates every axis with `t` bound to `time`.
    pub fn solve_at_time(&self, time: f64) -> Result<Vector3<f64>, ExprError> {
        let mut bindings = Bindings::new();
        bindings.insert(TIME_VARIABLE.to_string(), time);
        self.evaluate(&bindings)
    }

    /// Approximates `dr/dt` at `time` as `(r(time + interval/2) - r(time - interval/2)) / interval`.
    ///
    /// The truncation error shrinks with `interval^2`, but cancellation in the numerator
    /// grows as `interval` approaches machine precision relative to the components.
    /// Milliseconds are a reasonable interval for position magnitudes in the thousands.
    pub fn finite_central_difference(
        &self,
        time: f64,
        interval: f64,
    ) -> Result<Vector3<f64>, ExprError> {
        central_difference(|t| self.solve_at_time(t), time, interval)
    }

    /// Spherical position `(r cos(beta) cos(theta), r cos(beta) sin(theta), r sin(beta))`
    /// for distance `r(t)`, azimuth `theta(t)` and elevation `beta(t)`. Differentiate it
    /// numerically with `finite_central_difference` for an approximate velocity.
    pub fn position_vector_approx(r: &Expr, theta: &Expr, beta: &Expr) -> VectorExpr3D {
        let cos_beta = Expr::cos(beta.clone());
        let sin_beta = Expr::sin(beta.clone());
        let cos_theta = Expr::cos(theta.clone());
        let sin_theta = Expr::sin(theta.clone());
        VectorExpr3D::new(
            r * &cos_beta * cos_theta,
            r * &cos_beta * sin_theta,
            r * &sin_beta,
        )
    }

    /// Velocity of the spherical position above by analytic differentiation with
    /// respect to `t`: the `r'`, `theta'` and `beta'` contributions summed.
    pub fn position_vector(r: &Expr, theta: &Expr, beta: &Expr) -> VectorExpr3D {
        let cos_beta = Expr::cos(beta.clone());
        let sin_beta = Expr::sin(beta.clone());
        let cos_theta = Expr::cos(theta.clone());
        let sin_theta = Expr::sin(theta.clone());
        let r_dot = r.differentiate(TIME_VARIABLE);
        let theta_dot = theta.differentiate(TIME_VARIABLE);
        let beta_dot = beta.differentiate(TIME_VARIABLE);

        let radial = VectorExpr3D::new(
            &r_dot * &cos_beta * &cos_theta,
            &r_dot * &cos_beta * &sin_theta,
            &r_dot * &sin_beta,
        );
        let azimuthal = VectorExpr3D::new(
            &theta_dot * -(r * &cos_beta * &sin_theta),
            &theta_dot * r * &cos_beta * &cos_theta,
            Expr::zero(),
        );
        let elevation = VectorExpr3D::new(
            &beta_dot * -(r * &sin_beta * &cos_theta),
            &beta_dot * -(r * &sin_beta * &sin_theta),
            &beta_dot * r * &cos_beta,
        );
        radial + azimuthal + elevation
    }

    /// LaTeX component representation. Axes that simplify to zero are omitted.
    pub fn component_representation(&self) -> String {
        let axes = [(&self.x, I_HAT), (&self.y, J_HAT), (&self.z, K_HAT)];
        join_components(axes.into_iter().map(|(axis, hat)| {
            let simplified = axis.simplify();
            (simplified.is_zero(), simplified.to_latex(), hat)
        }))
    }

    fn map(&self, f: impl Fn(&Expr) -> Expr) -> VectorExpr3D {
        VectorExpr3D::new(f(&self.x), f(&self.y), f(&self.z))
    }
}

impl fmt::Display for VectorExpr3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

macro_rules! impl_componentwise_op {
    ($trait:ident, $method:ident) => {
        impl $trait<VectorExpr3D> for VectorExpr3D {
            type Output = VectorExpr3D;
            fn $method(self, rhs: VectorExpr3D) -> VectorExpr3D {
                VectorExpr3D::new(self.x.$method(rhs.x), self.y.$method(rhs.y), self.z.$method(rhs.z))
            }
        }

        impl $trait<&VectorExpr3D> for &VectorExpr3D {
            type Output = VectorExpr3D;
            fn $method(self, rhs: &VectorExpr3D) -> VectorExpr3D {
                VectorExpr3D::new(
                    (&self.x).$method(&rhs.x),
                    (&self.y).$method(&rhs.y),
                    (&self.z).$method(&rhs.z),
                )
            }
        }

        impl $trait<f64> for VectorExpr3D {
            type Output = VectorExpr3D;
            fn $method(self, rhs: f64) -> VectorExpr3D {
                VectorExpr3D::new(self.x.$method(rhs), self.y.$method(rhs), self.z.$method(rhs))
            }
        }

        impl $trait<f64> for &VectorExpr3D {
            type Output = VectorExpr3D;
            fn $method(self, rhs: f64) -> VectorExpr3D {
                VectorExpr3D::new(
                    (&self.x).$method(rhs),
                    (&self.y).$method(rhs),
                    (&self.z).$method(rhs),
                )
            }
        }
    };
}

impl_componentwise_op!(Add, add);
impl_componentwise_op!(Sub, sub);
impl_componentwise_op!(Mul, mul);
impl_componentwise_op!(Div, div);

impl Mul<VectorExpr3D> for f64 {
    type Output = VectorExpr3D;
    fn mul(self, rhs: VectorExpr3D) -> VectorExpr3D {
        VectorExpr3D::new(self * rhs.x, self * rhs.y, self * rhs.z)
    }
}

impl Mul<&VectorExpr3D> for f64 {
    type Output = VectorExpr3D;
    fn mul(self, rhs: &VectorExpr3D) -> VectorExpr3D {
        VectorExpr3D::new(self * &rhs.x, self * &rhs.y, self * &rhs.z)
    }
}

impl Neg for VectorExpr3D {
    type Output = VectorExpr3D;
    fn neg(self) -> VectorExpr3D {
        VectorExpr3D::new(-self.x, -self.y, -self.z)
    }
}

impl Neg for &VectorExpr3D {
    type Output = VectorExpr3D;
    fn neg(self) -> VectorExpr3D {
        VectorExpr3D::new(-&self.x, -&self.y, -&self.z)
    }
}
