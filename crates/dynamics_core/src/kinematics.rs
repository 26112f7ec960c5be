//! Particle kinematics in path variables: speed along the path, the tangent, normal
//! and binormal unit vectors, radius of curvature, and the external forces that hold a
//! particle on its path under Earth gravity (acting along `-z`).
//!
//! Symbolic helpers take `VectorExpr3D`/`Expr` and differentiate with respect to `t`;
//! numeric helpers take `nalgebra` vectors evaluated at one instant.

use crate::constants::GRAVITATIONAL_ACCELERATION_ON_EARTH;
use crate::equation_engine::{Bindings, CompiledExpr, Expr};
use crate::solvers::SearchPolicy;
use crate::vector::magnitude;
use crate::vector_expr::{VectorExpr3D, TIME_VARIABLE};
use anyhow::{bail, Context, Result};
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub use crate::solvers::root_find_parametric;

/// Speed along the path, `ds/dt` per axis.
pub fn odometer_speed(s: &VectorExpr3D) -> VectorExpr3D {
    s.differentiate(TIME_VARIABLE)
}

/// `v = s_dot e_t`.
pub fn velocity_vector(s_dot: &VectorExpr3D, e_t: &VectorExpr3D) -> VectorExpr3D {
    s_dot * e_t
}

/// `a = v_dot e_t + (s_dot^2 / rho) e_n`.
pub fn acceleration_vector(
    v_dot: &VectorExpr3D,
    e_t: &VectorExpr3D,
    s_dot: &VectorExpr3D,
    rho: f64,
    e_n: &VectorExpr3D,
) -> VectorExpr3D {
    v_dot * e_t + (s_dot * s_dot) / rho * e_n.clone()
}

/// Radius of curvature from the acceleration: `s_dot^2 / |a - v_dot e_t|`.
///
/// Straight-line motion has no normal acceleration and yields an infinite radius.
pub fn radius_of_curvature(a: &Vector3<f64>, v_dot: f64, e_t: &Vector3<f64>, s_dot: f64) -> f64 {
    let normal_acceleration = a - v_dot * e_t;
    (s_dot * s_dot) / magnitude(&normal_acceleration)
}

/// `e_n = (a - v_dot e_t) / (s_dot^2 / rho)`, pointing at the center of curvature.
pub fn unit_normal_vector(
    a: &Vector3<f64>,
    v_dot: f64,
    e_t: &Vector3<f64>,
    s_dot: f64,
    rho: f64,
) -> Vector3<f64> {
    let normal_acceleration = a - v_dot * e_t;
    normal_acceleration / (s_dot * s_dot / rho)
}

pub fn center_of_curvature(r: &Vector3<f64>, rho: f64, e_n: &Vector3<f64>) -> Vector3<f64> {
    r + rho * e_n
}

pub fn binormal_unit_vector(e_t: &Vector3<f64>, e_n: &Vector3<f64>) -> Vector3<f64> {
    e_t.cross(e_n)
}

/// Tangential component of the non-gravitational forces, `m v_dot + m g e_t.z`.
pub fn external_tangential_force(e_t: &Vector3<f64>, m: f64, v_dot: f64) -> f64 {
    m * v_dot - (-m * GRAVITATIONAL_ACCELERATION_ON_EARTH * e_t.z)
}

/// Normal component of the non-gravitational forces, `m s_dot^2 / rho + m g e_n.z`.
pub fn external_normal_force(e_n: &Vector3<f64>, m: f64, s_dot: f64, rho: f64) -> f64 {
    m * s_dot * s_dot / rho - (-m * GRAVITATIONAL_ACCELERATION_ON_EARTH * e_n.z)
}

/// Binormal component of the non-gravitational forces, `m g e_b.z`.
pub fn external_binormal_force(e_b: &Vector3<f64>, m: f64) -> f64 {
    -(-m * GRAVITATIONAL_ACCELERATION_ON_EARTH * e_b.z)
}

/// `s' = |r'| = (x'^2 + y'^2 + z'^2)^0.5` for a path parameterized by some `p`.
pub fn arc_length_rate(x_prime: &Expr, y_prime: &Expr, z_prime: &Expr) -> Expr {
    (x_prime * x_prime + y_prime * y_prime + z_prime * z_prime).powf(0.5)
}

pub fn tangent_unit_vector(r_prime: &Vector3<f64>, s_prime: f64) -> Vector3<f64> {
    r_prime / s_prime
}

/// `e_n = (s'^2 r'' - (r'.r'') r') / (s' sqrt(s'^2 (r''.r'') - (r'.r'')^2))`.
pub fn normal_unit_vector(
    r_prime: &Vector3<f64>,
    r_double_prime: &Vector3<f64>,
    s_prime: f64,
) -> Vector3<f64> {
    let along = r_prime.dot(r_double_prime);
    let numerator = s_prime * s_prime * r_double_prime - along * r_prime;
    let denominator = s_prime
        * (s_prime * s_prime * r_double_prime.dot(r_double_prime) - along * along).sqrt();
    numerator / denominator
}

/// `rho = s'^3 / sqrt((r''.r'') s'^2 - (r'.r'')^2)`.
pub fn radius_of_curvature_parametric(
    r_prime: &Vector3<f64>,
    r_double_prime: &Vector3<f64>,
    s_prime: f64,
) -> f64 {
    let along = r_prime.dot(r_double_prime);
    let cubed = s_prime * s_prime * s_prime;
    cubed / (r_double_prime.dot(r_double_prime) * s_prime * s_prime - along * along).sqrt()
}

/// Path-variable description of a particle at one instant.
///
/// Primes are derivatives with respect to the path parameter; `v_bar` and `a_bar` are
/// the time-domain velocity and acceleration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicState {
    pub parameter: f64,
    pub r_prime: Vector3<f64>,
    pub r_double_prime: Vector3<f64>,
    pub s_prime: f64,
    pub e_t: Vector3<f64>,
    pub e_n: Vector3<f64>,
    pub e_b: Vector3<f64>,
    pub rho: f64,
    pub v_bar: Vector3<f64>,
    pub a_bar: Vector3<f64>,
}

/// A curve `r(p) = (x(p), y(p), z(p))` traversed with arc length `s(t)`, with `p`
/// measured from zero at `s = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricPath {
    components: VectorExpr3D,
    parameter: String,
    arc_length: Expr,
}

impl ParametricPath {
    pub fn new(components: VectorExpr3D, parameter: &str, arc_length: Expr) -> Self {
        Self {
            components,
            parameter: parameter.to_string(),
            arc_length,
        }
    }

    pub fn components(&self) -> &VectorExpr3D {
        &self.components
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Symbolic `s'(p)`.
    pub fn arc_length_rate(&self) -> Expr {
        let r_prime = self.components.differentiate(&self.parameter);
        arc_length_rate(&r_prime.x, &r_prime.y, &r_prime.z)
    }

    /// Locates the particle at `time` and resolves its intrinsic frame.
    ///
    /// The parameter is recovered by inverting `s(time) = integral of s'(p) from 0 to p`
    /// with `root_find_parametric`, searching `p` up to `search_upper`.
    pub fn state_at_time(
        &self,
        time: f64,
        search_upper: f64,
        policy: &SearchPolicy,
    ) -> Result<IntrinsicState> {
        if self.parameter == TIME_VARIABLE {
            bail!(
                "Path parameter must differ from the time variable '{}'.",
                TIME_VARIABLE
            );
        }
        let distance = self
            .arc_length
            .evaluate_at(TIME_VARIABLE, time)
            .context("Failed to evaluate arc length s(t).")?;

        let r_prime_expr = self.components.differentiate(&self.parameter);
        let r_double_prime_expr = r_prime_expr.differentiate(&self.parameter);
        let s_prime_expr = arc_length_rate(&r_prime_expr.x, &r_prime_expr.y, &r_prime_expr.z);
        let s_prime_compiled = CompiledExpr::univariate(&s_prime_expr, &self.parameter)
            .context("Path components may only depend on the path parameter.")?;

        let parameter = root_find_parametric(distance, 0.0, search_upper, &s_prime_compiled, policy)
            .with_context(|| {
                format!(
                    "Failed to locate {} for arc length {} at t = {}.",
                    self.parameter, distance, time
                )
            })?;
        debug!(
            "arc length {} at t = {} reached at {} = {}",
            distance, time, self.parameter, parameter
        );

        let mut at_parameter = Bindings::new();
        at_parameter.insert(self.parameter.clone(), parameter);
        let r_prime = r_prime_expr
            .evaluate(&at_parameter)
            .context("Failed to evaluate r'.")?;
        let r_double_prime = r_double_prime_expr
            .evaluate(&at_parameter)
            .context("Failed to evaluate r''.")?;
        let s_prime = s_prime_compiled
            .evaluate(&[parameter])
            .context("Failed to evaluate s'.")?;

        let e_t = tangent_unit_vector(&r_prime, s_prime);
        let e_n = normal_unit_vector(&r_prime, &r_double_prime, s_prime);
        let rho = radius_of_curvature_parametric(&r_prime, &r_double_prime, s_prime);

        let speed_expr = self.arc_length.differentiate(TIME_VARIABLE);
        let speed = speed_expr
            .evaluate_at(TIME_VARIABLE, time)
            .context("Failed to evaluate speed ds/dt.")?;
        let speed_rate = speed_expr
            .differentiate(TIME_VARIABLE)
            .evaluate_at(TIME_VARIABLE, time)
            .context("Failed to evaluate tangential acceleration.")?;

        Ok(IntrinsicState {
            parameter,
            r_prime,
            r_double_prime,
            s_prime,
            e_t,
            e_n,
            e_b: binormal_unit_vector(&e_t, &e_n),
            rho,
            v_bar: speed * e_t,
            a_bar: speed_rate * e_t + speed * speed / rho * e_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::solve_for_variable;
    use crate::vector::unit_vector;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn degrees(angle: f64) -> f64 {
        angle * PI / 180.0
    }

    #[test]
    fn intrinsic_frame_from_acceleration() {
        // Ex 2.1: airplane diving on a target at 500 m/s with a 10 g acceleration.
        let r_ao = 4.0
            * Vector3::new(
                degrees(60.0).cos() * degrees(75.0).cos(),
                degrees(60.0).cos() * degrees(75.0).sin(),
                degrees(60.0).sin(),
            );
        let r_bo = Vector3::new(4.0, 0.0, 0.0);
        let e_ao = unit_vector(&r_ao);
        let e_ba = unit_vector(&(r_bo - r_ao));
        let a_bar = 10.0 * GRAVITATIONAL_ACCELERATION_ON_EARTH * -e_ao;
        let v_dot = a_bar.dot(&e_ba);

        let rho = radius_of_curvature(&a_bar, v_dot, &e_ba, 500.0);
        assert_relative_eq!(rho, 3395.402152603464, max_relative = 1e-12);

        let e_n = unit_normal_vector(&a_bar, v_dot, &e_ba, 500.0, rho);
        assert_relative_eq!(
            e_n,
            Vector3::new(-0.7514684033780997, -0.32134612112329397, -0.5762221005509793),
            epsilon = 1e-12
        );
        assert_relative_eq!(magnitude(&e_n), 1.0, epsilon = 1e-12);

        let center = center_of_curvature(&r_ao, rho, &e_n);
        assert_relative_eq!(
            center,
            Vector3::new(-2551.0197963532833, -1089.1674597402275, -1953.0416589733472),
            epsilon = 1e-8
        );

        let e_b = binormal_unit_vector(&e_ba, &e_n);
        assert_abs_diff_eq!(
            e_b,
            Vector3::new(0.0, 0.8733693623277108, -0.4870584738481488),
            epsilon = 1e-12
        );

        assert_relative_eq!(
            external_tangential_force(&e_ba, 5.0, v_dot),
            291.0686924487002,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            external_normal_force(&e_n, 5.0, 500.0, rho),
            339.9157425424642,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            external_binormal_force(&e_b, 5.0),
            -23.861029201124598,
            max_relative = 1e-12
        );
    }

    #[test]
    fn straight_line_motion_has_infinite_radius() {
        let e_t = Vector3::new(1.0, 0.0, 0.0);
        let a = 3.0 * e_t;
        assert!(radius_of_curvature(&a, 3.0, &e_t, 10.0).is_infinite());
    }

    fn conical_helix() -> ParametricPath {
        let components =
            VectorExpr3D::parse("0.2*B*cos(B)", "0.2*B*sin(B)", "0.1*B^2").unwrap();
        ParametricPath::new(components, "B", Expr::parse("10*t^2").unwrap())
    }

    fn assert_helix_frame(
        r_prime: &Vector3<f64>,
        r_double_prime: &Vector3<f64>,
        s_prime: f64,
        e_t: &Vector3<f64>,
        e_n: &Vector3<f64>,
        rho: f64,
    ) {
        assert_relative_eq!(
            *r_prime,
            Vector3::new(0.49938130485464083, -0.6635166255352434, 0.806),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            *r_double_prime,
            Vector3::new(0.8187302909529098, 0.37325153807608574, 0.2),
            epsilon = 1e-9
        );
        assert_relative_eq!(s_prime, 1.1572691994518822, epsilon = 1e-9);
        assert_relative_eq!(
            *e_t,
            Vector3::new(0.4315169755586366, -0.5733468287668115, 0.6964671663099182),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            *e_n,
            Vector3::new(0.7949872407741873, 0.6065880554709947, 0.006798379671830516),
            epsilon = 1e-9
        );
        assert_relative_eq!(rho, 1.5242387788870386, epsilon = 1e-9);
    }

    #[test]
    fn conical_helix_by_hand() {
        // Ex 2.3: particle on a conical helix with s = 10 t^2, evaluated at t = 0.5.
        let path = conical_helix();
        let r_prime = path.components().differentiate("B");
        let r_double_prime = r_prime.differentiate("B");
        let s_prime = path.arc_length_rate();

        let distance = Expr::parse("10*t^2").unwrap().evaluate_at("t", 0.5).unwrap();
        assert_eq!(distance, 2.5);

        let integrand = |b: f64| (0.04 + 0.08 * (b * b)).powf(0.5);
        let beta = root_find_parametric(distance, 0.0, 10.0, &integrand, &SearchPolicy::with_margin(0.005))
            .unwrap();
        assert_eq!((beta * 100.0).round() / 100.0, 4.03);

        let at = |v: &VectorExpr3D| {
            let mut bindings = Bindings::new();
            bindings.insert("B".to_string(), beta);
            v.evaluate(&bindings).unwrap()
        };
        let r_p = at(&r_prime);
        let r_pp = at(&r_double_prime);
        let s_p = s_prime.evaluate_at("B", beta).unwrap();
        // s'^2 collapses to 0.04 + 0.08 B^2 once sin^2 + cos^2 = 1.
        assert_relative_eq!(s_p * s_p, 0.04 + 0.08 * beta * beta, epsilon = 1e-12);

        let e_t = tangent_unit_vector(&r_p, s_p);
        let e_n = normal_unit_vector(&r_p, &r_pp, s_p);
        let rho = radius_of_curvature_parametric(&r_p, &r_pp, s_p);
        assert_helix_frame(&r_p, &r_pp, s_p, &e_t, &e_n, rho);

        let s_t = Expr::parse("10*t^2").unwrap();
        let v = s_t.differentiate("t");
        let v_dot = v.differentiate("t");
        let speed = v.evaluate_at("t", 0.5).unwrap();
        let speed_rate = v_dot.evaluate_at("t", 0.5).unwrap();
        assert_eq!(speed, 10.0);
        assert_eq!(speed_rate, 20.0);

        let v_bar = speed * e_t;
        let a_bar = speed_rate * e_t + speed * speed / rho * e_n;
        assert_relative_eq!(
            v_bar,
            Vector3::new(4.315169755586366, -5.733468287668115, 6.964671663099182),
            epsilon = 1e-8
        );
        assert_relative_eq!(
            a_bar,
            Vector3::new(60.78668481519834, 28.329194048889864, 14.375361349489605),
            epsilon = 1e-7
        );
    }

    #[test]
    fn conical_helix_through_parametric_path() {
        let state = conical_helix()
            .state_at_time(0.5, 10.0, &SearchPolicy::with_margin(0.005))
            .unwrap();
        assert_relative_eq!(state.parameter, 4.03, epsilon = 1e-9);
        assert_helix_frame(
            &state.r_prime,
            &state.r_double_prime,
            state.s_prime,
            &state.e_t,
            &state.e_n,
            state.rho,
        );
        assert_relative_eq!(state.e_b, state.e_t.cross(&state.e_n), epsilon = 1e-15);
        assert_relative_eq!(
            state.a_bar,
            Vector3::new(60.78668481519834, 28.329194048889864, 14.375361349489605),
            epsilon = 1e-7
        );
        assert_relative_eq!(magnitude(&state.v_bar), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn parametric_path_reports_failures_with_context() {
        let err = conical_helix()
            .state_at_time(0.5, 1.0, &SearchPolicy::with_margin(0.005))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to locate B"));

        let tangled = ParametricPath::new(
            VectorExpr3D::parse("B*k", "0", "0").unwrap(),
            "B",
            Expr::parse("t").unwrap(),
        );
        let err = tangled
            .state_at_time(1.0, 5.0, &SearchPolicy::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("only depend on the path parameter"));

        let timed = ParametricPath::new(
            VectorExpr3D::parse("t", "0", "0").unwrap(),
            "t",
            Expr::parse("t").unwrap(),
        );
        assert!(timed.state_at_time(1.0, 5.0, &SearchPolicy::default()).is_err());
    }

    #[test]
    fn symbolic_path_variable_helpers() {
        let s = VectorExpr3D::parse("3*t^2", "t", "0").unwrap();
        let s_dot = odometer_speed(&s);
        assert_eq!(s_dot.solve_at_time(2.0).unwrap(), Vector3::new(12.0, 1.0, 0.0));

        let e_t = VectorExpr3D::from_vector(&Vector3::new(0.6, 0.8, 0.0));
        let v = velocity_vector(&s_dot, &e_t);
        assert_relative_eq!(
            v.solve_at_time(2.0).unwrap(),
            Vector3::new(7.2, 0.8, 0.0),
            epsilon = 1e-12
        );

        let e_n = VectorExpr3D::from_vector(&Vector3::new(-0.8, 0.6, 0.0));
        let v_dot = odometer_speed(&s_dot);
        let a = acceleration_vector(&v_dot, &e_t, &s_dot, 4.0, &e_n);
        // x: 6 * 0.6 + 144 / 4 * -0.8; y: 0 * 0.8 + 1 / 4 * 0.6
        assert_relative_eq!(
            a.solve_at_time(2.0).unwrap(),
            Vector3::new(3.6 - 28.8, 0.15, 0.0),
            epsilon = 1e-12
        );

        let rate = arc_length_rate(&Expr::num(3.0), &Expr::num(4.0), &Expr::num(12.0));
        assert_eq!(rate.simplify(), Expr::num(13.0));
    }

    #[test]
    fn projectile_in_a_magnetic_field() {
        // Ex 2.4: the charged particle reaches y = 0.4 m after about 0.105 s.
        let x = Expr::parse("13.289260487773495*t").unwrap();
        let y = Expr::parse("-0.4*cos(20*t)-.241*sin(20*t)+0.4").unwrap();
        let z = Expr::parse("-4.9035*t^2+14.1421*t").unwrap();

        let policy = SearchPolicy::with_margin(0.01).with_step(0.001);
        let t_f = solve_for_variable(0.0, 10.0, "t", 0.4, &policy, &y).unwrap();
        assert_relative_eq!(t_f, 0.105, epsilon = 1e-9);

        let path = VectorExpr3D::new(x, y, z);
        assert_relative_eq!(
            path.solve_at_time(t_f).unwrap(),
            Vector3::new(1.3953723512162168, 0.3939049844775645, 1.4308594125),
            epsilon = 1e-8
        );
        assert_relative_eq!(
            odometer_speed(&path).solve_at_time(t_f).unwrap(),
            Vector3::new(13.289260487773495, 9.339033157362303, 13.112365),
            epsilon = 1e-8
        );
    }
}
