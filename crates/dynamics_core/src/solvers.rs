use crate::equation_engine::{CompiledExpr, Expr, ExprError};
use crate::quadrature::GaussLegendre;
use crate::traits::{Integrand, Quadrature};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Invalid search input: {0}")]
    InvalidInput(String),
    #[error("No value in ({lower}, {upper}] reaches {target} within the search margin")]
    TargetNotFound { target: f64, lower: f64, upper: f64 },
    #[error(transparent)]
    Expression(#[from] ExprError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Sweep forward from the lower bound in increments of `step` and return the first
    /// candidate within `margin` of the target.
    FixedStep,
    /// Halve a bracket around the target. Requires the searched function to cross the
    /// target between the bounds.
    Bisection,
}

/// Settings shared by the one-dimensional searches in this module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchPolicy {
    pub step: f64,
    pub margin: f64,
    pub strategy: SearchStrategy,
    pub max_bisections: usize,
    pub quadrature_order: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            step: 0.01,
            margin: 1e-3,
            strategy: SearchStrategy::FixedStep,
            max_bisections: 100,
            quadrature_order: GaussLegendre::DEFAULT_ORDER,
        }
    }
}

impl SearchPolicy {
    pub fn with_margin(margin: f64) -> Self {
        Self {
            margin,
            ..Self::default()
        }
    }

    pub fn with_step(self, step: f64) -> Self {
        Self { step, ..self }
    }

    pub fn with_strategy(self, strategy: SearchStrategy) -> Self {
        Self { strategy, ..self }
    }

    fn validate(&self, lower: f64, upper: f64) -> Result<(), SolverError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(SolverError::InvalidInput(
                "search bounds must be finite".to_string(),
            ));
        }
        if upper <= lower {
            return Err(SolverError::InvalidInput(format!(
                "upper bound {} must exceed lower bound {}",
                upper, lower
            )));
        }
        if !(self.margin > 0.0) || !self.margin.is_finite() {
            return Err(SolverError::InvalidInput(
                "margin must be positive".to_string(),
            ));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(SolverError::InvalidInput("step must be positive".to_string()));
        }
        if self.strategy == SearchStrategy::Bisection && self.max_bisections == 0 {
            return Err(SolverError::InvalidInput(
                "max_bisections must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Finds `b` in `(lower, upper]` such that the integral of `integrand` over
/// `[lower, b]` is within `policy.margin` of `target`.
///
/// With `SearchStrategy::FixedStep` the candidates are `lower + k * step`; the result
/// is the first one that qualifies, so its resolution is bounded by `step` and the cost
/// is one quadrature per candidate. The integral is assumed, not checked, to be
/// monotone in `b`.
///
/// `SearchStrategy::Bisection` brackets `[lower, upper]` instead and needs the target
/// to lie between the integrals at the two bounds.
///
/// An unreachable target is reported as `SolverError::TargetNotFound`.
pub fn root_find_parametric(
    target: f64,
    lower: f64,
    upper: f64,
    integrand: &impl Integrand,
    policy: &SearchPolicy,
) -> Result<f64, SolverError> {
    policy.validate(lower, upper)?;
    if !target.is_finite() {
        return Err(SolverError::InvalidInput("target must be finite".to_string()));
    }
    let rule = GaussLegendre::new(policy.quadrature_order).ok_or_else(|| {
        SolverError::InvalidInput("quadrature order must be at least 1".to_string())
    })?;
    let accumulated = |b: f64| rule.integrate(integrand, lower, b);

    let found = match policy.strategy {
        SearchStrategy::FixedStep => sweep(&accumulated, target, lower, upper, policy),
        SearchStrategy::Bisection => bisect(&accumulated, target, lower, upper, policy),
    };
    found.ok_or(SolverError::TargetNotFound {
        target,
        lower,
        upper,
    })
}

/// Finds a value of `variable` in `(lower, upper]` at which `expr` is within
/// `policy.margin` of `rhs`.
///
/// `expr` may not contain free variables other than `variable`.
pub fn solve_for_variable(
    lower: f64,
    upper: f64,
    variable: &str,
    rhs: f64,
    policy: &SearchPolicy,
    expr: &Expr,
) -> Result<f64, SolverError> {
    policy.validate(lower, upper)?;
    let compiled = CompiledExpr::univariate(expr, variable)?;
    let g = |x: f64| compiled.value(x);

    let found = match policy.strategy {
        SearchStrategy::FixedStep => sweep(&g, rhs, lower, upper, policy),
        SearchStrategy::Bisection => bisect(&g, rhs, lower, upper, policy),
    };
    found.ok_or(SolverError::TargetNotFound {
        target: rhs,
        lower,
        upper,
    })
}

fn sweep(
    g: &impl Fn(f64) -> f64,
    target: f64,
    lower: f64,
    upper: f64,
    policy: &SearchPolicy,
) -> Option<f64> {
    // Candidates come from the step count so they do not accumulate rounding drift.
    let steps = ((upper - lower) / policy.step + 1e-9).floor() as u64;
    for k in 1..=steps {
        let candidate = lower + k as f64 * policy.step;
        let value = g(candidate);
        if (value - target).abs() < policy.margin {
            debug!(
                "sweep reached {} at {} after {} evaluations (value {})",
                target, candidate, k, value
            );
            return Some(candidate);
        }
    }
    debug!(
        "sweep exhausted {} candidates in ({}, {}] without reaching {}",
        steps, lower, upper, target
    );
    None
}

fn bisect(
    g: &impl Fn(f64) -> f64,
    target: f64,
    lower: f64,
    upper: f64,
    policy: &SearchPolicy,
) -> Option<f64> {
    let mut lo = lower;
    let mut hi = upper;
    let residual_lo = g(lo) - target;
    let residual_hi = g(hi) - target;

    if residual_hi.abs() < policy.margin {
        return Some(hi);
    }
    if !(residual_lo.is_finite() && residual_hi.is_finite())
        || residual_lo * residual_hi > 0.0
    {
        debug!(
            "bisection bracket ({}, {}] does not straddle {} (residuals {}, {})",
            lower, upper, target, residual_lo, residual_hi
        );
        return None;
    }

    for iteration in 0..policy.max_bisections {
        let mid = 0.5 * (lo + hi);
        let residual = g(mid) - target;
        trace!("bisection {}: [{}, {}] mid {} residual {}", iteration, lo, hi, mid, residual);
        if residual.abs() < policy.margin {
            debug!("bisection reached {} at {} after {} halvings", target, mid, iteration + 1);
            return Some(mid);
        }
        // The lower residual may be exactly zero, so orient by the upper end.
        if residual.signum() == residual_hi.signum() {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    debug!(
        "bisection gave up after {} halvings in [{}, {}]",
        policy.max_bisections, lo, hi
    );
    None
}
