//! Symbolic algebra on `Expr` trees: construction helpers, structural differentiation,
//! simplification, evaluation, and rendering (plain text and LaTeX).

use crate::equation_engine::{parse, Bindings, CompiledExpr, Expr, ExprError, Function};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

impl Expr {
    pub fn parse(input: &str) -> Result<Expr, ExprError> {
        parse(input)
    }

    pub fn num(value: f64) -> Expr {
        Expr::Number(value)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    pub fn zero() -> Expr {
        Expr::Number(0.0)
    }

    pub fn one() -> Expr {
        Expr::Number(1.0)
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::Pow(Box::new(self), Box::new(exponent))
    }

    pub fn powf(self, exponent: f64) -> Expr {
        self.pow(Expr::Number(exponent))
    }

    pub fn sin(arg: Expr) -> Expr {
        Expr::Call(Function::Sin, Box::new(arg))
    }

    pub fn cos(arg: Expr) -> Expr {
        Expr::Call(Function::Cos, Box::new(arg))
    }

    pub fn tan(arg: Expr) -> Expr {
        Expr::Call(Function::Tan, Box::new(arg))
    }

    pub fn exp(arg: Expr) -> Expr {
        Expr::Call(Function::Exp, Box::new(arg))
    }

    pub fn ln(arg: Expr) -> Expr {
        Expr::Call(Function::Ln, Box::new(arg))
    }

    pub fn sqrt(arg: Expr) -> Expr {
        Expr::Call(Function::Sqrt, Box::new(arg))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Expr::Number(_) => false,
            Expr::Variable(v) => v == name,
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.contains_variable(name) || b.contains_variable(name),
            Expr::Neg(a) | Expr::Call(_, a) => a.contains_variable(name),
        }
    }

    /// Free variable names in order of first appearance.
    pub fn free_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(v) => {
                if !names.contains(v) {
                    names.push(v.clone());
                }
            }
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_variables(names);
                b.collect_variables(names);
            }
            Expr::Neg(a) | Expr::Call(_, a) => a.collect_variables(names),
        }
    }

    /// Evaluates the expression with every free variable taken from `bindings`.
    ///
    /// Bindings for names that do not occur are ignored; a free variable without a
    /// binding is an `UnboundVariable` error.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64, ExprError> {
        let names = self.free_variables();
        let mut values = Vec::with_capacity(names.len());
        for name in &names {
            match bindings.get(name) {
                Some(value) => values.push(*value),
                None => return Err(ExprError::UnboundVariable(name.clone())),
            }
        }
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        CompiledExpr::new(self, &refs)?.evaluate(&values)
    }

    /// Evaluates an expression of at most one free variable, binding `name` to `value`.
    pub fn evaluate_at(&self, name: &str, value: f64) -> Result<f64, ExprError> {
        let mut bindings = Bindings::new();
        bindings.insert(name.to_string(), value);
        self.evaluate(&bindings)
    }

    /// Symbolic derivative with respect to `var`, simplified.
    pub fn differentiate(&self, var: &str) -> Expr {
        self.derivative(var).simplify()
    }

    fn derivative(&self, var: &str) -> Expr {
        match self {
            Expr::Number(_) => Expr::zero(),
            Expr::Variable(name) => {
                if name == var {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            Expr::Add(a, b) => a.derivative(var) + b.derivative(var),
            Expr::Sub(a, b) => a.derivative(var) - b.derivative(var),
            // (uv)' = u'v + uv'
            Expr::Mul(a, b) => {
                a.derivative(var) * (**b).clone() + (**a).clone() * b.derivative(var)
            }
            // (u/v)' = (u'v - uv') / v^2
            Expr::Div(a, b) => (a.derivative(var) * (**b).clone()
                - (**a).clone() * b.derivative(var))
                / (**b).clone().powf(2.0),
            Expr::Pow(base, exponent) => {
                let base = (**base).clone();
                let exponent = (**exponent).clone();
                if !exponent.contains_variable(var) {
                    // Power rule: n u^(n-1) u'
                    let lowered = exponent.clone() - 1.0;
                    exponent * base.clone().pow(lowered) * base.derivative(var)
                } else if !base.contains_variable(var) {
                    // a^v ln(a) v'
                    let dv = exponent.derivative(var);
                    base.clone().pow(exponent) * Expr::ln(base) * dv
                } else {
                    // u^v (v' ln(u) + v u'/u)
                    let du = base.derivative(var);
                    let dv = exponent.derivative(var);
                    base.clone().pow(exponent.clone())
                        * (dv * Expr::ln(base.clone()) + exponent * du / base)
                }
            }
            Expr::Neg(a) => -a.derivative(var),
            Expr::Call(function, arg) => {
                let inner = (**arg).clone();
                let du = arg.derivative(var);
                let outer = match function {
                    Function::Sin => Expr::cos(inner),
                    Function::Cos => -Expr::sin(inner),
                    Function::Tan => 1.0 / Expr::cos(inner).powf(2.0),
                    Function::Exp => Expr::exp(inner),
                    Function::Ln => 1.0 / inner,
                    Function::Sqrt => 1.0 / (2.0 * Expr::sqrt(inner)),
                };
                outer * du
            }
        }
    }

    /// Folds constants and removes algebraic identities (`x + 0`, `x * 1`, `x * 0`,
    /// `x ^ 1`, `x ^ 0`, `--x`). Numeric factors move to the front of products;
    /// nothing else is reordered and no trigonometric identities are applied.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Number(_) | Expr::Variable(_) => self.clone(),
            Expr::Add(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => Expr::Number(x + y),
                    (Some(x), _) if x == 0.0 => b,
                    (_, Some(y)) if y == 0.0 => a,
                    _ => match b {
                        Expr::Neg(inner) => Expr::Sub(Box::new(a), inner),
                        b => a + b,
                    },
                }
            }
            Expr::Sub(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => Expr::Number(x - y),
                    (Some(x), _) if x == 0.0 => (-b).simplify(),
                    (_, Some(y)) if y == 0.0 => a,
                    _ => match b {
                        Expr::Neg(inner) => Expr::Add(Box::new(a), inner),
                        b => a - b,
                    },
                }
            }
            Expr::Mul(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => Expr::Number(x * y),
                    (Some(x), _) | (_, Some(x)) if x == 0.0 => Expr::zero(),
                    (Some(x), _) if x == 1.0 => b,
                    (_, Some(y)) if y == 1.0 => a,
                    (Some(x), _) if x == -1.0 => (-b).simplify(),
                    (_, Some(y)) if y == -1.0 => (-a).simplify(),
                    // Gather constants to the front: c1 * (c2 * u) -> (c1 c2) * u
                    (Some(x), None) => match b {
                        Expr::Mul(inner_a, inner_b) => match inner_a.as_number() {
                            Some(y) => Expr::Number(x * y) * *inner_b,
                            None => a * Expr::Mul(inner_a, inner_b),
                        },
                        b => a * b,
                    },
                    (None, Some(_)) => b * a,
                    _ => a * b,
                }
            }
            Expr::Div(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => Expr::Number(x / y),
                    (Some(x), _) if x == 0.0 => Expr::zero(),
                    (_, Some(y)) if y == 1.0 => a,
                    _ => a / b,
                }
            }
            Expr::Pow(base, exponent) => {
                let (base, exponent) = (base.simplify(), exponent.simplify());
                match (base.as_number(), exponent.as_number()) {
                    (Some(x), Some(y)) => Expr::Number(x.powf(y)),
                    (_, Some(y)) if y == 0.0 => Expr::one(),
                    (_, Some(y)) if y == 1.0 => base,
                    (Some(x), _) if x == 1.0 => Expr::one(),
                    _ => base.pow(exponent),
                }
            }
            Expr::Neg(a) => match a.simplify() {
                Expr::Number(n) => Expr::Number(-n),
                Expr::Neg(inner) => *inner,
                other => -other,
            },
            Expr::Call(function, arg) => match arg.simplify() {
                Expr::Number(n) => Expr::Number(function.apply(n)),
                other => Expr::Call(*function, Box::new(other)),
            },
        }
    }

    /// Renders the expression as LaTeX.
    pub fn to_latex(&self) -> String {
        match self {
            Expr::Number(n) => format!("{}", n),
            Expr::Variable(v) => v.clone(),
            Expr::Add(a, b) => format!("{} + {}", a.to_latex(), b.to_latex()),
            Expr::Sub(a, b) => format!(
                "{} - {}",
                a.to_latex(),
                latex_group(b, precedence(b) <= PREC_SUM)
            ),
            Expr::Mul(a, b) => format!(
                "{} \\cdot {}",
                latex_group(a, precedence(a) < PREC_PRODUCT),
                latex_group(b, precedence(b) <= PREC_NEG)
            ),
            Expr::Div(a, b) => format!("\\frac{{{}}}{{{}}}", a.to_latex(), b.to_latex()),
            Expr::Pow(base, exponent) => format!(
                "{{{}}}^{{{}}}",
                latex_group(base, precedence(base) < PREC_ATOM),
                exponent.to_latex()
            ),
            Expr::Neg(a) => format!("-{}", latex_group(a, precedence(a) < PREC_POW)),
            Expr::Call(Function::Sqrt, arg) => format!("\\sqrt{{{}}}", arg.to_latex()),
            Expr::Call(Function::Exp, arg) => format!("e^{{{}}}", arg.to_latex()),
            Expr::Call(function, arg) => format!(
                "\\{}\\left({}\\right)",
                function.name(),
                arg.to_latex()
            ),
        }
    }
}

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => PREC_SUM,
        Expr::Mul(..) | Expr::Div(..) => PREC_PRODUCT,
        Expr::Neg(_) => PREC_NEG,
        Expr::Number(n) if *n < 0.0 => PREC_NEG,
        Expr::Pow(..) => PREC_POW,
        Expr::Number(_) | Expr::Variable(_) | Expr::Call(..) => PREC_ATOM,
    }
}

fn latex_group(expr: &Expr, wrap: bool) -> String {
    if wrap {
        format!("\\left({}\\right)", expr.to_latex())
    } else {
        expr.to_latex()
    }
}

struct Grouped<'a>(&'a Expr, bool);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Plain-text rendering that `parse` reads back into an equivalent tree.
///
/// Non-finite constants render as the divisions that produce them (`(1/0)`, `(-1/0)`,
/// `(0/0)`), which `simplify` folds back into the same constant.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) if n.is_nan() => write!(f, "(0/0)"),
            Expr::Number(n) if n.is_infinite() => {
                write!(f, "({}1/0)", if *n < 0.0 { "-" } else { "" })
            }
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(v) => write!(f, "{}", v),
            Expr::Add(a, b) => write!(f, "{} + {}", a, Grouped(b, precedence(b) <= PREC_SUM)),
            Expr::Sub(a, b) => write!(f, "{} - {}", a, Grouped(b, precedence(b) <= PREC_SUM)),
            Expr::Mul(a, b) => write!(
                f,
                "{}*{}",
                Grouped(a, precedence(a) < PREC_PRODUCT),
                Grouped(b, precedence(b) <= PREC_PRODUCT)
            ),
            Expr::Div(a, b) => write!(
                f,
                "{}/{}",
                Grouped(a, precedence(a) < PREC_PRODUCT),
                Grouped(b, precedence(b) <= PREC_PRODUCT)
            ),
            Expr::Pow(base, exponent) => write!(
                f,
                "{}^{}",
                Grouped(base, precedence(base) < PREC_ATOM),
                Grouped(exponent, precedence(exponent) < PREC_POW)
            ),
            Expr::Neg(a) => write!(f, "-{}", Grouped(a, precedence(a) < PREC_POW)),
            Expr::Call(function, arg) => write!(f, "{}({})", function.name(), arg),
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$variant(Box::new(self.clone()), Box::new(rhs.clone()))
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs.clone()))
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self.clone()), Box::new(rhs))
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$variant(Box::new(self), Box::new(Expr::Number(rhs)))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$variant(Box::new(self.clone()), Box::new(Expr::Number(rhs)))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Number(self)), Box::new(rhs))
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Number(self)), Box::new(rhs.clone()))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self.clone()))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Number(value)
    }
}
