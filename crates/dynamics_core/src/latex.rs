//! LaTeX notation helpers for displaying vectors and quantities.

use crate::equation_engine::Expr;

pub const I_HAT: &str = r"\hat{\textbf{i}}";
pub const J_HAT: &str = r"\hat{\textbf{j}}";
pub const K_HAT: &str = r"\hat{\textbf{k}}";
pub const UNIT_HAT: &str = r"\hat{\textbf{e}}";

/// Unit suffixes.
pub mod units {
    pub const DEGREE: &str = r"^{\circ}";
    pub const NEWTON: &str = r"\text{ N}";
    pub const SECOND: &str = r"\text{ s}";
    pub const METER: &str = r"\text{ m}";
    pub const KILOGRAM: &str = r"\text{ kg}";
}

/// Vector notation, e.g. `\vec{r}`.
pub fn vectorize(variable: &Expr) -> String {
    format!(r"\vec{{{}}}", variable.to_latex())
}

/// Magnitude notation, e.g. `\abs{r}`.
pub fn magnitude(variable: &Expr) -> String {
    format!(r"\abs{{{}}}", variable.to_latex())
}

/// Unit vector notation, e.g. `\hat{\textbf{e}}_{r}`.
pub fn unit_vector(variable: &Expr) -> String {
    format!("{}_{{{}}}", UNIT_HAT, variable.to_latex())
}

/// Joins `(component, unit vector)` pairs with `+`, skipping components flagged zero.
pub(crate) fn join_components<I>(components: I) -> String
where
    I: IntoIterator<Item = (bool, String, &'static str)>,
{
    components
        .into_iter()
        .filter(|(is_zero, _, _)| !is_zero)
        .map(|(_, component, hat)| format!("{}{}", component, hat))
        .collect::<Vec<_>>()
        .join("+")
}
