//! The `dynamics_core` crate collects the closed-form formulas of introductory
//! engineering dynamics together with the numeric methods they lean on.
//!
//! Key components:
//! - **Equation Engine**: a tokenizer, parser and bytecode VM for symbolic `Expr` trees.
//! - **Symbolic**: differentiation, simplification and LaTeX rendering of expressions,
//!   plus `VectorExpr3D` for vectors with symbolic components.
//! - **Numerics**: Gauss-Legendre quadrature, the arc-length inversion
//!   `root_find_parametric`, and central-difference derivatives.
//! - **Formulas**: vector algebra, particle kinematics in path variables, forces and
//!   gravitation, and frame rotations.
pub mod constants;
pub mod equation_engine;
pub mod finite_difference;
pub mod forces;
pub mod kinematics;
pub mod latex;
pub mod quadrature;
pub mod relative_motion;
pub mod solvers;
pub mod symbolic;
pub mod traits;
pub mod vector;
pub mod vector_expr;

pub use equation_engine::{Bindings, CompiledExpr, Expr, ExprError};
pub use solvers::{root_find_parametric, SearchPolicy, SearchStrategy, SolverError};
pub use vector_expr::VectorExpr3D;
