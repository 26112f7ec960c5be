use crate::traits::{Integrand, Quadrature};
use std::f64::consts::PI;

// Five-point Gauss-Legendre abscissae and weights on [-1, 1].
const FIVE_POINT_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.0,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];
const FIVE_POINT_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

/// Fixed-order Gauss-Legendre rule applied over the whole interval as a single panel.
///
/// An `n`-point rule integrates polynomials up to degree `2n - 1` exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl Default for GaussLegendre {
    fn default() -> Self {
        Self::five_point()
    }
}

impl GaussLegendre {
    pub const DEFAULT_ORDER: usize = 5;

    pub fn five_point() -> Self {
        Self {
            nodes: FIVE_POINT_NODES.to_vec(),
            weights: FIVE_POINT_WEIGHTS.to_vec(),
        }
    }

    /// Builds an `order`-point rule. Returns `None` for `order == 0`.
    ///
    /// Nodes are the roots of the Legendre polynomial `P_n`, found by Newton iteration
    /// from the Chebyshev-like guess `cos(pi (i + 3/4) / (n + 1/2))`.
    pub fn new(order: usize) -> Option<Self> {
        if order == 0 {
            return None;
        }
        let n = order;
        let nf = n as f64;
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        for i in 0..n.div_ceil(2) {
            let mut z = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
            let mut derivative = 0.0;
            for _ in 0..100 {
                // Three-term recurrence for P_n(z) and P_{n-1}(z).
                let mut p1 = 1.0;
                let mut p2 = 0.0;
                for j in 1..=n {
                    let jf = j as f64;
                    let p3 = p2;
                    p2 = p1;
                    p1 = ((2.0 * jf - 1.0) * z * p2 - (jf - 1.0) * p3) / jf;
                }
                derivative = nf * (z * p1 - p2) / (z * z - 1.0);
                let previous = z;
                z = previous - p1 / derivative;
                if (z - previous).abs() < 1e-15 {
                    break;
                }
            }
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            let w = 2.0 / ((1.0 - z * z) * derivative * derivative);
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Some(Self { nodes, weights })
    }

    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Quadrature for GaussLegendre {
    fn integrate(&self, f: &impl Integrand, a: f64, b: f64) -> f64 {
        let half_width = 0.5 * (b - a);
        let midpoint = 0.5 * (a + b);
        let sum: f64 = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| w * f.value(midpoint + half_width * x))
            .sum();
        half_width * sum
    }
}
