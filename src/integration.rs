/// Methods to assist in Gauss-Legendre-Quadrature integration
pub mod glq;

use glq::{gauss_quadrature_points, scale_gauss_quad_points};

/// Number of Gauss-Legendre points (in each direction) used by the DG operators.
///
/// Three points integrate polynomials up to degree 5 exactly, which covers the product of a
/// quadratic tracer, a bilinear velocity and the derivative of a quadratic test function.
pub const NUM_GAUSS_POINTS: usize = 3;

/// Gauss-Legendre rule mapped onto the local element interval `[-1/2, 1/2]`
///
/// The weights are scaled to sum to one, so the integral over an element of size `hx * hy` is
/// `hx * hy * sum(w_m * w_n * f(s_m, t_n))`.
#[derive(Clone, Debug)]
pub struct QuadratureRule {
    pub points: Vec<f64>,
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    pub fn new(n: usize) -> Self {
        let (raw_points, raw_weights) = gauss_quadrature_points(n);
        let (scale, points) = scale_gauss_quad_points(&raw_points, -0.5, 0.5);

        Self {
            points,
            weights: raw_weights.iter().map(|w| w * scale).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the tensor product points: `(s, t, weight)`
    pub fn tensor_points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.points
            .iter()
            .zip(self.weights.iter())
            .flat_map(move |(s, ws)| {
                self.points
                    .iter()
                    .zip(self.weights.iter())
                    .map(move |(t, wt)| (*s, *t, ws * wt))
            })
    }

    /// Local coordinates of the points along one edge of the reference square
    ///
    /// The edges are indexed as: `0: South (t = -1/2)`, `1: North (t = 1/2)`, `2: West (s = -1/2)`, `3: East (s = 1/2)`.
    /// Points always run in the direction of increasing `s` (or `t`), so two elements sharing an edge
    /// see the same points in the same order.
    pub fn edge_points(&self, edge_index: usize) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.points
            .iter()
            .zip(self.weights.iter())
            .map(move |(p, w)| match edge_index {
                0 => (*p, -0.5, *w),
                1 => (*p, 0.5, *w),
                2 => (-0.5, *p, *w),
                3 => (0.5, *p, *w),
                _ => unreachable!(),
            })
    }
}

impl Default for QuadratureRule {
    fn default() -> Self {
        Self::new(NUM_GAUSS_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_one() {
        let rule = QuadratureRule::default();
        assert_relative_eq!(rule.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(
            rule.tensor_points().map(|(_, _, w)| w).sum::<f64>(),
            1.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn integrates_quintic_exactly() {
        let rule = QuadratureRule::default();
        // mean of s^4 over [-1/2, 1/2] is 1/80; odd powers vanish
        let quartic: f64 = rule
            .points
            .iter()
            .zip(rule.weights.iter())
            .map(|(s, w)| (s.powi(4) + s.powi(5)) * w)
            .sum();
        assert_relative_eq!(quartic, 1.0 / 80.0, epsilon = 1e-14);
    }

    #[test]
    fn edge_points_lie_on_edges() {
        let rule = QuadratureRule::default();
        for (s, t, _) in rule.edge_points(0) {
            assert_eq!(t, -0.5);
            assert!(s.abs() < 0.5);
        }
        for (s, _, _) in rule.edge_points(3) {
            assert_eq!(s, 0.5);
        }
    }
}
