use std::fmt;

/// Number of DG basis functions available
pub const MAX_DG_COMPONENTS: usize = 8;

/// `∫ φ_k² ds dt` over the reference square `[-1/2, 1/2]²`, the (diagonal) DG mass matrix of a unit Elem
pub const BASIS_NORMS: [f64; MAX_DG_COMPONENTS] = [
    1.0,
    1.0 / 12.0,
    1.0 / 12.0,
    1.0 / 180.0,
    1.0 / 144.0,
    1.0 / 180.0,
    1.0 / 2160.0,
    1.0 / 2160.0,
];

/// Polynomial space of a DG field: the number of leading basis functions it uses.
///
/// The basis on local coordinates `s, t ∈ [-1/2, 1/2]` is a product of Legendre polynomials:
///
/// | k | φ_k                   | used from |
/// |---|-----------------------|-----------|
/// | 0 | 1                     | `Dg0`     |
/// | 1 | s                     | `Dg1`     |
/// | 2 | t                     | `Dg1`     |
/// | 3 | s² - 1/12             | `Dg2`     |
/// | 4 | s·t                   | `Dg2`     |
/// | 5 | t² - 1/12             | `Dg2`     |
/// | 6 | (s² - 1/12)·t         | `Dg2Plus` |
/// | 7 | s·(t² - 1/12)         | `Dg2Plus` |
///
/// Component 0 is the element mean. The basis is orthogonal, so dropping trailing components is an L2 projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DgDegree {
    Dg0,
    Dg1,
    Dg2,
    Dg2Plus,
}

impl DgDegree {
    pub const fn components(self) -> usize {
        match self {
            Self::Dg0 => 1,
            Self::Dg1 => 3,
            Self::Dg2 => 6,
            Self::Dg2Plus => 8,
        }
    }

    pub fn from_components(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Dg0),
            3 => Some(Self::Dg1),
            6 => Some(Self::Dg2),
            8 => Some(Self::Dg2Plus),
            _ => None,
        }
    }
}

impl fmt::Display for DgDegree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DG({} components)", self.components())
    }
}

#[inline]
fn legendre_2(x: f64) -> f64 {
    x * x - 1.0 / 12.0
}

/// Value of the basis function `k` at local coordinates `(s, t)`
#[inline]
pub fn basis_value(k: usize, s: f64, t: f64) -> f64 {
    match k {
        0 => 1.0,
        1 => s,
        2 => t,
        3 => legendre_2(s),
        4 => s * t,
        5 => legendre_2(t),
        6 => legendre_2(s) * t,
        7 => s * legendre_2(t),
        _ => panic!("DG basis function {} does not exist!", k),
    }
}

/// Gradient of the basis function `k` with respect to the local coordinates `(s, t)`
///
/// Divide by `(hx, hy)` to obtain the gradient in real space.
#[inline]
pub fn basis_gradient(k: usize, s: f64, t: f64) -> [f64; 2] {
    match k {
        0 => [0.0, 0.0],
        1 => [1.0, 0.0],
        2 => [0.0, 1.0],
        3 => [2.0 * s, 0.0],
        4 => [t, s],
        5 => [0.0, 2.0 * t],
        6 => [2.0 * s * t, legendre_2(s)],
        7 => [legendre_2(t), 2.0 * s * t],
        _ => panic!("DG basis function {} does not exist!", k),
    }
}

/// Evaluate a DG polynomial with the given coefficients at `(s, t)`
#[inline]
pub fn evaluate(coefficients: &[f64], s: f64, t: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(k, c)| c * basis_value(k, s, t))
        .sum()
}

/// CG1 (bilinear) shape functions of the four Elem vertices (`[SW, SE, NW, NE]`) at `(s, t)`
#[inline]
pub fn cg1_shape(s: f64, t: f64) -> [f64; 4] {
    [
        (0.5 - s) * (0.5 - t),
        (0.5 + s) * (0.5 - t),
        (0.5 - s) * (0.5 + t),
        (0.5 + s) * (0.5 + t),
    ]
}

/// Local gradients of the CG1 shape functions at `(s, t)`
#[inline]
pub fn cg1_shape_gradient(s: f64, t: f64) -> [[f64; 2]; 4] {
    [
        [-(0.5 - t), -(0.5 - s)],
        [0.5 - t, -(0.5 + s)],
        [-(0.5 + t), 0.5 - s],
        [0.5 + t, 0.5 + s],
    ]
}

/// Interpolate four vertex values bilinearly at `(s, t)`
#[inline]
pub fn cg1_interpolate(vertex_values: [f64; 4], s: f64, t: f64) -> f64 {
    cg1_shape(s, t)
        .iter()
        .zip(vertex_values.iter())
        .map(|(phi, v)| phi * v)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::{glq::real_gauss_quad, QuadratureRule};

    #[test]
    fn basis_is_orthogonal() {
        let rule = QuadratureRule::new(5);
        for p in 0..MAX_DG_COMPONENTS {
            for q in 0..MAX_DG_COMPONENTS {
                let integral = real_gauss_quad(&rule.weights, &rule.weights, |m, n| {
                    basis_value(p, rule.points[m], rule.points[n])
                        * basis_value(q, rule.points[m], rule.points[n])
                });

                let expected = if p == q { BASIS_NORMS[p] } else { 0.0 };
                assert!(
                    (integral - expected).abs() < 1e-14,
                    "<φ{}, φ{}> = {} != {}",
                    p,
                    q,
                    integral,
                    expected
                );
            }
        }
    }

    #[test]
    fn gradients_match_finite_differences() {
        let eps = 1e-6;
        let (s, t) = (0.13, -0.31);
        for k in 0..MAX_DG_COMPONENTS {
            let [ds, dt] = basis_gradient(k, s, t);
            let fd_s = (basis_value(k, s + eps, t) - basis_value(k, s - eps, t)) / (2.0 * eps);
            let fd_t = (basis_value(k, s, t + eps) - basis_value(k, s, t - eps)) / (2.0 * eps);
            assert!((ds - fd_s).abs() < 1e-8);
            assert!((dt - fd_t).abs() < 1e-8);
        }
    }

    #[test]
    fn cg1_partition_of_unity() {
        for (s, t) in [(-0.5, -0.5), (0.1, 0.2), (0.5, -0.25)] {
            assert!((cg1_shape(s, t).iter().sum::<f64>() - 1.0).abs() < 1e-14);
            let grad_sum = cg1_shape_gradient(s, t)
                .iter()
                .fold([0.0, 0.0], |acc, g| [acc[0] + g[0], acc[1] + g[1]]);
            assert!(grad_sum[0].abs() < 1e-14 && grad_sum[1].abs() < 1e-14);
        }
        assert_eq!(cg1_interpolate([1.0, 2.0, 3.0, 4.0], 0.5, 0.5), 4.0);
    }

    #[test]
    fn degree_components() {
        for degree in [DgDegree::Dg0, DgDegree::Dg1, DgDegree::Dg2, DgDegree::Dg2Plus] {
            assert_eq!(DgDegree::from_components(degree.components()), Some(degree));
        }
        assert_eq!(DgDegree::from_components(4), None);
    }

    #[test]
    #[should_panic]
    fn missing_basis_function() {
        basis_value(MAX_DG_COMPONENTS, 0.0, 0.0);
    }
}
