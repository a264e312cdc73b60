use crate::domain::fields::basis::{basis_value, DgDegree, MAX_DG_COMPONENTS};
use crate::domain::DgField;
use crate::integration::QuadratureRule;

use log::trace;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bound {
    Upper,
    Lower,
}

impl Bound {
    /// Is `value` on the wrong side of `bound`?
    fn violated_by(self, value: f64, bound: f64) -> bool {
        match self {
            Self::Upper => value > bound,
            Self::Lower => value < bound,
        }
    }

    fn extreme(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Upper => a.max(b),
            Self::Lower => a.min(b),
        }
    }
}

/// Enforce `field <= bound` on every Elem
///
/// Returns the number of `Elem`s that were modified.
pub fn limit_max(field: &mut DgField, bound: f64) -> usize {
    limit(field, bound, Bound::Upper)
}

/// Enforce `field >= bound` on every Elem
///
/// Returns the number of `Elem`s that were modified.
pub fn limit_min(field: &mut DgField, bound: f64) -> usize {
    limit(field, bound, Bound::Lower)
}

/// Bound-preserving limiter
///
/// * An element mean on the wrong side of the bound is reset to the bound and the higher components are dropped.
/// * Otherwise the higher components are scaled by `θ = (bound - mean) / (extreme - mean)`, where `extreme` is the
///   most violating value found at the volume and edge Gauss points. This keeps the mean unchanged.
fn limit(field: &mut DgField, bound: f64, side: Bound) -> usize {
    let n = field.components();
    let samples = sample_points(field.degree());

    let limited = field
        .par_rows_mut()
        .map(|coefficients| limit_elem(coefficients, &samples, n, bound, side) as usize)
        .sum();

    if limited > 0 {
        trace!(
            "limited {} Elems against {:?} bound {}",
            limited,
            side,
            bound
        );
    }

    limited
}

fn limit_elem(
    coefficients: &mut [f64],
    samples: &[[f64; MAX_DG_COMPONENTS]],
    n: usize,
    bound: f64,
    side: Bound,
) -> bool {
    let mean = coefficients[0];

    if side.violated_by(mean, bound) {
        coefficients[0] = bound;
        coefficients[1..].fill(0.0);
        return true;
    }

    if n == 1 {
        return false;
    }

    let extreme = samples.iter().fold(mean, |acc, basis| {
        let value: f64 = coefficients
            .iter()
            .zip(basis[..n].iter())
            .map(|(c, b)| c * b)
            .sum();
        side.extreme(acc, value)
    });

    if !side.violated_by(extreme, bound) {
        return false;
    }

    let theta = ((bound - mean) / (extreme - mean)).clamp(0.0, 1.0);
    coefficients[1..].iter_mut().for_each(|c| *c *= theta);
    true
}

/// Basis values at the points where the bound is checked: the volume Gauss points and the edge Gauss points
fn sample_points(degree: DgDegree) -> Vec<[f64; MAX_DG_COMPONENTS]> {
    if degree == DgDegree::Dg0 {
        return Vec::new();
    }

    let rule = QuadratureRule::default();
    let volume = rule.tensor_points().map(|(s, t, _)| (s, t));
    let edges = (0..4).flat_map(|edge| {
        rule.edge_points(edge)
            .map(|(s, t, _)| (s, t))
            .collect::<Vec<_>>()
    });

    volume
        .chain(edges)
        .map(|(s, t)| {
            let mut basis = [0.0; MAX_DG_COMPONENTS];
            for (k, b) in basis.iter_mut().enumerate() {
                *b = basis_value(k, s, t);
            }
            basis
        })
        .collect()
}
