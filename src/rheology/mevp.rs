use super::{relaxed_velocity, MomentumParameters, Rheology, StressInput, VertexState};
use crate::domain::{DgField, V2D};
use crate::momentum::{delta, TensorField};

use rayon::prelude::*;

/// Parameters of the viscous-plastic constitutive law
#[derive(Clone, Debug, PartialEq)]
pub struct VpParameters {
    /// Ice strength (N/m²)
    pub pstar: f64,
    /// Lower bound of `DELTA` (1/s), regularising the viscosities
    pub delta_min: f64,
    /// Strength reduction with open water, `P = P* H exp(-c (1 - A))`
    pub compaction: f64,
}

impl Default for VpParameters {
    fn default() -> Self {
        Self {
            pstar: 27500.0,
            delta_min: 2.0e-9,
            compaction: 20.0,
        }
    }
}

/// Bulk and shear viscosities of one Elem, evaluated from the element means
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viscosities {
    pub pressure: f64,
    pub zeta: f64,
    pub eta: f64,
}

impl Viscosities {
    /// Panics if `DELTA` is not positive.
    pub fn new(vp: &VpParameters, strain_means: [f64; 3], thickness: f64, concentration: f64) -> Self {
        let [e11, e12, e22] = strain_means;
        let delta = delta(e11, e12, e22, vp.delta_min);
        assert!(
            delta > 0.0,
            "DELTA must be positive (found {}); increase DeltaMin!",
            delta
        );

        let pressure = vp.pstar * thickness * (-vp.compaction * (1.0 - concentration)).exp();
        let zeta = pressure / (2.0 * delta);

        Self {
            pressure,
            zeta,
            eta: zeta / 4.0,
        }
    }

    /// Component `k` of the viscous-plastic stress `(S11, S12, S22)` for the strain components `e11, e12, e22`
    pub fn stress(&self, k: usize, e11: f64, e12: f64, e22: f64) -> [f64; 3] {
        let bulk = (self.zeta - self.eta) * (e11 + e22);
        let pressure = if k == 0 { 0.5 * self.pressure } else { 0.0 };

        [
            2.0 * self.eta * e11 + bulk - pressure,
            2.0 * self.eta * e12,
            2.0 * self.eta * e22 + bulk - pressure,
        ]
    }
}

/// Relax every stress component towards the viscous-plastic stress: `S ← S + (S_vp - S) / alpha`
///
/// Elems with a mean concentration at or below `min_concentration` carry no stress.
pub(crate) fn relax_to_vp_stress(
    vp: &VpParameters,
    input: &StressInput,
    stress: &mut TensorField,
    alpha: f64,
    min_concentration: f64,
) {
    let strain = input.strain;
    let TensorField { xx, xy, yy } = stress;

    xx.par_rows_mut()
        .zip(xy.par_rows_mut())
        .zip(yy.par_rows_mut())
        .enumerate()
        .for_each(|(elem_id, ((s11, s12), s22))| {
            let concentration = input.concentration.mean(elem_id);
            if concentration <= min_concentration {
                s11.fill(0.0);
                s12.fill(0.0);
                s22.fill(0.0);
                return;
            }

            let (e11, e12, e22) = (
                strain.xx.row(elem_id),
                strain.xy.row(elem_id),
                strain.yy.row(elem_id),
            );

            let viscosities = Viscosities::new(
                vp,
                [e11[0], e12[0], e22[0]],
                input.thickness.mean(elem_id),
                concentration,
            );

            for k in 0..s11.len() {
                let [vp11, vp12, vp22] = viscosities.stress(k, e11[k], e12[k], e22[k]);
                s11[k] += (vp11 - s11[k]) / alpha;
                s12[k] += (vp12 - s12[k]) / alpha;
                s22[k] += (vp22 - s22[k]) / alpha;
            }
        });
}

/// Viscous-plastic rheology with the modified elastic-viscous-plastic (mEVP) pseudo-time iteration
///
/// Each of the `substeps` iterations relaxes the stress towards the VP stress with factor `alpha` and the velocity
/// towards the implicit solution with factor `beta`. Every iteration uses the full outer timestep.
#[derive(Clone, Debug)]
pub struct Mevp {
    momentum: MomentumParameters,
    vp: VpParameters,
    alpha: f64,
    beta: f64,
    min_concentration: f64,
}

impl Mevp {
    pub fn new(
        momentum: MomentumParameters,
        vp: VpParameters,
        alpha: f64,
        beta: f64,
        min_concentration: f64,
    ) -> Self {
        assert!(
            alpha >= 1.0 && beta >= 0.0,
            "mEVP relaxation factors out of range (alpha: {}, beta: {})!",
            alpha,
            beta
        );

        Self {
            momentum,
            vp,
            alpha,
            beta,
            min_concentration,
        }
    }

    pub fn vp_parameters(&self) -> &VpParameters {
        &self.vp
    }
}

impl Default for Mevp {
    fn default() -> Self {
        Self::new(
            MomentumParameters::default(),
            VpParameters::default(),
            1500.0,
            1500.0,
            0.0,
        )
    }
}

impl Rheology for Mevp {
    fn name(&self) -> &'static str {
        "mEVP"
    }

    fn momentum_dt(&self, dt: f64, _substeps: usize) -> f64 {
        dt
    }

    fn compute_stress(
        &mut self,
        input: &StressInput,
        stress: &mut TensorField,
        _damage: &mut DgField,
        _dt: f64,
    ) {
        relax_to_vp_stress(&self.vp, input, stress, self.alpha, self.min_concentration);
    }

    fn velocity_increment(&self, state: &VertexState, dt: f64) -> V2D {
        relaxed_velocity(
            &self.momentum,
            state,
            dt,
            self.beta,
            state.initial_velocity,
        ) - state.velocity
    }
}
