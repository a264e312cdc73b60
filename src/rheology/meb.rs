use super::mevp::{Viscosities, VpParameters};
use super::{relaxed_velocity, MomentumParameters, Rheology, StressInput, VertexState};
use crate::domain::fields::basis::{basis_value, evaluate, BASIS_NORMS};
use crate::domain::{DgField, V2D};
use crate::integration::QuadratureRule;
use crate::momentum::TensorField;

use log::debug;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Material constants of the elasto-brittle rheology
#[derive(Clone, Debug, PartialEq)]
pub struct MebParameters {
    /// Young's modulus of undamaged ice (Pa)
    pub young: f64,
    /// Poisson ratio
    pub nu0: f64,
    /// Poisson ratio of the plane-stress factor `1 / (1 - ν²)` (equal to `nu0` except in [MebParameters::canada])
    pub d_unit_nu0: f64,
    /// Relaxation time of the stress for undamaged ice, `λ0` (s)
    pub undamaged_time_relaxation_sigma: f64,
    /// Exponent `α` of the damage dependence of the relaxation time
    pub exponent_relaxation_sigma: f64,
    /// Compaction parameter `c` in `exp(c (1 - A))` (negative)
    pub compaction_param: f64,
    /// Cohesion at the lab scale of 10 cm (Pa)
    pub c_lab: f64,
    /// Internal friction coefficient
    pub tan_phi: f64,
    /// Compressive strength (Pa)
    pub compr_strength: f64,
    /// Scaling of the ridging threshold `P_max = factor · H^1.5 · exp(-20 (1 - A))`
    pub compression_factor: f64,
    /// Healing timescale of the damage (s)
    pub time_relaxation_damage: f64,
    /// Ice density (kg/m³), used by the elastic damage timescale
    pub rho_ice: f64,
}

impl Default for MebParameters {
    fn default() -> Self {
        Self {
            young: 5.9605e8,
            nu0: 1.0 / 3.0,
            d_unit_nu0: 1.0 / 3.0,
            undamaged_time_relaxation_sigma: 1.0e7,
            exponent_relaxation_sigma: 5.0,
            compaction_param: -20.0,
            c_lab: 2.0e6,
            tan_phi: 0.7,
            compr_strength: 1.0e10,
            compression_factor: 10.0e3,
            time_relaxation_damage: 15.0 * 24.0 * 60.0 * 60.0,
            rho_ice: 900.0,
        }
    }
}

impl MebParameters {
    /// Constant set of the visco-elastic variant, where the elasticity scales with the ice thickness
    ///
    /// The plane-stress factor keeps the Poisson ratio of the default set.
    pub fn canada() -> Self {
        Self {
            young: 1.0e9,
            nu0: 0.3,
            undamaged_time_relaxation_sigma: 1.0e5,
            exponent_relaxation_sigma: 4.0,
            ..Default::default()
        }
    }

    /// `1 / (1 - ν²)`
    fn d_unit_factor(&self) -> f64 {
        1.0 / (1.0 - self.d_unit_nu0 * self.d_unit_nu0)
    }

    /// Elastic stress rate `C : E` for the elasticity `elasticity`
    fn elastic_stress(&self, elasticity: f64, [e11, e12, e22]: [f64; 3]) -> [f64; 3] {
        let shear = 1.0 / (1.0 + self.nu0);
        let bulk = self.d_unit_factor() * self.nu0 * (e11 + e22);
        [
            elasticity * (shear * e11 + bulk),
            elasticity * shear * e12,
            elasticity * (shear * e22 + bulk),
        ]
    }
}

/// How the stress of the elasto-brittle model is updated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MebStrategy {
    /// Elastic prediction, visco-elastic relaxation, then damage growth and healing
    Sandbox,
    /// Visco-elastic update evaluated at the Gauss points (thickness-scaled elasticity, no damage growth)
    ViscoElastic,
    /// Purely elastic stress `S = C : E`
    Elastic,
    /// The (non-relaxed) viscous-plastic stress
    ViscousPlastic,
}

impl FromStr for MebStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Self::Sandbox),
            "visco_elastic" => Ok(Self::ViscoElastic),
            "elastic" => Ok(Self::Elastic),
            "viscous_plastic" => Ok(Self::ViscousPlastic),
            _ => Err(format!(
                "Unknown MEB stress update '{}'; expected 'sandbox', 'visco_elastic', 'elastic' or 'viscous_plastic'!",
                s
            )),
        }
    }
}

/// Characteristic time `td` of damage growth
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageTimescale {
    /// A fixed time (s)
    Fixed(f64),
    /// Propagation time of an elastic wave across the Elem: `hx · sqrt(2 (1 + ν) ρ / elasticity)`
    Elastic,
}

impl Default for DamageTimescale {
    fn default() -> Self {
        Self::Fixed(20.0)
    }
}

/// Position of the stress state relative to the failure envelope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    /// Concentration below the threshold: no stress
    NoIce,
    /// Compressive, below the ridging threshold
    Compression,
    /// Compressive beyond the ridging threshold `P_max`
    Ridging,
    /// Tensile normal stress
    Tension,
}

impl Default for Regime {
    fn default() -> Self {
        Self::NoIce
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::NoIce => "no ice",
            Self::Compression => "compression",
            Self::Ridging => "ridging",
            Self::Tension => "tension",
        };
        write!(f, "{}", label)
    }
}

/// Per-Elem record of the last stress update
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MebDiagnostics {
    pub tilde_p: f64,
    pub p_max: f64,
    /// Elastic damage timescale (whether or not it was used)
    pub td: f64,
    pub dcrit: f64,
    pub regime: Regime,
    pub multiplicator: f64,
    /// Relaxation time `λ`
    pub lambda: f64,
    /// Was the stress relaxed by damage growth?
    pub stress_relaxed: bool,
    /// `σs / (C_fix + tanφ σn)` where the prediction lies outside the Mohr-Coulomb envelope, else 0
    pub sigma_outside: f64,
    /// Normal stress invariant `σn` after the update
    pub s1: f64,
    /// Shear stress invariant `σs` after the update
    pub s2: f64,
}

/// Maxwell elasto-brittle rheology
///
/// The damage is a tracer carried by the kernel. Its element mean is updated here and kept in `[0, 1]`. With the
/// [MebStrategy::Sandbox] update, Elems at or below `min_concentration` are reset to undamaged, stress-free ice.
#[derive(Clone, Debug)]
pub struct Meb {
    momentum: MomentumParameters,
    params: MebParameters,
    vp: VpParameters,
    strategy: MebStrategy,
    damage_timescale: DamageTimescale,
    min_concentration: f64,
    diagnostics: Vec<MebDiagnostics>,
}

impl Meb {
    pub fn new(
        momentum: MomentumParameters,
        params: MebParameters,
        vp: VpParameters,
        strategy: MebStrategy,
        damage_timescale: DamageTimescale,
        min_concentration: f64,
    ) -> Self {
        Self {
            momentum,
            params,
            vp,
            strategy,
            damage_timescale,
            min_concentration,
            diagnostics: Vec::new(),
        }
    }

    pub fn strategy(&self) -> MebStrategy {
        self.strategy
    }

    /// Diagnostics of the last stress update (one entry per Elem, empty before the first update)
    pub fn diagnostics(&self) -> &[MebDiagnostics] {
        &self.diagnostics
    }
}

impl Default for Meb {
    fn default() -> Self {
        Self::new(
            MomentumParameters::default(),
            MebParameters::default(),
            VpParameters::default(),
            MebStrategy::Sandbox,
            DamageTimescale::default(),
            0.1,
        )
    }
}

/// Per-Elem inputs of the stress update
struct ElemState<'a> {
    hx: f64,
    thickness: f64,
    concentration: f64,
    strain: [&'a [f64]; 3],
}

impl Meb {
    fn sandbox(
        &self,
        elem: &ElemState,
        s: [&mut [f64]; 3],
        damage: &mut f64,
        dt: f64,
    ) -> MebDiagnostics {
        let p = &self.params;
        let [s11, s12, s22] = s;
        let mut diag = MebDiagnostics::default();

        let mut sigma_n = 0.5 * (s11[0] + s22[0]);
        let tau = (0.5 * (s11[0] - s22[0])).hypot(s12[0]);
        assert!(tau >= 0.0, "Negative shear stress {}!", tau);

        let c_fix = p.c_lab * (0.1 / elem.hx).sqrt();
        if c_fix + p.tan_phi * sigma_n <= tau {
            diag.sigma_outside = tau / (c_fix + p.tan_phi * sigma_n);
        }

        let exp_c = (p.compaction_param * (1.0 - elem.concentration)).exp();
        let lambda = p.undamaged_time_relaxation_sigma
            * ((1.0 - *damage) * exp_c).powf(p.exponent_relaxation_sigma - 1.0);

        let p_max = p.compression_factor
            * elem.thickness.max(0.0).powf(1.5)
            * (-20.0 * (1.0 - elem.concentration)).exp();
        let tilde_p = if sigma_n < 0.0 {
            f64::min(1.0, -p_max / sigma_n)
        } else {
            0.0
        };

        diag.regime = if sigma_n > 0.0 {
            Regime::Tension
        } else if -p_max > sigma_n {
            Regime::Ridging
        } else {
            Regime::Compression
        };

        let multiplicator = f64::min(1.0 - 1e-12, lambda / (lambda + dt * (1.0 - tilde_p)));
        let elasticity = p.young * (1.0 - *damage) * exp_c;

        // elastic prediction, then visco-elastic relaxation
        for k in 0..s11.len() {
            let [r11, r12, r22] = p.elastic_stress(
                elasticity,
                [elem.strain[0][k], elem.strain[1][k], elem.strain[2][k]],
            );
            s11[k] = (s11[k] + dt * r11) * multiplicator;
            s12[k] = (s12[k] + dt * r12) * multiplicator;
            s22[k] = (s22[k] + dt * r22) * multiplicator;
        }

        let sigma_s = (0.5 * (s11[0] - s22[0])).hypot(s12[0]);
        sigma_n = 0.5 * (s11[0] + s22[0]);

        let dcrit = if sigma_n < -p.compr_strength {
            -p.compr_strength / sigma_n
        } else {
            c_fix / (sigma_s + p.tan_phi * sigma_n)
        };

        let td_elastic = if elasticity > 0.0 {
            elem.hx * (2.0 * (1.0 + p.nu0) * p.rho_ice).sqrt() / elasticity.sqrt()
        } else {
            f64::INFINITY
        };
        let td = match self.damage_timescale {
            DamageTimescale::Fixed(td) => td,
            DamageTimescale::Elastic => td_elastic,
        };

        if 0.0 < dcrit && dcrit < 1.0 {
            // a single substep can at most remove all of the remaining strength
            let rate = ((1.0 - dcrit) * dt / td).min(1.0);
            *damage += (1.0 - *damage) * rate;

            for c in s11.iter_mut().chain(s12.iter_mut()).chain(s22.iter_mut()) {
                *c -= *c * rate;
            }
            diag.stress_relaxed = true;
        }

        *damage = (*damage - dt / p.time_relaxation_damage).clamp(0.0, 1.0);

        diag.tilde_p = tilde_p;
        diag.p_max = p_max;
        diag.td = td_elastic;
        diag.dcrit = dcrit;
        diag.multiplicator = multiplicator;
        diag.lambda = lambda;
        diag.s1 = 0.5 * (s11[0] + s22[0]);
        diag.s2 = s12[0].hypot(0.5 * (s11[0] - s22[0]));
        diag
    }

    /// Visco-elastic update evaluated at the volume Gauss points and projected back onto the stress space
    fn visco_elastic(
        &self,
        elem: &ElemState,
        tracers: [&[f64]; 3],
        s: [&mut [f64]; 3],
        rule: &QuadratureRule,
        dt: f64,
    ) -> MebDiagnostics {
        let p = &self.params;
        let [h, a, d] = tracers;
        let n = s[0].len();
        let mut updated = [[0.0; 8]; 3];
        let mut mean_multiplicator = 0.0;
        let mut mean_lambda = 0.0;

        for (gs, gt, w) in rule.tensor_points() {
            let h_q = evaluate(h, gs, gt).max(0.0);
            let a_q = evaluate(a, gs, gt).clamp(0.0, 1.0);
            let d_q = evaluate(d, gs, gt).clamp(0.0, 1.0);

            let exp_c = (p.compaction_param * (1.0 - a_q)).exp();
            let elasticity = p.young * h_q * (1.0 - d_q) * exp_c;
            let lambda = p.undamaged_time_relaxation_sigma
                * (1.0 - d_q).powf(p.exponent_relaxation_sigma - 1.0);
            let multiplicator = 1.0 / (1.0 + dt / lambda);

            let strain = [
                evaluate(elem.strain[0], gs, gt),
                evaluate(elem.strain[1], gs, gt),
                evaluate(elem.strain[2], gs, gt),
            ];
            let rate = p.elastic_stress(elasticity, strain);

            for (c, (component, r)) in s.iter().zip(rate.iter()).enumerate() {
                let value = (evaluate(component, gs, gt) + dt * r) * multiplicator;
                for k in 0..n {
                    updated[c][k] += w * value * basis_value(k, gs, gt);
                }
            }

            mean_multiplicator += w * multiplicator;
            mean_lambda += w * lambda;
        }

        for (component, projected) in s.into_iter().zip(updated.iter()) {
            for k in 0..n {
                component[k] = projected[k] / BASIS_NORMS[k];
            }
        }

        MebDiagnostics {
            multiplicator: mean_multiplicator,
            lambda: mean_lambda,
            regime: Regime::Compression,
            ..Default::default()
        }
    }

    fn elastic(&self, elem: &ElemState, s: [&mut [f64]; 3]) -> MebDiagnostics {
        let [s11, s12, s22] = s;
        for k in 0..s11.len() {
            let [r11, r12, r22] = self.params.elastic_stress(
                self.params.young,
                [elem.strain[0][k], elem.strain[1][k], elem.strain[2][k]],
            );
            s11[k] = r11;
            s12[k] = r12;
            s22[k] = r22;
        }
        MebDiagnostics::default()
    }

    fn viscous_plastic(&self, elem: &ElemState, s: [&mut [f64]; 3]) -> MebDiagnostics {
        let [s11, s12, s22] = s;
        let [e11, e12, e22] = elem.strain;
        let viscosities = Viscosities::new(
            &self.vp,
            [e11[0], e12[0], e22[0]],
            elem.thickness,
            elem.concentration,
        );

        for k in 0..s11.len() {
            let [r11, r12, r22] = viscosities.stress(k, e11[k], e12[k], e22[k]);
            s11[k] = r11;
            s12[k] = r12;
            s22[k] = r22;
        }

        MebDiagnostics {
            p_max: viscosities.pressure,
            ..Default::default()
        }
    }
}

impl Rheology for Meb {
    fn name(&self) -> &'static str {
        "MEB"
    }

    fn prepare_iteration(&mut self, _dt: f64) {
        if let Some(first) = self.diagnostics.first() {
            let relaxed = self.diagnostics.iter().filter(|d| d.stress_relaxed).count();
            debug!(
                "MEB: {} of {} Elems damaged during the last substep (Elem 0: {})",
                relaxed,
                self.diagnostics.len(),
                first.regime
            );
        }
    }

    fn compute_stress(
        &mut self,
        input: &StressInput,
        stress: &mut TensorField,
        damage: &mut DgField,
        dt: f64,
    ) {
        let rule = QuadratureRule::default();
        let TensorField { xx, xy, yy } = stress;
        let solver = &*self;

        let mut diagnostics = Vec::with_capacity(input.mesh.element_count());
        xx.par_rows_mut()
            .zip(xy.par_rows_mut())
            .zip(yy.par_rows_mut())
            .zip(damage.par_rows_mut())
            .enumerate()
            .map(|(elem_id, (((s11, s12), s22), d))| {
                let concentration = input.concentration.mean(elem_id);
                // only the sandbox update treats sparse ice as open water
                if solver.strategy == MebStrategy::Sandbox
                    && concentration <= solver.min_concentration
                {
                    s11.fill(0.0);
                    s12.fill(0.0);
                    s22.fill(0.0);
                    d.fill(0.0);
                    return MebDiagnostics::default();
                }

                let elem = ElemState {
                    hx: input.mesh.elem(elem_id).hx,
                    thickness: input.thickness.mean(elem_id),
                    concentration,
                    strain: [
                        input.strain.xx.row(elem_id),
                        input.strain.xy.row(elem_id),
                        input.strain.yy.row(elem_id),
                    ],
                };

                match solver.strategy {
                    MebStrategy::Sandbox => solver.sandbox(&elem, [s11, s12, s22], &mut d[0], dt),
                    MebStrategy::ViscoElastic => solver.visco_elastic(
                        &elem,
                        [
                            input.thickness.row(elem_id),
                            input.concentration.row(elem_id),
                            &*d,
                        ],
                        [s11, s12, s22],
                        &rule,
                        dt,
                    ),
                    MebStrategy::Elastic => solver.elastic(&elem, [s11, s12, s22]),
                    MebStrategy::ViscousPlastic => solver.viscous_plastic(&elem, [s11, s12, s22]),
                }
            })
            .collect_into_vec(&mut diagnostics);

        self.diagnostics = diagnostics;
    }

    fn velocity_increment(&self, state: &VertexState, dt: f64) -> V2D {
        relaxed_velocity(&self.momentum, state, dt, 0.0, state.velocity) - state.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DgDegree, Mesh};
    use approx::assert_relative_eq;

    struct Setup {
        mesh: Mesh,
        strain: TensorField,
        thickness: DgField,
        concentration: DgField,
        stress: TensorField,
        damage: DgField,
    }

    fn setup(h: f64, a: f64) -> Setup {
        let mesh = Mesh::rectangular(3, 3, 3.0e4, 3.0e4).unwrap();
        let n = mesh.element_count();
        Setup {
            strain: TensorField::by_mesh(&mesh, DgDegree::Dg1),
            stress: TensorField::by_mesh(&mesh, DgDegree::Dg1),
            thickness: DgField::uniform(DgDegree::Dg1, n, h),
            concentration: DgField::uniform(DgDegree::Dg1, n, a),
            damage: DgField::by_mesh(&mesh, DgDegree::Dg1),
            mesh,
        }
    }

    fn run(solver: &mut Meb, s: &mut Setup, dt: f64) {
        let input = StressInput {
            mesh: &s.mesh,
            strain: &s.strain,
            thickness: &s.thickness,
            concentration: &s.concentration,
        };
        solver.compute_stress(&input, &mut s.stress, &mut s.damage, dt);
    }

    #[test]
    fn damage_stays_bounded() {
        let mut solver = Meb::default();
        let mut s = setup(1.0, 1.0);
        // strong convergent shear
        s.strain.xx.fill_means(-1.0e-5);
        s.strain.xy.fill_means(2.0e-5);
        s.strain.yy.fill_means(1.0e-6);

        for _ in 0..500 {
            run(&mut solver, &mut s, 1.2);
            assert!(s.damage.means().iter().all(|d| (0.0..=1.0).contains(d)));
        }

        assert!(s.damage.mean(0) > 0.0);
        assert!(solver.diagnostics().iter().any(|d| d.stress_relaxed));
        assert_eq!(solver.diagnostics().len(), 9);
    }

    #[test]
    fn damage_heals_without_deformation() {
        let mut solver = Meb::default();
        let mut s = setup(1.0, 1.0);
        s.damage.fill_means(0.5);

        run(&mut solver, &mut s, 3600.0);
        let expected = 0.5 - 3600.0 / MebParameters::default().time_relaxation_damage;
        assert_relative_eq!(s.damage.mean(4), expected, epsilon = 1e-12);
        assert!(!solver.diagnostics()[4].stress_relaxed);
    }

    #[test]
    fn long_substeps_keep_damage_bounded() {
        let mut solver = Meb::new(
            MomentumParameters::default(),
            MebParameters::default(),
            VpParameters::default(),
            MebStrategy::Sandbox,
            DamageTimescale::Fixed(1.0),
            0.1,
        );
        let mut s = setup(2.0, 1.0);
        s.strain.xy.fill_means(1.0e-4);

        for _ in 0..20 {
            run(&mut solver, &mut s, 100.0);
            assert!(s.damage.means().iter().all(|d| (0.0..=1.0).contains(d)));
        }
    }

    #[test]
    fn open_water_resets_damage_and_stress() {
        let mut solver = Meb::default();
        let mut s = setup(1.0, 0.05);
        s.damage.fill_means(0.7);
        s.stress.xx.fill_means(-1.0e3);
        s.strain.xx.fill_means(1.0e-6);

        run(&mut solver, &mut s, 10.0);
        assert!(s.damage.as_slice().iter().all(|d| *d == 0.0));
        assert!(s.stress.xx.as_slice().iter().all(|c| *c == 0.0));
        assert_eq!(solver.diagnostics()[0].regime, Regime::NoIce);
    }

    #[test]
    fn only_the_sandbox_treats_sparse_ice_as_open_water() {
        let mut solver = Meb::new(
            MomentumParameters::default(),
            MebParameters::default(),
            VpParameters::default(),
            MebStrategy::Elastic,
            DamageTimescale::default(),
            0.1,
        );
        let mut s = setup(1.0, 0.05);
        s.damage.fill_means(0.7);
        s.strain.xy.fill_means(1.0e-9);

        run(&mut solver, &mut s, 10.0);
        let p = MebParameters::default();
        let expected = p.young / (1.0 + p.nu0) * 1.0e-9;
        assert_relative_eq!(s.stress.xy.mean(0), expected, max_relative = 1e-12);
        assert_eq!(s.damage.mean(0), 0.7);
    }

    #[test]
    fn canada_constants_keep_the_default_plane_stress_factor() {
        let canada = MebParameters::canada();
        assert_eq!(canada.nu0, 0.3);
        assert_relative_eq!(canada.d_unit_factor(), 9.0 / 8.0, max_relative = 1e-14);
        assert_relative_eq!(
            MebParameters::default().d_unit_factor(),
            canada.d_unit_factor()
        );
    }

    #[test]
    fn elastic_prediction_of_small_strain() {
        let mut solver = Meb::default();
        let mut s = setup(1.0, 1.0);
        s.strain.xy.fill_means(1.0e-9);

        run(&mut solver, &mut s, 1.0);
        let p = MebParameters::default();
        let lambda = p.undamaged_time_relaxation_sigma;
        let expected = p.young / (1.0 + p.nu0) * 1.0e-9 * lambda / (lambda + 1.0);
        assert_relative_eq!(s.stress.xy.mean(0), expected, max_relative = 1e-12);
        assert_eq!(solver.diagnostics()[0].regime, Regime::Compression);
    }

    #[test]
    fn visco_elastic_projection_of_uniform_state() {
        let mut solver = Meb::new(
            MomentumParameters::default(),
            MebParameters::canada(),
            VpParameters::default(),
            MebStrategy::ViscoElastic,
            DamageTimescale::default(),
            0.1,
        );
        let mut s = setup(2.0, 1.0);
        s.strain.xx.fill_means(1.0e-7);

        run(&mut solver, &mut s, 10.0);

        let p = MebParameters::canada();
        let elasticity = p.young * 2.0;
        let multiplicator = 1.0 / (1.0 + 10.0 / p.undamaged_time_relaxation_sigma);
        let expected = 10.0
            * elasticity
            * (1.0 / (1.0 + p.nu0) + p.nu0 / (1.0 - 1.0 / 9.0))
            * 1.0e-7
            * multiplicator;
        assert_relative_eq!(s.stress.xx.mean(0), expected, max_relative = 1e-12);
        assert!(s.stress.xx.row(0)[1].abs() < 1e-9);
    }

    #[test]
    fn viscous_plastic_strategy() {
        let mut solver = Meb::new(
            MomentumParameters::default(),
            MebParameters::default(),
            VpParameters::default(),
            MebStrategy::ViscousPlastic,
            DamageTimescale::default(),
            0.1,
        );
        let mut s = setup(1.0, 1.0);
        run(&mut solver, &mut s, 10.0);
        assert_relative_eq!(s.stress.xx.mean(0), -0.5 * 27500.0);
        assert_relative_eq!(s.stress.yy.mean(8), -0.5 * 27500.0);
    }

    #[test]
    fn parse_strategies() {
        assert_eq!("sandbox".parse::<MebStrategy>(), Ok(MebStrategy::Sandbox));
        assert_eq!(
            "visco_elastic".parse::<MebStrategy>(),
            Ok(MebStrategy::ViscoElastic)
        );
        assert!("plastic".parse::<MebStrategy>().is_err());
    }

    #[test]
    fn explicit_velocity_substep() {
        let solver = Meb::default();
        let state = VertexState {
            thickness: 1.0,
            concentration: 1.0,
            velocity: V2D::from([0.1, 0.0]),
            ocean: V2D::from([0.1, 0.0]),
            ..Default::default()
        };
        assert!(solver.velocity_increment(&state, 1.2).norm() < 1e-15);
        assert_eq!(solver.momentum_dt(120.0, 100), 1.2);
    }
}
