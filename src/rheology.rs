//! Rheologies: how the ice stress responds to deformation, and how the velocity responds to stress and forcing
//!
//! Every rheology implements the [Rheology] trait, which the kernel drives once per momentum substep:
//! 1. [Rheology::compute_stress] updates the stress (and possibly the damage) from the current strain rate
//! 2. [Rheology::velocity_increment] is evaluated on every vertex, given the local [VertexState]

/// Free drift: no internal stress
pub mod free_drift;
/// Elasto-brittle rheology with damage (MEB)
pub mod meb;
/// Viscous-plastic rheology solved with the modified EVP scheme
pub mod mevp;

use crate::domain::{DgField, Mesh, V2D};
use crate::momentum::TensorField;

use std::fmt;
use std::str::FromStr;

/// Physical constants of the momentum equation
#[derive(Clone, Debug, PartialEq)]
pub struct MomentumParameters {
    /// Ice density (kg/m³)
    pub rho_ice: f64,
    /// Air density (kg/m³)
    pub rho_atm: f64,
    /// Ocean density (kg/m³)
    pub rho_ocean: f64,
    /// Air drag coefficient
    pub c_atm: f64,
    /// Ocean drag coefficient
    pub c_ocean: f64,
    /// Coriolis parameter (1/s)
    pub coriolis: f64,
    /// Lower bound applied to the vertex interpolant of the ice thickness (m)
    pub min_thickness: f64,
}

impl Default for MomentumParameters {
    fn default() -> Self {
        Self {
            rho_ice: 900.0,
            rho_atm: 1.3,
            rho_ocean: 1026.0,
            c_atm: 1.2e-3,
            c_ocean: 5.5e-3,
            coriolis: 1.46e-4,
            min_thickness: 1.0e-4,
        }
    }
}

impl MomentumParameters {
    /// Effective air drag `C_atm · rho_atm`
    pub fn f_atm(&self) -> f64 {
        self.c_atm * self.rho_atm
    }

    /// Effective ocean drag `C_ocean · rho_ocean`
    pub fn f_ocean(&self) -> f64 {
        self.c_ocean * self.rho_ocean
    }
}

/// Everything the velocity update needs to know about one vertex
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexState {
    /// Ice thickness (already bounded from below)
    pub thickness: f64,
    pub concentration: f64,
    /// Current velocity estimate
    pub velocity: V2D,
    /// Velocity at the start of the outer timestep
    pub initial_velocity: V2D,
    pub wind: V2D,
    pub ocean: V2D,
    /// Divergence of the stress (force per unit area)
    pub stress_force: V2D,
}

/// Read-only state handed to [Rheology::compute_stress]
pub struct StressInput<'a> {
    pub mesh: &'a Mesh,
    pub strain: &'a TensorField,
    pub thickness: &'a DgField,
    pub concentration: &'a DgField,
}

/// Common interface of the rheology solvers
pub trait Rheology: Send + Sync {
    fn name(&self) -> &'static str;

    /// Does the velocity update depend on the stress divergence?
    fn uses_stress(&self) -> bool {
        true
    }

    /// Timestep of each of the `substeps` momentum iterations within an outer step of length `dt`
    fn momentum_dt(&self, dt: f64, substeps: usize) -> f64 {
        dt / substeps as f64
    }

    /// Called once per outer timestep, before the momentum iterations
    fn prepare_iteration(&mut self, _dt: f64) {}

    /// Update the stress (and the damage, for damage-carrying rheologies) over one momentum substep
    fn compute_stress(
        &mut self,
        input: &StressInput,
        stress: &mut TensorField,
        damage: &mut DgField,
        dt: f64,
    );

    /// Change of velocity at one vertex over one momentum substep
    fn velocity_increment(&self, state: &VertexState, dt: f64) -> V2D;
}

/// The rheologies available to the kernel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RheologyKind {
    FreeDrift,
    Mevp,
    Meb,
}

impl FromStr for RheologyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free_drift" => Ok(Self::FreeDrift),
            "mevp" => Ok(Self::Mevp),
            "meb" => Ok(Self::Meb),
            _ => Err(format!(
                "Unknown rheology '{}'; expected 'free_drift', 'mevp' or 'meb'!",
                s
            )),
        }
    }
}

impl fmt::Display for RheologyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FreeDrift => write!(f, "free_drift"),
            Self::Mevp => write!(f, "mevp"),
            Self::Meb => write!(f, "meb"),
        }
    }
}

/// Semi-implicit velocity update shared by the stress-carrying rheologies
///
/// ```text
/// v' = [ m/dt (β·v + anchor) + A (F_atm |a| a + F_ocean |o - v| o) - m fc k×(v - o) + F_div ]
///      / [ m/dt (1 + β) + A F_ocean |o - v| ]
/// ```
///
/// The ocean drag is treated implicitly, the Coriolis term explicitly. With `β = 0` and `anchor = v` this is a plain
/// explicit substep.
pub(crate) fn relaxed_velocity(
    params: &MomentumParameters,
    state: &VertexState,
    dt: f64,
    beta: f64,
    anchor: V2D,
) -> V2D {
    let mass = params.rho_ice * state.thickness;
    let relative = state.velocity - state.ocean;

    let ocean_drag = state.concentration * params.f_ocean() * relative.norm();
    let wind_stress = state.wind * (state.concentration * params.f_atm() * state.wind.norm());
    let coriolis = -relative.perp() * (mass * params.coriolis);

    let numerator = (state.velocity * beta + anchor) * (mass / dt)
        + wind_stress
        + state.ocean * ocean_drag
        + coriolis
        + state.stress_force;

    numerator / (mass / dt * (1.0 + beta) + ocean_drag)
}
