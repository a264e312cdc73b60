use super::{MomentumParameters, Rheology, StressInput, VertexState};
use crate::domain::{DgField, V2D};
use crate::momentum::TensorField;

use nalgebra::{Matrix2, Vector2};

/// Ice moving under wind and ocean drag and the Coriolis force only
///
/// The update is written for the velocity relative to the ocean, `w = v - o`. The ocean drag is linearised about
/// the previous estimate and the Coriolis term is implicit:
///
/// ```text
/// (m/dt + A F_ocean |w|) w' + m fc k×w' = m/dt w + A F_atm |a| a
/// ```
///
/// Without wind this contracts `|w|` on every substep.
#[derive(Clone, Debug, Default)]
pub struct FreeDrift {
    params: MomentumParameters,
}

impl FreeDrift {
    pub fn new(params: MomentumParameters) -> Self {
        Self { params }
    }
}

impl Rheology for FreeDrift {
    fn name(&self) -> &'static str {
        "free drift"
    }

    fn uses_stress(&self) -> bool {
        false
    }

    fn compute_stress(
        &mut self,
        _input: &StressInput,
        stress: &mut TensorField,
        _damage: &mut DgField,
        _dt: f64,
    ) {
        stress.zero();
    }

    fn velocity_increment(&self, state: &VertexState, dt: f64) -> V2D {
        let mass = self.params.rho_ice * state.thickness;
        let relative = state.velocity - state.ocean;

        let diagonal = mass / dt + state.concentration * self.params.f_ocean() * relative.norm();
        let rotation = mass * self.params.coriolis;

        // k×w = (-w_y, w_x)
        let system = Matrix2::new(diagonal, -rotation, rotation, diagonal);

        let wind_stress =
            state.wind * (state.concentration * self.params.f_atm() * state.wind.norm());
        let rhs = relative * (mass / dt) + wind_stress;

        match system.try_inverse() {
            Some(inverse) => {
                let solution = inverse * Vector2::new(rhs.x(), rhs.y());
                V2D::from([solution[0], solution[1]]) - relative
            }
            None => V2D::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drifting_state() -> VertexState {
        VertexState {
            thickness: 1.0,
            concentration: 1.0,
            ocean: V2D::from([0.1, -0.05]),
            ..Default::default()
        }
    }

    #[test]
    fn residual_decreases_without_wind() {
        let solver = FreeDrift::default();
        let mut state = drifting_state();
        let dt = solver.momentum_dt(120.0, 10);

        let mut residual = (state.velocity - state.ocean).norm();
        for _ in 0..10 {
            state.velocity = state.velocity + solver.velocity_increment(&state, dt);
            let next = (state.velocity - state.ocean).norm();
            assert!(next < residual, "{} !< {}", next, residual);
            residual = next;
        }
    }

    #[test]
    fn ocean_velocity_is_a_fixed_point() {
        let solver = FreeDrift::default();
        let mut state = drifting_state();
        state.velocity = state.ocean;

        let dv = solver.velocity_increment(&state, 12.0);
        assert!(dv.norm() < 1e-15);
    }

    #[test]
    fn wind_drives_ice() {
        let solver = FreeDrift::default();
        let state = VertexState {
            thickness: 0.5,
            concentration: 0.8,
            wind: V2D::from([10.0, 0.0]),
            ..Default::default()
        };

        let dv = solver.velocity_increment(&state, 60.0);
        assert!(dv.x() > 0.0);
        // Coriolis turns the ice to the right of the wind
        assert!(dv.y() < 0.0);
    }

    #[test]
    fn no_stress() {
        assert!(!FreeDrift::default().uses_stress());
        assert_eq!(FreeDrift::default().momentum_dt(120.0, 4), 30.0);
    }
}
