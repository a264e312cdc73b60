/// Bound-preserving limiting of DG tracers
pub mod limiter;

use crate::domain::fields::basis::{basis_gradient, basis_value, BASIS_NORMS, MAX_DG_COMPONENTS};
use crate::domain::{cg_to_dg, CgField, DgDegree, DgField, ElemEdge, Mesh};
use crate::integration::QuadratureRule;

use log::debug;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Degree of the DG representation of the advecting velocity (represents a CG1 velocity exactly)
const VELOCITY_DEGREE: DgDegree = DgDegree::Dg2;

/// Explicit Runge-Kutta time-stepping scheme used by [DgTransport]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStepping {
    /// Forward Euler
    Rk1,
    /// Heun's method (the two stage SSP Runge-Kutta scheme)
    Rk2,
}

impl FromStr for TimeStepping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rk1" => Ok(Self::Rk1),
            "rk2" => Ok(Self::Rk2),
            _ => Err(format!(
                "Unknown time-stepping scheme '{}'; expected 'rk1' or 'rk2'!",
                s
            )),
        }
    }
}

impl fmt::Display for TimeStepping {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rk1 => write!(f, "rk1"),
            Self::Rk2 => write!(f, "rk2"),
        }
    }
}

/// Precomputed geometry and velocity data of the DG advection operator
struct AdvectionOperator {
    mesh: Arc<Mesh>,
    rule: QuadratureRule,
    /// Basis values, local gradients and weights at the volume quadrature points
    volume_basis: Vec<[f64; MAX_DG_COMPONENTS]>,
    volume_gradients: Vec<[[f64; 2]; MAX_DG_COMPONENTS]>,
    volume_weights: Vec<f64>,
    /// Basis values at the quadrature points of each edge (indexed by [ElemEdge::index])
    edge_basis: [Vec<[f64; MAX_DG_COMPONENTS]>; 4],
    /// Real-space velocity at the volume quadrature points of each Elem
    volume_velocity: Vec<[f64; 2]>,
    /// Outward normal velocity at the quadrature points of each edge of each Elem
    edge_velocity: Vec<f64>,
    max_speed: f64,
}

impl AdvectionOperator {
    fn new(mesh: Arc<Mesh>) -> Self {
        let rule = QuadratureRule::default();

        let basis_row = |s: f64, t: f64| {
            let mut row = [0.0; MAX_DG_COMPONENTS];
            for (k, b) in row.iter_mut().enumerate() {
                *b = basis_value(k, s, t);
            }
            row
        };

        let volume_basis = rule.tensor_points().map(|(s, t, _)| basis_row(s, t)).collect();
        let volume_gradients = rule
            .tensor_points()
            .map(|(s, t, _)| {
                let mut row = [[0.0; 2]; MAX_DG_COMPONENTS];
                for (k, g) in row.iter_mut().enumerate() {
                    *g = basis_gradient(k, s, t);
                }
                row
            })
            .collect();
        let volume_weights = rule.tensor_points().map(|(_, _, w)| w).collect();
        let edge_basis = [0, 1, 2, 3].map(|edge| {
            rule.edge_points(edge)
                .map(|(s, t, _)| basis_row(s, t))
                .collect()
        });

        let num_volume_points = rule.len() * rule.len();
        let num_edge_points = 4 * rule.len();
        let num_elems = mesh.element_count();

        Self {
            mesh,
            rule,
            volume_basis,
            volume_gradients,
            volume_weights,
            edge_basis,
            volume_velocity: vec![[0.0; 2]; num_elems * num_volume_points],
            edge_velocity: vec![0.0; num_elems * num_edge_points],
            max_speed: 0.0,
        }
    }

    fn prepare(&mut self, vx: &CgField, vy: &CgField) {
        let mesh = self.mesh.as_ref();
        let dg_vx = cg_to_dg(mesh, vx, VELOCITY_DEGREE);
        let dg_vy = cg_to_dg(mesh, vy, VELOCITY_DEGREE);

        let rule = &self.rule;
        let velocity_at = |elem_id: usize, s: f64, t: f64| {
            [
                dg_vx.evaluate(elem_id, s, t),
                dg_vy.evaluate(elem_id, s, t),
            ]
        };

        self.volume_velocity = (0..mesh.element_count())
            .into_par_iter()
            .flat_map_iter(|elem_id| {
                rule.tensor_points()
                    .map(move |(s, t, _)| velocity_at(elem_id, s, t))
            })
            .collect();

        // Both sides of an edge see the same averaged velocity, so the fluxes cancel exactly
        self.edge_velocity = (0..mesh.element_count())
            .into_par_iter()
            .flat_map_iter(|elem_id| {
                ElemEdge::ALL.into_iter().flat_map(move |edge| {
                    let [nx, ny] = edge.normal();
                    let neighbor = mesh.neighbor(elem_id, edge);

                    rule.edge_points(edge.index())
                        .zip(rule.edge_points(edge.opposite().index()))
                        .map(move |((s, t, _), (s_out, t_out, _))| {
                            let [ux, uy] = velocity_at(elem_id, s, t);
                            let [ux, uy] = match neighbor {
                                Some(neighbor_id) => {
                                    let [ox, oy] = velocity_at(neighbor_id, s_out, t_out);
                                    [(ux + ox) / 2.0, (uy + oy) / 2.0]
                                }
                                None => [ux, uy],
                            };
                            ux * nx + uy * ny
                        })
                })
            })
            .collect();

        self.max_speed = vx
            .values()
            .iter()
            .zip(vy.values().iter())
            .fold(0.0, |acc, (x, y)| f64::max(acc, x.hypot(*y)));

        debug!(
            "advection velocity prepared (max speed: {:.3e} m/s)",
            self.max_speed
        );
    }

    /// Compute the time derivative of each coefficient of `field` into `out`
    fn residual(&self, field: &DgField, out: &mut DgField) {
        let n = field.components();
        let nq = self.rule.len();
        let num_volume_points = nq * nq;
        let mesh = self.mesh.as_ref();

        out.par_rows_mut()
            .enumerate()
            .for_each(|(elem_id, r)| {
                let elem = mesh.elem(elem_id);
                let u = field.row(elem_id);
                r.fill(0.0);

                // volume term: ∫ u v·∇ψ_k
                let velocities =
                    &self.volume_velocity[elem_id * num_volume_points..(elem_id + 1) * num_volume_points];
                for (q, [vx, vy]) in velocities.iter().enumerate() {
                    let value = self.volume_weights[q] * dot(u, &self.volume_basis[q]);
                    for (k, rk) in r.iter_mut().enumerate().skip(1) {
                        let [gs, gt] = self.volume_gradients[q][k];
                        *rk += value * (vx * gs * elem.hy + vy * gt * elem.hx);
                    }
                }

                // edge term: -∮ (v·n) u* ψ_k, with the upwind value u*
                for edge in ElemEdge::ALL {
                    let e = edge.index();
                    let outer = mesh
                        .neighbor(elem_id, edge)
                        .map(|neighbor_id| (field.row(neighbor_id), edge.opposite().index()));
                    let length = elem.edge_length(edge);
                    let offset = (elem_id * 4 + e) * nq;

                    for p in 0..nq {
                        let vn = self.edge_velocity[offset + p];
                        let upwind = if vn >= 0.0 {
                            dot(u, &self.edge_basis[e][p])
                        } else {
                            match outer {
                                Some((u_out, e_out)) => dot(u_out, &self.edge_basis[e_out][p]),
                                None => 0.0,
                            }
                        };

                        let flux = length * self.rule.weights[p] * vn * upwind;
                        for (k, rk) in r.iter_mut().enumerate() {
                            *rk -= flux * self.edge_basis[e][p][k];
                        }
                    }
                }

                let area = elem.area();
                r.iter_mut()
                    .zip(BASIS_NORMS[..n].iter())
                    .for_each(|(rk, norm)| *rk /= area * norm);
            });
    }
}

#[inline]
fn dot(coefficients: &[f64], basis: &[f64; MAX_DG_COMPONENTS]) -> f64 {
    coefficients
        .iter()
        .zip(basis.iter())
        .map(|(c, b)| c * b)
        .sum()
}

/// Discontinuous Galerkin transport of tracer fields by a CG1 velocity
///
/// Usage per outer timestep: call [DgTransport::prepare_advection] once with the current velocity, then
/// [DgTransport::step] for every tracer. All tracers are advanced by the same velocity snapshot.
///
/// The edge fluxes use the upwind value; at the domain boundary the inflow value is zero. With a velocity whose
/// normal component vanishes on the boundary, the domain integral of each tracer is conserved up to rounding.
pub struct DgTransport {
    operator: AdvectionOperator,
    degree: DgDegree,
    scheme: TimeStepping,
    residual: DgField,
    stage: DgField,
}

impl DgTransport {
    pub fn new(mesh: Arc<Mesh>, degree: DgDegree, scheme: TimeStepping) -> Self {
        let residual = DgField::by_mesh(&mesh, degree);
        let stage = residual.clone();

        Self {
            operator: AdvectionOperator::new(mesh),
            degree,
            scheme,
            residual,
            stage,
        }
    }

    pub fn degree(&self) -> DgDegree {
        self.degree
    }

    pub fn scheme(&self) -> TimeStepping {
        self.scheme
    }

    /// Fix the velocity used by subsequent calls to [DgTransport::step]
    pub fn prepare_advection(&mut self, vx: &CgField, vy: &CgField) {
        let num_vertices = self.operator.mesh.vertex_count();
        assert!(
            vx.len() == num_vertices && vy.len() == num_vertices,
            "Advection velocity has {} / {} values, but the Mesh has {} vertices!",
            vx.len(),
            vy.len(),
            num_vertices
        );

        self.operator.prepare(vx, vy);
    }

    /// Advance `field` by `dt`
    ///
    /// Panics if the field does not have the configured tracer degree.
    pub fn step(&mut self, dt: f64, field: &mut DgField) {
        field.assert_degree(self.degree, "DgTransport::step");

        match self.scheme {
            TimeStepping::Rk1 => {
                self.operator.residual(field, &mut self.residual);
                field.add_scaled(dt, &self.residual);
            }
            TimeStepping::Rk2 => {
                self.operator.residual(field, &mut self.residual);
                self.stage.clone_from(field);
                self.stage.add_scaled(dt, &self.residual);

                self.operator.residual(&self.stage, &mut self.residual);
                self.stage.add_scaled(dt, &self.residual);

                field
                    .as_mut_slice()
                    .par_iter_mut()
                    .zip(self.stage.as_slice().par_iter())
                    .for_each(|(u, u_stage)| *u = 0.5 * (*u + u_stage));
            }
        }
    }

    /// Largest timestep satisfying the DG CFL condition for the prepared velocity
    ///
    /// Returns infinity for a fluid at rest.
    pub fn max_stable_timestep(&self) -> f64 {
        if self.operator.max_speed <= 0.0 {
            return f64::INFINITY;
        }

        let order = match self.degree {
            DgDegree::Dg0 => 0.0,
            DgDegree::Dg1 => 1.0,
            DgDegree::Dg2 | DgDegree::Dg2Plus => 2.0,
        };

        self.operator.mesh.min_size() / self.operator.max_speed / (2.0 * order + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cg_to_dg;
    use crate::domain::mesh::space::Point;
    use crate::transport::limiter::{limit_max, limit_min};

    /// Solid body rotation about the centre of the unit square, at rest on the boundary
    fn rotating_velocity(mesh: &Mesh) -> (CgField, CgField) {
        let mut vx = CgField::from_fn(mesh, |_, y| -(y - 0.5));
        let mut vy = CgField::from_fn(mesh, |x, _| x - 0.5);
        vx.dirichlet_zero(mesh);
        vy.dirichlet_zero(mesh);
        (vx, vy)
    }

    fn bump(mesh: &Mesh, degree: DgDegree) -> DgField {
        let cg = CgField::from_fn(mesh, |x, y| {
            (-((x - 0.35).powi(2) + (y - 0.5).powi(2)) / 0.01).exp()
        });
        cg_to_dg(mesh, &cg, degree)
    }

    #[test]
    fn parse_schemes() {
        assert_eq!("rk1".parse::<TimeStepping>(), Ok(TimeStepping::Rk1));
        assert_eq!("rk2".parse::<TimeStepping>(), Ok(TimeStepping::Rk2));
        assert!("rk3".parse::<TimeStepping>().is_err());
    }

    #[test]
    fn mass_is_conserved() {
        let mesh = Arc::new(Mesh::rectangular(16, 16, 1.0, 1.0).unwrap());
        let (vx, vy) = rotating_velocity(&mesh);

        for (degree, scheme) in [
            (DgDegree::Dg0, TimeStepping::Rk1),
            (DgDegree::Dg1, TimeStepping::Rk2),
            (DgDegree::Dg2, TimeStepping::Rk2),
        ] {
            let mut transport = DgTransport::new(mesh.clone(), degree, scheme);
            transport.prepare_advection(&vx, &vy);

            let dt = 0.5 * transport.max_stable_timestep();
            let mut field = bump(&mesh, degree);
            let initial = field.integral(&mesh);

            for _ in 0..20 {
                transport.step(dt, &mut field);
            }

            let drift = (field.integral(&mesh) - initial).abs() / initial;
            assert!(drift < 1e-10, "{} / {}: relative drift {}", degree, scheme, drift);
        }
    }

    #[test]
    fn mass_is_conserved_on_a_distorted_mesh() {
        let n = 8;
        let h = 1.0 / n as f64;
        let coords = (0..=n)
            .flat_map(|jy| {
                (0..=n).map(move |jx| {
                    let (x, y) = (jx as f64 * h, jy as f64 * h);
                    if jx == 0 || jy == 0 || jx == n || jy == n {
                        Point::new(x, y)
                    } else {
                        let phase = (jx * 7 + jy * 3) as f64;
                        Point::new(x + 0.02 * phase.sin(), y + 0.02 * phase.cos())
                    }
                })
            })
            .collect();
        let mesh = Arc::new(Mesh::from_vertices(n, n, coords).unwrap());
        let (vx, vy) = rotating_velocity(&mesh);

        for (degree, scheme) in [
            (DgDegree::Dg0, TimeStepping::Rk1),
            (DgDegree::Dg1, TimeStepping::Rk2),
        ] {
            let mut transport = DgTransport::new(mesh.clone(), degree, scheme);
            transport.prepare_advection(&vx, &vy);

            let dt = 0.5 * transport.max_stable_timestep();
            let mut field = bump(&mesh, degree);
            let initial = field.integral(&mesh);

            for _ in 0..20 {
                transport.step(dt, &mut field);
            }

            let drift = (field.integral(&mesh) - initial).abs() / initial;
            assert!(drift < 1e-10, "{} / {}: relative drift {}", degree, scheme, drift);
        }
    }

    #[test]
    fn conserved_and_bounded_with_limiting() {
        let mesh = Arc::new(Mesh::rectangular(12, 12, 1.0, 1.0).unwrap());
        let (vx, vy) = rotating_velocity(&mesh);
        let mut transport = DgTransport::new(mesh.clone(), DgDegree::Dg1, TimeStepping::Rk2);
        transport.prepare_advection(&vx, &vy);

        let dt = 0.5 * transport.max_stable_timestep();
        let mut field = bump(&mesh, DgDegree::Dg1);
        limit_min(&mut field, 0.0);
        limit_max(&mut field, 1.0);
        let initial = field.integral(&mesh);

        for _ in 0..20 {
            transport.step(dt, &mut field);
            limit_min(&mut field, 0.0);
            limit_max(&mut field, 1.0);
        }

        assert!((field.integral(&mesh) - initial).abs() / initial < 1e-3);
        assert!(field.means().iter().all(|m| (0.0..=1.0).contains(m)));
    }

    #[test]
    fn uniform_translation() {
        let mesh = Arc::new(Mesh::rectangular(6, 3, 6.0, 3.0).unwrap());
        let vx = CgField::uniform(mesh.vertex_count(), 1.0);
        let vy = CgField::new(mesh.vertex_count());

        let mut transport = DgTransport::new(mesh.clone(), DgDegree::Dg1, TimeStepping::Rk1);
        transport.prepare_advection(&vx, &vy);
        assert!((transport.max_stable_timestep() - 1.0 / 3.0).abs() < 1e-12);

        let mut field = DgField::uniform(DgDegree::Dg1, mesh.element_count(), 1.0);
        transport.step(0.1, &mut field);

        for elem in mesh.elems() {
            if elem.neighbors[ElemEdge::W.index()].is_some() {
                assert!((field.mean(elem.id) - 1.0).abs() < 1e-13);
            } else {
                // zero inflow through the western boundary
                assert!(field.mean(elem.id) < 1.0);
            }
        }
    }

    #[test]
    fn field_at_rest_is_unchanged() {
        let mesh = Arc::new(Mesh::rectangular(4, 4, 1.0, 1.0).unwrap());
        let zero = CgField::by_mesh(&mesh);
        let mut transport = DgTransport::new(mesh.clone(), DgDegree::Dg2, TimeStepping::Rk2);
        transport.prepare_advection(&zero, &zero);
        assert_eq!(transport.max_stable_timestep(), f64::INFINITY);

        let mut field = bump(&mesh, DgDegree::Dg2);
        let initial = field.clone();
        transport.step(100.0, &mut field);
        assert_eq!(field, initial);
    }

    #[test]
    #[should_panic]
    fn wrong_degree() {
        let mesh = Arc::new(Mesh::rectangular(2, 2, 1.0, 1.0).unwrap());
        let mut transport = DgTransport::new(mesh.clone(), DgDegree::Dg1, TimeStepping::Rk1);
        let mut field = DgField::by_mesh(&mesh, DgDegree::Dg2);
        transport.step(1.0, &mut field);
    }
}
