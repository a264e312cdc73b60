//! Spatial operators of the momentum equation
//!
//! The velocity lives on the vertex grid (CG1) while strain rates and stresses are DG fields of the stress degree.
//! These operators move information between the two:
//! * [strain_rate] differentiates the CG velocity and projects the result onto the DG stress space
//! * [stress_divergence_into] integrates the DG stress against the gradients of the CG1 shape functions, giving a nodal
//!   force per unit area

use crate::domain::fields::basis::{basis_value, cg1_shape_gradient, BASIS_NORMS};
use crate::domain::{CgField, DgDegree, DgField, Mesh, V2D};
use crate::integration::QuadratureRule;

use rayon::prelude::*;

/// A symmetric 2x2 tensor field (strain rate or stress): one DG field for each independent component
#[derive(Clone, Debug, PartialEq)]
pub struct TensorField {
    pub xx: DgField,
    pub xy: DgField,
    pub yy: DgField,
}

impl TensorField {
    pub fn by_mesh(mesh: &Mesh, degree: DgDegree) -> Self {
        let field = DgField::by_mesh(mesh, degree);
        Self {
            xx: field.clone(),
            xy: field.clone(),
            yy: field,
        }
    }

    pub fn degree(&self) -> DgDegree {
        self.xx.degree()
    }

    pub fn zero(&mut self) {
        self.xx.zero();
        self.xy.zero();
        self.yy.zero();
    }
}

/// `DELTA = sqrt(DeltaMin² + 1.25(E11² + E22²) + 1.5·E11·E22 + E12²)`
#[inline]
pub fn delta(e11: f64, e12: f64, e22: f64, delta_min: f64) -> f64 {
    (delta_min * delta_min
        + 1.25 * (e11 * e11 + e22 * e22)
        + 1.5 * e11 * e22
        + e12 * e12)
        .sqrt()
}

/// Maximum shear strain rate `sqrt((E11 - E22)² + 4·E12²)`
#[inline]
pub fn shear(e11: f64, e12: f64, e22: f64) -> f64 {
    ((e11 - e22).powi(2) + 4.0 * e12 * e12).sqrt()
}

/// Strain rate tensor `E = (∇v + ∇vᵀ) / 2` of a CG1 velocity, projected onto the DG space of `degree`
pub fn strain_rate(mesh: &Mesh, vx: &CgField, vy: &CgField, degree: DgDegree) -> TensorField {
    let mut strain = TensorField::by_mesh(mesh, degree);
    strain_rate_into(mesh, vx, vy, &mut strain);
    strain
}

pub fn strain_rate_into(mesh: &Mesh, vx: &CgField, vy: &CgField, strain: &mut TensorField) {
    let rule = QuadratureRule::default();
    let TensorField { xx, xy, yy } = strain;

    xx.par_rows_mut()
        .zip(xy.par_rows_mut())
        .zip(yy.par_rows_mut())
        .enumerate()
        .for_each(|(elem_id, ((e11, e12), e22))| {
            let elem = mesh.elem(elem_id);
            let vx_local = vx.elem_values(mesh, elem_id);
            let vy_local = vy.elem_values(mesh, elem_id);

            e11.fill(0.0);
            e12.fill(0.0);
            e22.fill(0.0);

            for (s, t, w) in rule.tensor_points() {
                let mut grad_vx = [0.0; 2];
                let mut grad_vy = [0.0; 2];
                for (i, [gs, gt]) in cg1_shape_gradient(s, t).iter().enumerate() {
                    grad_vx[0] += vx_local[i] * gs / elem.hx;
                    grad_vx[1] += vx_local[i] * gt / elem.hy;
                    grad_vy[0] += vy_local[i] * gs / elem.hx;
                    grad_vy[1] += vy_local[i] * gt / elem.hy;
                }

                let exx = grad_vx[0];
                let exy = 0.5 * (grad_vx[1] + grad_vy[0]);
                let eyy = grad_vy[1];

                for k in 0..e11.len() {
                    let psi = w * basis_value(k, s, t);
                    e11[k] += exx * psi;
                    e12[k] += exy * psi;
                    e22[k] += eyy * psi;
                }
            }

            for k in 0..e11.len() {
                e11[k] /= BASIS_NORMS[k];
                e12[k] /= BASIS_NORMS[k];
                e22[k] /= BASIS_NORMS[k];
            }
        });
}

/// Lumped (row-sum) CG1 mass matrix: the area associated with each vertex
pub fn lumped_mass(mesh: &Mesh) -> CgField {
    let mut mass = CgField::by_mesh(mesh);
    for elem in mesh.elems() {
        for vertex_id in elem.vertices {
            mass[vertex_id] += elem.area() / 4.0;
        }
    }
    mass
}

/// Divergence of the stress tensor as a force per unit area on each vertex
///
/// `F_i = -(1/m_i) Σ_E ∫_E S·∇φ_i`, with the lumped mass `m_i`. The boundary term is dropped (the velocity is
/// zeroed on the boundary anyway).
pub fn stress_divergence_into(
    mesh: &Mesh,
    stress: &TensorField,
    mass: &CgField,
    fx: &mut CgField,
    fy: &mut CgField,
) {
    let rule = QuadratureRule::default();

    let contributions: Vec<[V2D; 4]> = mesh
        .elems
        .par_iter()
        .map(|elem| {
            let mut local = [[0.0; 2]; 4];
            for (s, t, w) in rule.tensor_points() {
                let weight = w * elem.area();
                let s11 = stress.xx.evaluate(elem.id, s, t);
                let s12 = stress.xy.evaluate(elem.id, s, t);
                let s22 = stress.yy.evaluate(elem.id, s, t);

                for (f, [gs, gt]) in local.iter_mut().zip(cg1_shape_gradient(s, t).iter()) {
                    let (dx, dy) = (gs / elem.hx, gt / elem.hy);
                    f[0] -= weight * (s11 * dx + s12 * dy);
                    f[1] -= weight * (s12 * dx + s22 * dy);
                }
            }
            local.map(V2D::from)
        })
        .collect();

    fx.fill(0.0);
    fy.fill(0.0);
    for (elem, local) in mesh.elems().zip(contributions.iter()) {
        for (vertex_id, f) in elem.vertices.iter().zip(local.iter()) {
            fx[*vertex_id] += f.x();
            fy[*vertex_id] += f.y();
        }
    }

    for ((x, y), m) in fx
        .values_mut()
        .iter_mut()
        .zip(fy.values_mut().iter_mut())
        .zip(mass.values().iter())
    {
        *x /= m;
        *y /= m;
    }
}

/// Element-mean `DELTA` diagnostic of a strain rate field
pub fn delta_field(strain: &TensorField, delta_min: f64) -> DgField {
    let values = (0..strain.xx.element_count())
        .map(|e| {
            delta(
                strain.xx.mean(e),
                strain.xy.mean(e),
                strain.yy.mean(e),
                delta_min,
            )
        })
        .collect();
    DgField::from_data(DgDegree::Dg0, values)
}

/// Element-mean maximum shear strain rate diagnostic
pub fn shear_field(strain: &TensorField) -> DgField {
    let values = (0..strain.xx.element_count())
        .map(|e| shear(strain.xx.mean(e), strain.xy.mean(e), strain.yy.mean(e)))
        .collect();
    DgField::from_data(DgDegree::Dg0, values)
}
