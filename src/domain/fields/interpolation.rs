use super::basis::{basis_value, cg1_interpolate, DgDegree, BASIS_NORMS};
use super::{CgField, DgField};
use crate::domain::mesh::Mesh;
use crate::integration::QuadratureRule;

use rayon::prelude::*;

/// Interpolate the element means of a DG field onto the vertex grid
///
/// Each vertex takes the area-weighted average of the means of the (up to four) `Elem`s around it. Higher DG
/// components are ignored, so the result is a smoothed, first-order approximation of the DG field:
/// * a uniform field is reproduced exactly
/// * for data that is linear in space, interior vertices of a uniform mesh recover the exact value (the mean of the
///   four surrounding element means)
/// * boundary vertices average only the one or two `Elem`s inside the domain, so they are one-sided and carry an
///   `O(h)` error for non-uniform data
///
/// A round trip through [cg_to_dg] therefore does not reproduce a DG field in general; only element means of uniform
/// data survive it unchanged.
pub fn dg_to_cg(mesh: &Mesh, dg: &DgField) -> CgField {
    let mut cg = CgField::by_mesh(mesh);
    dg_to_cg_into(mesh, dg, &mut cg);
    cg
}

pub fn dg_to_cg_into(mesh: &Mesh, dg: &DgField, cg: &mut CgField) {
    assert_eq!(dg.element_count(), mesh.element_count());

    cg.values_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(vertex_id, value)| {
            let vertex = mesh.vertex(vertex_id);
            let (weighted, area) = vertex.elems().iter().fold((0.0, 0.0), |(sum, a), elem_id| {
                let elem_area = mesh.elem(*elem_id).area();
                (sum + elem_area * dg.mean(*elem_id), a + elem_area)
            });
            *value = weighted / area;
        });
}

/// L2-project a bilinear CG field onto the DG space of `degree`
///
/// The projection is computed with a 3x3 Gauss-Legendre rule, which is exact for all supported degrees. A
/// bilinear field is reproduced exactly from [DgDegree::Dg2] upward.
pub fn cg_to_dg(mesh: &Mesh, cg: &CgField, degree: DgDegree) -> DgField {
    let mut dg = DgField::by_mesh(mesh, degree);
    cg_to_dg_into(mesh, cg, &mut dg);
    dg
}

pub fn cg_to_dg_into(mesh: &Mesh, cg: &CgField, dg: &mut DgField) {
    assert_eq!(cg.len(), mesh.vertex_count());
    assert_eq!(dg.element_count(), mesh.element_count());

    let rule = QuadratureRule::default();

    dg.par_rows_mut()
        .enumerate()
        .for_each(|(elem_id, coefficients)| {
            let vertex_values = cg.elem_values(mesh, elem_id);
            coefficients.fill(0.0);

            for (s, t, w) in rule.tensor_points() {
                let value = w * cg1_interpolate(vertex_values, s, t);
                for (k, c) in coefficients.iter_mut().enumerate() {
                    *c += value * basis_value(k, s, t);
                }
            }

            coefficients
                .iter_mut()
                .zip(BASIS_NORMS.iter())
                .for_each(|(c, norm)| *c /= norm);
        });
}
