/// CG and DG field containers (and the conversions between them)
pub mod fields;
/// The internal geometric structure of the model domain
pub mod mesh;

pub use fields::{
    basis::DgDegree,
    interpolation::{cg_to_dg, dg_to_cg},
    CgField, DgField,
};
pub use mesh::{
    elem::{Elem, ElemEdge},
    space::{Point, V2D},
    vertex::Vertex,
    Mesh, MeshError,
};
