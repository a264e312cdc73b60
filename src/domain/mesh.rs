/// A quadrilateral Element of the Mesh
pub mod elem;
/// Structures to describe points and vectors in 2D real space
pub mod space;
/// A point of the vertex grid (where CG quantities live)
pub mod vertex;

use elem::{Elem, ElemEdge};
use space::Point;
use vertex::Vertex;

use std::fmt;

/// Geometry and connectivity of a logically structured quadrilateral mesh
///
/// The mesh has `nx * ny` [Elem]s and an `(nx + 1) * (ny + 1)` grid of [Vertex]s. Both are numbered row by row,
/// starting in the South-West corner:
///
/// ```text
///  y
///  ^   6 ----- 7 ----- 8
///  |   |   2   |   3   |
///  |   3 ----- 4 ----- 5
///  |   |   0   |   1   |
///  |   0 ----- 1 ----- 2
///  +-------------------------> x
/// ```
///
/// A `Mesh` is immutable once constructed.
#[derive(Debug, Clone)]
pub struct Mesh {
    nx: usize,
    ny: usize,
    pub(crate) elems: Vec<Elem>,
    vertices: Vec<Vertex>,
}

impl Mesh {
    /// Construct a uniform Cartesian mesh of `nx` by `ny` Elems covering `[0, lx] x [0, ly]`
    pub fn rectangular(nx: usize, ny: usize, lx: f64, ly: f64) -> Result<Self, MeshError> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::EmptyGrid);
        }

        let dx = lx / nx as f64;
        let dy = ly / ny as f64;

        let coords = (0..=ny)
            .flat_map(|jy| (0..=nx).map(move |jx| Point::new(jx as f64 * dx, jy as f64 * dy)))
            .collect();

        Self::from_vertices(nx, ny, coords)
    }

    /// Construct a (possibly mildly distorted) mesh from the coordinates of its vertex grid
    ///
    /// `coords` must hold `(nx + 1) * (ny + 1)` points ordered row by row. The size of each Elem is taken as the mean
    /// length of its opposite edges; the DG volume terms treat the Elem as a rectangle of that size. Edge integrals
    /// use the true edge lengths, so neighboring Elems exchange identical fluxes.
    pub fn from_vertices(nx: usize, ny: usize, coords: Vec<Point>) -> Result<Self, MeshError> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::EmptyGrid);
        }

        let expected = (nx + 1) * (ny + 1);
        if coords.len() != expected {
            return Err(MeshError::VertexCount {
                expected,
                found: coords.len(),
            });
        }

        let mut vertices: Vec<Vertex> = coords
            .iter()
            .enumerate()
            .map(|(vertex_id, point)| {
                let (jx, jy) = (vertex_id % (nx + 1), vertex_id / (nx + 1));
                Vertex::new(
                    vertex_id,
                    *point,
                    jx == 0 || jy == 0 || jx == nx || jy == ny,
                )
            })
            .collect();

        let mut elems = Vec::with_capacity(nx * ny);
        for iy in 0..ny {
            for ix in 0..nx {
                let elem_id = iy * nx + ix;
                let sw = iy * (nx + 1) + ix;
                let vertex_ids = [sw, sw + 1, sw + nx + 1, sw + nx + 2];
                let [p0, p1, p2, p3] = vertex_ids.map(|v| coords[v]);

                let edge_lengths = [p0.dist(&p1), p2.dist(&p3), p0.dist(&p2), p1.dist(&p3)];

                // rejects NaN lengths as well
                if !edge_lengths.iter().all(|length| *length > 0.0) {
                    return Err(MeshError::DegenerateElem(elem_id));
                }

                let neighbors = [
                    (iy > 0).then(|| elem_id - nx),
                    (iy + 1 < ny).then(|| elem_id + nx),
                    (ix > 0).then(|| elem_id - 1),
                    (ix + 1 < nx).then(|| elem_id + 1),
                ];

                let center = (p0 + p1 + p2 + p3) / 4.0;

                for vertex_id in vertex_ids {
                    vertices[vertex_id].connect_elem(elem_id);
                }

                elems.push(Elem::new(elem_id, vertex_ids, neighbors, edge_lengths, center));
            }
        }

        Ok(Self {
            nx,
            ny,
            elems,
            vertices,
        })
    }

    // ----------------------------------------------------------------------------------------------------
    // General Data Retrieval
    // ----------------------------------------------------------------------------------------------------

    pub fn element_count(&self) -> usize {
        self.elems.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of Elems in the `x` and `y` directions
    pub fn grid_size(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn elem(&self, elem_id: usize) -> &Elem {
        &self.elems[elem_id]
    }

    pub fn vertex(&self, vertex_id: usize) -> &Vertex {
        &self.vertices[vertex_id]
    }

    /// Size `(hx, hy)` of an [Elem]
    pub fn size(&self, elem_id: usize) -> (f64, f64) {
        let elem = &self.elems[elem_id];
        (elem.hx, elem.hy)
    }

    /// The [Elem] on the other side of one of an `Elem`s edges (`None` on the domain boundary)
    pub fn neighbor(&self, elem_id: usize, edge: ElemEdge) -> Option<usize> {
        self.elems[elem_id].neighbors[edge.index()]
    }

    /// Get the four vertex IDs composing an [Elem]
    pub fn elem_vertices(&self, elem_id: usize) -> [usize; 4] {
        self.elems[elem_id].vertices
    }

    /// Get the IDs of the [Elem]s sharing a [Vertex]
    pub fn vertex_elems(&self, vertex_id: usize) -> &[usize] {
        self.vertices[vertex_id].elems()
    }

    pub fn vertex_is_boundary(&self, vertex_id: usize) -> bool {
        self.vertices[vertex_id].boundary
    }

    /// Iterate over all `Elem`s in the mesh
    pub fn elems(&self) -> impl Iterator<Item = &Elem> + '_ {
        self.elems.iter()
    }

    /// Iterate over all `Vertex`s in the mesh
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// Smallest Elem size in either direction
    pub fn min_size(&self) -> f64 {
        self.elems
            .iter()
            .fold(f64::MAX, |acc, elem| acc.min(elem.hx).min(elem.hy))
    }

    /// Total area covered by the mesh
    pub fn area(&self) -> f64 {
        self.elems.iter().map(|elem| elem.area()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    EmptyGrid,
    VertexCount { expected: usize, found: usize },
    DegenerateElem(usize),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "Mesh must have at least one Elem in each direction!"),
            Self::VertexCount { expected, found } => write!(
                f,
                "Expected {} vertex coordinates, found {}; cannot construct Mesh!",
                expected, found
            ),
            Self::DegenerateElem(elem_id) => write!(
                f,
                "Elem {} has a non-positive size; cannot construct Mesh!",
                elem_id
            ),
        }
    }
}

impl std::error::Error for MeshError {}

#[cfg(test)]
mod tests {
    use super::*;

    const MESH_A_NEIGHBORS: [[Option<usize>; 4]; 6] = [
        [None, Some(3), None, Some(1)],
        [None, Some(4), Some(0), Some(2)],
        [None, Some(5), Some(1), None],
        [Some(0), None, None, Some(4)],
        [Some(1), None, Some(3), Some(5)],
        [Some(2), None, Some(4), None],
    ];

    #[test]
    fn rectangular_mesh_connectivity() {
        let mesh = Mesh::rectangular(3, 2, 3.0, 1.0).unwrap();

        assert_eq!(mesh.element_count(), 6);
        assert_eq!(mesh.vertex_count(), 12);

        for (elem_id, expected) in MESH_A_NEIGHBORS.iter().enumerate() {
            for edge in ElemEdge::ALL {
                assert_eq!(mesh.neighbor(elem_id, edge), expected[edge.index()]);

                if let Some(neighbor_id) = mesh.neighbor(elem_id, edge) {
                    assert_eq!(mesh.neighbor(neighbor_id, edge.opposite()), Some(elem_id));
                }
            }

            let (hx, hy) = mesh.size(elem_id);
            assert!((hx - 1.0).abs() < 1e-14);
            assert!((hy - 0.5).abs() < 1e-14);
        }

        assert_eq!(mesh.elem_vertices(4), [5, 6, 9, 10]);
        assert!((mesh.area() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn vertex_adjacency() {
        let mesh = Mesh::rectangular(3, 2, 3.0, 1.0).unwrap();

        let interior: Vec<usize> = mesh
            .vertices()
            .filter(|v| !v.boundary)
            .map(|v| v.id)
            .collect();
        assert_eq!(interior, vec![5, 6]);

        assert_eq!(mesh.vertex_elems(5), &[0, 1, 3, 4]);
        assert_eq!(mesh.vertex_elems(0), &[0]);
        assert_eq!(mesh.vertex_elems(1).len(), 2);

        for vertex in mesh.vertices() {
            for elem_id in vertex.elems() {
                assert!(mesh.elem_vertices(*elem_id).contains(&vertex.id));
            }
        }
    }

    #[test]
    fn distorted_mesh_sizes() {
        let nx = 2;
        let ny = 2;
        let coords = (0..=ny)
            .flat_map(|jy| {
                (0..=nx).map(move |jx| {
                    let shift = if jx == 1 && jy == 1 { 0.1 } else { 0.0 };
                    Point::new(jx as f64 + shift, jy as f64)
                })
            })
            .collect();

        let mesh = Mesh::from_vertices(nx, ny, coords).unwrap();
        let (hx, hy) = mesh.size(0);

        assert!((hx - (1.0 + 1.1) / 2.0).abs() < 1e-12);
        assert!(hy > 1.0);
        assert!(mesh.min_size() > 0.0);

        // Elems 0 and 1 share the edge between vertices 1 and 4
        let shared = mesh.elem(0).edge_length(ElemEdge::E);
        assert_eq!(shared, mesh.elem(1).edge_length(ElemEdge::W));
        assert!((shared - 0.1f64.hypot(1.0)).abs() < 1e-14);
        assert_eq!(mesh.grid_size(), (2, 2));
    }

    #[test]
    fn wrong_vertex_count() {
        let err = Mesh::from_vertices(2, 2, vec![Point::default(); 4]).unwrap_err();
        assert_eq!(
            err,
            MeshError::VertexCount {
                expected: 9,
                found: 4
            }
        );
    }

    #[test]
    fn degenerate_elem() {
        let err = Mesh::rectangular(2, 2, 0.0, 1.0).unwrap_err();
        assert_eq!(err, MeshError::DegenerateElem(0));
        assert_eq!(Mesh::rectangular(0, 2, 1.0, 1.0).unwrap_err(), MeshError::EmptyGrid);
    }
}
