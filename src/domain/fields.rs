/// The DG polynomial basis and the CG1 shape functions
pub mod basis;
/// Conversions between CG and DG representations
pub mod interpolation;

use super::mesh::Mesh;
use basis::{evaluate, DgDegree};

use rayon::prelude::*;
use std::ops::{Index, IndexMut};

/// A discontinuous field: one vector of polynomial coefficients per Elem
///
/// The coefficient vectors are stored back to back in a single buffer (one "row" per Elem). The degree is stored
/// alongside the data and checked wherever an operator expects a particular degree; this trades the compile-time
/// sizing of fixed-width rows for the ability to choose degrees from the run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DgField {
    degree: DgDegree,
    data: Vec<f64>,
}

impl DgField {
    /// A field of zeros over `num_elems` Elems
    pub fn new(degree: DgDegree, num_elems: usize) -> Self {
        Self {
            degree,
            data: vec![0.0; num_elems * degree.components()],
        }
    }

    pub fn by_mesh(mesh: &Mesh, degree: DgDegree) -> Self {
        Self::new(degree, mesh.element_count())
    }

    /// A field whose mean is `value` on every Elem (higher components are zero)
    pub fn uniform(degree: DgDegree, num_elems: usize, value: f64) -> Self {
        let mut field = Self::new(degree, num_elems);
        field.fill_means(value);
        field
    }

    /// Build a field from a flat coefficient buffer
    ///
    /// Panics if the buffer length is not a multiple of the component count.
    pub fn from_data(degree: DgDegree, data: Vec<f64>) -> Self {
        assert!(
            data.len() % degree.components() == 0,
            "DG data of length {} cannot be split into rows of {}!",
            data.len(),
            degree,
        );
        Self { degree, data }
    }

    pub fn degree(&self) -> DgDegree {
        self.degree
    }

    pub fn components(&self) -> usize {
        self.degree.components()
    }

    pub fn element_count(&self) -> usize {
        self.data.len() / self.components()
    }

    /// Fatal check that this field carries the degree an operator was configured for
    pub fn assert_degree(&self, expected: DgDegree, context: &str) {
        assert_eq!(
            self.degree, expected,
            "{}: field has {} but {} is configured!",
            context, self.degree, expected
        );
    }

    /// Coefficients of one Elem
    pub fn row(&self, elem_id: usize) -> &[f64] {
        let n = self.components();
        &self.data[elem_id * n..(elem_id + 1) * n]
    }

    pub fn row_mut(&mut self, elem_id: usize) -> &mut [f64] {
        let n = self.components();
        &mut self.data[elem_id * n..(elem_id + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks(self.components())
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> + '_ {
        let n = self.components();
        self.data.chunks_mut(n)
    }

    /// Rows for data-parallel per-Elem updates (each row has exactly one writer)
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        let n = self.components();
        self.data.par_chunks_mut(n)
    }

    /// Element mean (component 0)
    pub fn mean(&self, elem_id: usize) -> f64 {
        self.data[elem_id * self.components()]
    }

    pub fn set_mean(&mut self, elem_id: usize, value: f64) {
        let n = self.components();
        self.data[elem_id * n] = value;
    }

    pub fn means(&self) -> Vec<f64> {
        self.rows().map(|row| row[0]).collect()
    }

    /// Set every element mean to `value` and zero all higher components
    pub fn fill_means(&mut self, value: f64) {
        for row in self.rows_mut() {
            row.fill(0.0);
            row[0] = value;
        }
    }

    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    /// Value of the polynomial on Elem `elem_id` at local coordinates `(s, t)`
    pub fn evaluate(&self, elem_id: usize, s: f64, t: f64) -> f64 {
        evaluate(self.row(elem_id), s, t)
    }

    /// Domain integral of the field (the "mass" of a tracer)
    pub fn integral(&self, mesh: &Mesh) -> f64 {
        mesh.elems()
            .zip(self.rows())
            .map(|(elem, row)| elem.area() * row[0])
            .sum()
    }

    /// Copy of this field in another polynomial space
    ///
    /// Dropping components is the L2 projection (the basis is orthogonal); added components are zero.
    pub fn with_degree(&self, degree: DgDegree) -> Self {
        let mut projected = Self::new(degree, self.element_count());
        let n = self.components().min(degree.components());
        for (dst, src) in projected.rows_mut().zip(self.rows()) {
            dst[..n].copy_from_slice(&src[..n]);
        }
        projected
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// `self += factor * other`
    pub fn add_scaled(&mut self, factor: f64, other: &Self) {
        assert_eq!(self.degree, other.degree);
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, b)| *a += factor * b);
    }

    /// Largest absolute difference between the element means of two fields
    pub fn max_mean_difference(&self, other: &Self) -> f64 {
        self.rows()
            .zip(other.rows())
            .fold(0.0, |acc, (a, b)| f64::max(acc, (a[0] - b[0]).abs()))
    }
}

/// A continuous (CG1) field: one value per mesh Vertex
#[derive(Clone, Debug, PartialEq)]
pub struct CgField {
    data: Vec<f64>,
}

impl CgField {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            data: vec![0.0; num_vertices],
        }
    }

    pub fn by_mesh(mesh: &Mesh) -> Self {
        Self::new(mesh.vertex_count())
    }

    pub fn uniform(num_vertices: usize, value: f64) -> Self {
        Self {
            data: vec![value; num_vertices],
        }
    }

    pub fn from_data(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Evaluate a function of the vertex coordinates at every Vertex
    pub fn from_fn<F>(mesh: &Mesh, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        Self {
            data: mesh.vertices().map(|v| f(v.coords.x, v.coords.y)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// The four vertex values of an Elem in local order
    pub fn elem_values(&self, mesh: &Mesh, elem_id: usize) -> [f64; 4] {
        mesh.elem_vertices(elem_id).map(|v| self.data[v])
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Clamp every value into `[min, max]`
    pub fn clamp(&mut self, min: f64, max: f64) {
        self.data.iter_mut().for_each(|v| *v = v.clamp(min, max));
    }

    /// Set the values on the domain boundary to zero
    pub fn dirichlet_zero(&mut self, mesh: &Mesh) {
        for vertex in mesh.vertices().filter(|v| v.boundary) {
            self.data[vertex.id] = 0.0;
        }
    }
}

impl Index<usize> for CgField {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for CgField {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}
