use super::space::Point;
use smallvec::SmallVec;

/// A point in 2D space shared by up to four `Elem`s.
/// CG quantities (velocity, forcing) are stored on `Vertex`s.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: usize,
    pub coords: Point,
    pub boundary: bool,
    elems: SmallVec<[usize; 4]>,
}

impl Vertex {
    pub fn new(id: usize, coords: Point, boundary: bool) -> Self {
        Self {
            id,
            coords,
            boundary,
            elems: SmallVec::new(),
        }
    }

    pub fn connect_elem(&mut self, elem_id: usize) {
        assert!(
            self.elems.len() < 4,
            "Vertex {} is already shared by four Elems; cannot connect Elem {}!",
            self.id,
            elem_id
        );
        self.elems.push(elem_id);
    }

    /// IDs of the `Elem`s sharing this `Vertex`
    pub fn elems(&self) -> &[usize] {
        &self.elems
    }
}
