use super::space::Point;
use std::fmt;

/// `Elem`s are the basic geometric unit of the `Mesh`
///
/// `Elem`s keep track of:
/// * Their four `Vertex` IDs
/// * The IDs of the neighboring `Elem`s across each edge (`None` on the domain boundary)
/// * Their size in each direction (used by the DG operators, which treat each `Elem` as a `hx × hy` rectangle)
/// * The length of each edge (the distance between its two `Vertex`s, identical for both `Elem`s sharing it)
///
/// ## Layout
/// The indices of `Vertex`s and edges from the perspective of an `Elem` are described as follows:
///
/// ```text
///               N
///         2 --------- 3
///         |     1     |
///         |           |
///      W  |2         3|  E
///         |           |
///         |     0     |
///         0 --------- 1
///               S
/// ```
///
/// Local coordinates `(s, t)` run from `-1/2` to `1/2` from West to East and South to North respectively.
#[derive(Debug, Clone)]
pub struct Elem {
    pub id: usize,
    pub vertices: [usize; 4],
    pub neighbors: [Option<usize>; 4],
    pub hx: f64,
    pub hy: f64,
    pub edge_lengths: [f64; 4],
    pub center: Point,
}

impl Elem {
    pub fn new(
        id: usize,
        vertices: [usize; 4],
        neighbors: [Option<usize>; 4],
        edge_lengths: [f64; 4],
        center: Point,
    ) -> Self {
        let [s, n, w, e] = edge_lengths;

        Self {
            id,
            vertices,
            neighbors,
            hx: (s + n) / 2.0,
            hy: (w + e) / 2.0,
            edge_lengths,
            center,
        }
    }

    pub fn area(&self) -> f64 {
        self.hx * self.hy
    }

    /// Length of the edge at `edge`
    pub fn edge_length(&self, edge: ElemEdge) -> f64 {
        self.edge_lengths[edge.index()]
    }
}

impl fmt::Display for Elem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Elem {} at {} [hx: {:.3}, hy: {:.3}]",
            self.id, self.center, self.hx, self.hy
        )
    }
}

/// The four edges of an [Elem] (numbered as in the layout above)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElemEdge {
    S,
    N,
    W,
    E,
}

impl ElemEdge {
    pub const ALL: [Self; 4] = [Self::S, Self::N, Self::W, Self::E];

    pub const fn index(self) -> usize {
        match self {
            Self::S => 0,
            Self::N => 1,
            Self::W => 2,
            Self::E => 3,
        }
    }

    /// The same edge as seen from the neighboring `Elem`
    pub const fn opposite(self) -> Self {
        match self {
            Self::S => Self::N,
            Self::N => Self::S,
            Self::W => Self::E,
            Self::E => Self::W,
        }
    }

    /// Outward unit normal (of the rectangle approximation)
    pub const fn normal(self) -> [f64; 2] {
        match self {
            Self::S => [0.0, -1.0],
            Self::N => [0.0, 1.0],
            Self::W => [-1.0, 0.0],
            Self::E => [1.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_edges_have_opposite_normals() {
        for edge in ElemEdge::ALL {
            let [nx, ny] = edge.normal();
            let [ox, oy] = edge.opposite().normal();
            assert_eq!(nx, -ox);
            assert_eq!(ny, -oy);
            assert_eq!(edge.opposite().opposite(), edge);
        }
    }

    #[test]
    fn sizes_from_edge_lengths() {
        let elem = Elem::new(0, [0, 1, 2, 3], [None; 4], [1.0, 1.2, 0.5, 0.7], Point::default());
        assert!((elem.hx - 1.1).abs() < 1e-14);
        assert!((elem.hy - 0.6).abs() < 1e-14);
        assert_eq!(elem.edge_length(ElemEdge::N), 1.2);
        assert_eq!(elem.edge_length(ElemEdge::W), 0.5);
    }
}
