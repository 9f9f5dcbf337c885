use super::space::{BoundingBox, Point};
use super::{big_z, edge_log_ratio, TINY};

use num_complex::Complex64;
use smallvec::SmallVec;
use std::f64::consts::PI;
use std::fmt;

/// Edges shorter than this are considered collapsed
pub const MIN_EDGE_LENGTH: f64 = 1e-12;

/// The expected number of edges in a polygon. Determines the stack allocation size of the per-edge caches
pub const EXPECTED_NUM_EDGES: usize = 8;

/// Per-edge quantities for one query point
#[derive(Clone, Copy, Debug)]
pub struct EdgeTerm {
    /// Local coordinate of the query point (the edge maps onto `[-1, 1]`)
    pub big_z: Complex64,
    /// `log((Z - 1) / (Z + 1))`; the imaginary part is the angle the edge subtends
    pub ln_ratio: Complex64,
}

pub type EdgeTerms = SmallVec<[EdgeTerm; EXPECTED_NUM_EDGES]>;

/// A closed polygon in the horizontal plane
///
/// The last vertex connects back to the first. Either orientation is accepted; the
/// orientation is recorded in the sign of the signed area.
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<Point>,
    z1: SmallVec<[Complex64; EXPECTED_NUM_EDGES]>,
    z2: SmallVec<[Complex64; EXPECTED_NUM_EDGES]>,
    lengths: SmallVec<[f64; EXPECTED_NUM_EDGES]>,
    centroid: Point,
    bbox: BoundingBox,
    signed_area: f64,
}

impl Polygon {
    /// Build a polygon and cache its edge geometry
    pub fn new(vertices: &[Point]) -> Result<Self, GeometryError> {
        Self::validate(vertices)?;

        let n = vertices.len();
        let z1: SmallVec<[Complex64; EXPECTED_NUM_EDGES]> =
            vertices.iter().map(|v| v.as_complex()).collect();
        let z2: SmallVec<[Complex64; EXPECTED_NUM_EDGES]> =
            (0..n).map(|i| z1[(i + 1) % n]).collect();
        let lengths = z1.iter().zip(z2.iter()).map(|(a, b)| (b - a).norm()).collect();

        let centroid = Point::new(
            vertices.iter().map(|v| v.x).sum::<f64>() / n as f64,
            vertices.iter().map(|v| v.y).sum::<f64>() / n as f64,
        );

        Ok(Self {
            vertices: vertices.to_vec(),
            z1,
            z2,
            lengths,
            centroid,
            bbox: BoundingBox::around(vertices, 2.0 * TINY),
            signed_area: shoelace(vertices),
        })
    }

    /// Check that a list of vertices describes a usable polygon without building it
    pub fn validate(vertices: &[Point]) -> Result<(), GeometryError> {
        let n = vertices.len();
        if n < 3 {
            return Err(GeometryError::TooFewVertices(n));
        }

        for i in 0..n {
            if vertices[i].dist(&vertices[(i + 1) % n]) < MIN_EDGE_LENGTH {
                return Err(GeometryError::ZeroLengthEdge(i));
            }
        }

        let num_distinct = vertices
            .iter()
            .enumerate()
            .filter(|(i, v)| vertices[..*i].iter().all(|prev| prev.dist(v) >= MIN_EDGE_LENGTH))
            .count();
        if num_distinct < 3 {
            return Err(GeometryError::TooFewVertices(num_distinct));
        }

        let extent = BoundingBox::around(vertices, 0.0);
        let scale = (extent.max.x - extent.min.x).max(extent.max.y - extent.min.y);
        if shoelace(vertices).abs() <= f64::EPSILON * scale * scale {
            return Err(GeometryError::ZeroArea);
        }

        Ok(())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn num_edges(&self) -> usize {
        self.vertices.len()
    }

    /// Start points of the edges
    pub fn z1(&self) -> &[Complex64] {
        &self.z1
    }

    /// End points of the edges
    pub fn z2(&self) -> &[Complex64] {
        &self.z2
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Arithmetic mean of the vertices
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Bounding box grown by `2 * TINY`
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Shoelace area; positive for counter-clockwise vertex order
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    /// `1.0` for counter-clockwise polygons, `-1.0` for clockwise ones
    pub fn orientation(&self) -> f64 {
        self.signed_area.signum()
    }

    /// Move a point that sits on a vertex a small, fixed distance along the vertex's outgoing edge
    ///
    /// Points further than `TINY` (relative to the edge length) from every vertex are returned unchanged.
    pub fn nudge(&self, p: Point) -> Point {
        let z = p.as_complex();
        for i in 0..self.num_edges() {
            if (z - self.z1[i]).norm() / self.lengths[i] < TINY {
                let moved = Point::from_complex(z + TINY * (self.z2[i] - self.z1[i]));
                log::trace!("query point {} is on vertex {}; moved to {}", p, i, moved);
                return moved;
            }
        }
        p
    }

    /// Edge-local coordinates and log ratios of a query point for every edge
    ///
    /// Points exactly on an edge see that edge from the polygon's interior.
    pub fn edge_terms(&self, p: Point) -> EdgeTerms {
        let z = p.as_complex();
        let orientation = self.orientation();
        self.z1
            .iter()
            .zip(self.z2.iter())
            .map(|(&z1, &z2)| {
                let big_z = big_z(z, z1, z2);
                EdgeTerm {
                    big_z,
                    ln_ratio: edge_log_ratio(big_z, orientation),
                }
            })
            .collect()
    }

    /// Total angle subtended by the polygon's edges: `±2π` inside, `0` outside
    pub fn winding_angle(terms: &[EdgeTerm]) -> f64 {
        terms.iter().map(|t| t.ln_ratio.im).sum()
    }

    /// Determine whether `p` is strictly inside the polygon
    ///
    /// Returns the classification along with the point that should be used for field
    /// evaluation (`p` itself, or `p` moved off a vertex).
    pub fn is_inside(&self, p: Point) -> (bool, Point) {
        if !self.bbox.contains(p) {
            return (false, p);
        }

        let p = self.nudge(p);
        let angle = Self::winding_angle(&self.edge_terms(p));

        (angle.abs() > PI, p)
    }

    /// Same as `is_inside`, but also returns the edge terms at the (possibly moved) point
    ///
    /// The classification is derived from the returned terms whenever the point is inside the bounding box.
    pub fn classify(&self, p: Point) -> (bool, Point, EdgeTerms) {
        if !self.bbox.contains(p) {
            return (false, p, self.edge_terms(p));
        }

        let p = self.nudge(p);
        let terms = self.edge_terms(p);

        (Self::winding_angle(&terms).abs() > PI, p, terms)
    }
}

fn shoelace(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    0.5 * (0..n)
        .map(|i| {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
}

/// Error type for degenerate area-element geometry
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    TooFewVertices(usize),
    ZeroLengthEdge(usize),
    ZeroArea,
    EmptyStrip { xleft: f64, xright: f64 },
}

impl std::error::Error for GeometryError {}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooFewVertices(n) => write!(
                f,
                "Polygon has {} distinct vertices (at least 3 are required); Cannot construct Polygon!",
                n
            ),
            Self::ZeroLengthEdge(edge_idx) => write!(
                f,
                "Edge {} of Polygon has zero length; Cannot construct Polygon!",
                edge_idx
            ),
            Self::ZeroArea => write!(f, "Polygon vertices are collinear; Cannot construct Polygon!"),
            Self::EmptyStrip { xleft, xright } => write!(
                f,
                "Strip bounds must satisfy xleft < xright (got {} and {}); Cannot construct Strip!",
                xleft, xright
            ),
        }
    }
}
