/// Points and bounding boxes in the horizontal plane
pub mod space;
/// Closed polygons with a winding-number membership test
pub mod polygon;

pub use polygon::{EdgeTerm, GeometryError, Polygon};
pub use space::{BoundingBox, Point};

use num_complex::Complex64;

/// Relative tolerance used to push query points off polygon vertices
pub const TINY: f64 = 1e-6;

/// Map `z` into the local coordinate of the segment `z1 -> z2`
///
/// The segment lands on `[-1, 1]` of the real axis; points to the left of the
/// segment (looking from `z1` to `z2`) have a positive imaginary part.
#[inline]
pub fn big_z(z: Complex64, z1: Complex64, z2: Complex64) -> Complex64 {
    (2.0 * z - (z1 + z2)) / (z2 - z1)
}

/// Principal logarithm with the imaginary part in `[-π, π]`
///
/// A zero imaginary part of either sign is replaced by a zero carrying the sign of `side`,
/// so a value on the negative real axis maps to `+π` for `side > 0` and to `-π` otherwise.
#[inline]
pub fn principal_ln(w: Complex64, side: f64) -> Complex64 {
    if w.im == 0.0 {
        Complex64::new(w.re, 0.0_f64.copysign(side)).ln()
    } else {
        w.ln()
    }
}

/// `log((Z - 1) / (Z + 1))` for a local edge coordinate `Z`
///
/// The imaginary part is the angle subtended by the edge as seen from the query point.
/// The branch cut lies on the edge itself; a point exactly on the edge takes the limit from
/// the side `orientation` points to (the left of the edge for `+1`, the right for `-1`).
/// For a polygon's edges this is always the interior, whatever the vertex order.
#[inline]
pub fn edge_log_ratio(big_z: Complex64, orientation: f64) -> Complex64 {
    principal_ln((big_z - 1.0) / (big_z + 1.0), orientation)
}
