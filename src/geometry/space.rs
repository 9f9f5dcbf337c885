#[cfg(feature = "json_export")]
use json::{array, JsonValue};
use num_complex::Complex64;
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
/// Point in the horizontal plane of the aquifer
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn from_array([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }

    pub fn from_complex(z: Complex64) -> Self {
        Self::new(z.re, z.im)
    }

    pub fn dist(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;

        dx.hypot(dy)
    }

    /// This point as `x + iy`
    pub fn as_complex(&self) -> Complex64 {
        Complex64::new(self.x, self.y)
    }

    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        array![self.x, self.y]
    }
}

impl From<Complex64> for Point {
    fn from(z: Complex64) -> Self {
        Self::from_complex(z)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {:.6}, y: {:.6})", self.x, self.y)
    }
}

/// Axis aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Smallest box containing all `points`, grown by `margin` on every side
    ///
    /// `points` must not be empty
    pub fn around(points: &[Point], margin: f64) -> Self {
        let (mut min, mut max) = (points[0], points[0]);
        for p in points.iter().skip(1) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Self {
            min: Point::new(min.x - margin, min.y - margin),
            max: Point::new(max.x + margin, max.y + margin),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_margin() {
        let bb = BoundingBox::around(
            &[Point::new(0.0, 1.0), Point::new(2.0, -1.0), Point::new(1.0, 3.0)],
            0.5,
        );
        assert_eq!(bb.min, Point::new(-0.5, -1.5));
        assert_eq!(bb.max, Point::new(2.5, 3.5));

        assert!(bb.contains(Point::new(2.4, 3.4)));
        assert!(!bb.contains(Point::new(2.6, 0.0)));
    }

    #[test]
    fn complex_round_trip() {
        let p = Point::new(1.5, -2.0);
        assert_eq!(Point::from_complex(p.as_complex()), p);
        let converted: Point = p.as_complex().into();
        assert_eq!(converted, p);
        assert_eq!(Point::from_array([1.5, -2.0]), p);
        assert_eq!(p.dist(&Point::new(4.5, 2.0)), 5.0);
    }
}
