use super::{AreaSink, ElementBase, ElementError, ElementOptions};
use crate::aquifer::{Aquifer, AquiferLookup};
use crate::geometry::{polygon::EdgeTerms, Point, Polygon};

#[cfg(feature = "json_export")]
use json::JsonValue;
use nalgebra::DVector;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Uniform infiltration `N` over a polygon
///
/// The potential of a unit rate is the logarithmic area potential of the polygon,
/// `Φ(z) = -1/(2π) ∬ ln|z - ζ| dA(ζ)`, so that `∇²Φ = -1` inside and `Φ` is harmonic outside.
/// Both `Φ` and its gradient are continuous everywhere, and far from the polygon it behaves
/// like a well injecting `N * area`.
///
/// Only the Laplace mode (entry 0 of an influence row) receives a contribution; the rows of the
/// leaky modes are zero.
#[derive(Clone, Debug)]
pub struct PolyAreaSink {
    base: ElementBase,
    xy: Vec<Point>,
    polygon: Option<Polygon>,
}

impl PolyAreaSink {
    pub fn new(xy: Vec<Point>, rate: f64, options: ElementOptions) -> Result<Self, ElementError> {
        Polygon::validate(&xy)?;

        Ok(Self {
            base: ElementBase::new("PolyAreaSink", rate, options),
            xy,
            polygon: None,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.xy
    }

    /// Panics if the element has not been initialized
    pub fn polygon(&self) -> &Polygon {
        match &self.polygon {
            Some(polygon) => polygon,
            None => panic!(
                "{} has not been initialized; Cannot access its Polygon!",
                self.base.name()
            ),
        }
    }

    // unit-rate potential of the Laplace mode
    //
    // Each edge contributes L² Y [2 ln(L/2) + (X+1) ln|Z+1| - (X-1) ln|Z-1| + Y η - 3], where
    // Z = X + iY is the edge-local coordinate and η the angle the edge subtends.
    fn laplace_potential(polygon: &Polygon, terms: &EdgeTerms) -> f64 {
        let sum: f64 = terms
            .iter()
            .zip(polygon.lengths().iter())
            .map(|(t, &len)| {
                let (x, y) = (t.big_z.re, t.big_z.im);
                let bracket = 2.0 * (len / 2.0).ln() + (x + 1.0) * (t.big_z + 1.0).norm().ln()
                    - (x - 1.0) * (t.big_z - 1.0).norm().ln()
                    + y * t.ln_ratio.im
                    - 3.0;
                len * len * y * bracket
            })
            .sum();

        -polygon.orientation() * sum / (16.0 * PI)
    }

    // unit-rate complex discharge `Qx - iQy` of the Laplace mode
    //
    // The edge sum is analytic apart from a jump across every edge (the log's branch cut); the
    // interior term cancels that jump, which is why it must follow the same branch convention
    // as the membership test.
    fn laplace_discharge(polygon: &Polygon, p: Point, inside: bool, terms: &EdgeTerms) -> Complex64 {
        let zc = polygon.centroid().as_complex();

        let sum: Complex64 = terms
            .iter()
            .zip(polygon.z1().iter().zip(polygon.z2().iter()))
            .map(|(t, (&z1, &z2))| {
                let half = (z2 - z1) / 2.0;
                let mid = (z1 + z2) / 2.0 - zc;
                (half.conj() * t.big_z + mid.conj()) * t.ln_ratio
            })
            .sum();

        let edges = Complex64::i() * polygon.orientation() / (4.0 * PI) * sum;

        if inside {
            edges + (p.as_complex() - zc).conj() / 2.0
        } else {
            edges
        }
    }
}

impl AreaSink for PolyAreaSink {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn initialize(&mut self, aquifers: &dyn AquiferLookup) -> Result<(), ElementError> {
        let polygon = Polygon::new(&self.xy)?;
        let aquifer = aquifers.find_aquifer_data(polygon.centroid());

        if !aquifer.ilap() {
            log::warn!(
                "{} is bound to semi-confined {}; its recharge only enters the first mode",
                self.base.name(),
                aquifer
            );
        }

        self.base.bind(aquifer)?;
        self.polygon = Some(polygon);

        Ok(())
    }

    fn centroid(&self) -> Point {
        self.polygon().centroid()
    }

    fn is_inside(&self, p: Point) -> (bool, Point) {
        self.polygon().is_inside(p)
    }

    fn potinf(&self, p: Point, aq: &Aquifer) -> DVector<f64> {
        let polygon = self.polygon();
        let (_, _, terms) = polygon.classify(p);

        let mut rv = DVector::zeros(aq.naq());
        rv[0] = Self::laplace_potential(polygon, &terms);
        rv
    }

    fn disvecinf(&self, p: Point, aq: &Aquifer) -> [DVector<f64>; 2] {
        let polygon = self.polygon();
        let (inside, p, terms) = polygon.classify(p);
        let w = Self::laplace_discharge(polygon, p, inside, &terms);

        let mut qx = DVector::zeros(aq.naq());
        let mut qy = DVector::zeros(aq.naq());
        qx[0] = w.re;
        qy[0] = -w.im;

        [qx, qy]
    }

    #[cfg(feature = "json_export")]
    fn to_json(&self) -> JsonValue {
        let mut sink_json = self.base.options_json();
        sink_json["type"] = "PolyAreaSink".into();
        sink_json["xy"] = JsonValue::from(self.xy.iter().map(|v| v.to_json()).collect::<Vec<_>>());
        sink_json
    }
}
