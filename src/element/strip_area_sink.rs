use super::{AreaSink, ElementBase, ElementError, ElementOptions};
use crate::aquifer::{Aquifer, AquiferLookup};
use crate::geometry::{GeometryError, Point};

#[cfg(feature = "json_export")]
use json::JsonValue;
use nalgebra::DVector;

/// Uniform infiltration `N` over the strip `xleft <= x <= xright`, unbounded in `y`
///
/// The multi-layer solution decomposes into the Laplace mode, which is a parabola inside the
/// strip continued linearly outside, and one decaying exponential pair per leaky mode.
/// The element only contributes to the aquifer it was bound to.
#[derive(Clone, Debug)]
pub struct StripAreaSink {
    base: ElementBase,
    xleft: f64,
    xright: f64,
    modes: Option<StripModes>,
}

/// Strip constants derived at initialization, one entry per leaky mode
#[derive(Clone, Debug)]
struct StripModes {
    xc: f64,
    l: f64,
    lab: DVector<f64>,
    // coefficient of the interior exponentials
    a: DVector<f64>,
    // coefficient of the exterior exponential
    b: DVector<f64>,
    // particular solution inside the strip
    plabsq: DVector<f64>,
}

impl StripAreaSink {
    pub fn new(
        xleft: f64,
        xright: f64,
        rate: f64,
        options: ElementOptions,
    ) -> Result<Self, ElementError> {
        if !(xleft < xright) {
            return Err(GeometryError::EmptyStrip { xleft, xright }.into());
        }

        Ok(Self {
            base: ElementBase::new("StripAreaSink", rate, options),
            xleft,
            xright,
            modes: None,
        })
    }

    pub fn xleft(&self) -> f64 {
        self.xleft
    }

    pub fn xright(&self) -> f64 {
        self.xright
    }

    /// Strip width
    pub fn width(&self) -> f64 {
        self.xright - self.xleft
    }

    fn modes(&self) -> &StripModes {
        match &self.modes {
            Some(modes) => modes,
            None => panic!(
                "{} has not been initialized; Cannot evaluate its influence functions!",
                self.base.name()
            ),
        }
    }

    // the bound aquifer is the only one that sees this element
    fn is_bound_to(&self, aq: &Aquifer) -> bool {
        self.base.aquifer().id() == aq.id()
    }
}

impl AreaSink for StripAreaSink {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn initialize(&mut self, aquifers: &dyn AquiferLookup) -> Result<(), ElementError> {
        let aquifer = aquifers.find_aquifer_data(self.centroid());

        if !aquifer.ilap() {
            return Err(ElementError::UnsupportedAquifer {
                name: self.base.name().to_string(),
                aquifer: aquifer.id(),
            });
        }

        self.base.bind(aquifer.clone())?;

        let l = self.width();
        let nmodes = aquifer.naq() - 1;
        let coef = aquifer.coef().row(self.base.layer());
        let lab = aquifer.lab().clone();

        let plabsq = DVector::from_fn(nmodes, |k, _| coef[k + 1] * lab[k] * lab[k]);
        let a = -&plabsq / 2.0;
        let b = DVector::from_fn(nmodes, |k, _| a[k] * ((-l / lab[k]).exp() - 1.0));

        self.modes = Some(StripModes {
            xc: 0.5 * (self.xleft + self.xright),
            l,
            lab,
            a,
            b,
            plabsq,
        });

        Ok(())
    }

    fn centroid(&self) -> Point {
        Point::new(0.5 * (self.xleft + self.xright), 0.0)
    }

    fn is_inside(&self, p: Point) -> (bool, Point) {
        (self.xleft <= p.x && p.x <= self.xright, p)
    }

    fn potinf(&self, p: Point, aq: &Aquifer) -> DVector<f64> {
        let m = self.modes();
        let mut rv = DVector::zeros(aq.naq());
        if !self.is_bound_to(aq) {
            return rv;
        }

        let x = p.x;
        let (xl, xr, xc) = (self.xleft, self.xright, m.xc);

        if x < xl {
            rv[0] = -(xl - xc) * (x - xc) + m.l * m.l / 8.0;
            for k in 0..m.lab.len() {
                rv[k + 1] = m.b[k] * ((x - xl) / m.lab[k]).exp();
            }
        } else if x > xr {
            rv[0] = -(xr - xc) * (x - xc) + m.l * m.l / 8.0;
            for k in 0..m.lab.len() {
                rv[k + 1] = m.b[k] * (-(x - xr) / m.lab[k]).exp();
            }
        } else {
            rv[0] = -0.5 * (x - xc) * (x - xc);
            for k in 0..m.lab.len() {
                rv[k + 1] = m.a[k]
                    * ((-(x - xl) / m.lab[k]).exp() + ((x - xr) / m.lab[k]).exp())
                    + m.plabsq[k];
            }
        }

        rv
    }

    fn disvecinf(&self, p: Point, aq: &Aquifer) -> [DVector<f64>; 2] {
        let m = self.modes();
        let mut qx = DVector::zeros(aq.naq());
        let qy = DVector::zeros(aq.naq());
        if !self.is_bound_to(aq) {
            return [qx, qy];
        }

        let x = p.x;
        let (xl, xr, xc) = (self.xleft, self.xright, m.xc);

        if x < xl {
            qx[0] = xl - xc;
            for k in 0..m.lab.len() {
                qx[k + 1] = -m.b[k] / m.lab[k] * ((x - xl) / m.lab[k]).exp();
            }
        } else if x > xr {
            qx[0] = xr - xc;
            for k in 0..m.lab.len() {
                qx[k + 1] = m.b[k] / m.lab[k] * (-(x - xr) / m.lab[k]).exp();
            }
        } else {
            qx[0] = x - xc;
            for k in 0..m.lab.len() {
                qx[k + 1] = m.a[k] / m.lab[k]
                    * ((-(x - xl) / m.lab[k]).exp() - ((x - xr) / m.lab[k]).exp());
            }
        }

        [qx, qy]
    }

    #[cfg(feature = "json_export")]
    fn to_json(&self) -> JsonValue {
        let mut sink_json = self.base.options_json();
        sink_json["type"] = "StripAreaSink".into();
        sink_json["xleft"] = self.xleft.into();
        sink_json["xright"] = self.xright.into();
        sink_json
    }
}
