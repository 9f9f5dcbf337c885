/// Uniform recharge over a polygon
pub mod poly_area_sink;
/// Uniform recharge over an infinite strip `xleft <= x <= xright`
pub mod strip_area_sink;

pub use poly_area_sink::PolyAreaSink;
pub use strip_area_sink::StripAreaSink;

use crate::aquifer::{Aquifer, AquiferLookup};
use crate::geometry::{GeometryError, Point};

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use nalgebra::DVector;
use std::fmt;
use std::sync::Arc;

/// Optional settings shared by all area elements
#[derive(Clone, Debug, Default)]
pub struct ElementOptions {
    /// Layer the recharge is applied to
    pub layer: usize,
    /// Diagnostic name; defaults to the element type
    pub name: Option<String>,
    /// Optional external identifier
    pub label: Option<String>,
}

impl ElementOptions {
    pub fn in_layer(layer: usize) -> Self {
        Self {
            layer,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// State common to every area element
///
/// The recharge rate is the element's single (known) parameter: area elements add a forcing
/// term to the global system, but no unknowns.
#[derive(Clone, Debug)]
pub struct ElementBase {
    name: String,
    label: Option<String>,
    layer: usize,
    rate: f64,
    aquifer: Option<Arc<Aquifer>>,
}

impl ElementBase {
    pub fn new(default_name: &str, rate: f64, options: ElementOptions) -> Self {
        Self {
            name: options.name.unwrap_or_else(|| default_name.to_string()),
            label: options.label,
            layer: options.layer,
            rate,
            aquifer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Infiltration rate `N`
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The parameter vector `[N]`
    pub fn parameters(&self) -> DVector<f64> {
        DVector::from_element(1, self.rate)
    }

    pub fn is_initialized(&self) -> bool {
        self.aquifer.is_some()
    }

    /// Retain `aquifer` for the rest of the element's lifetime
    ///
    /// The element's layer must exist in `aquifer`
    pub(crate) fn bind(&mut self, aquifer: Arc<Aquifer>) -> Result<(), ElementError> {
        if self.layer >= aquifer.naq() {
            return Err(ElementError::InvalidLayer {
                name: self.name.clone(),
                layer: self.layer,
                naq: aquifer.naq(),
            });
        }

        log::debug!("{} bound to {}", self.name, aquifer);
        self.aquifer = Some(aquifer);
        Ok(())
    }

    /// The aquifer found at the element's centroid during initialization
    ///
    /// Panics if the element has not been initialized
    pub fn aquifer(&self) -> &Arc<Aquifer> {
        match &self.aquifer {
            Some(aq) => aq,
            None => panic!(
                "{} has not been initialized; Cannot evaluate its influence functions!",
                self.name
            ),
        }
    }

    #[cfg(feature = "json_export")]
    fn options_json(&self) -> JsonValue {
        object! {
            "N": self.rate,
            "layer": self.layer,
            "name": self.name.clone(),
            "label": self.label.clone(),
        }
    }
}

/// Operations an area element provides to the model and its solver
///
/// Influence rows are expressed in the mode space of the aquifer they are evaluated in
/// (one entry per eigenmode, entry 0 being the Laplace mode) and are computed for a unit
/// recharge rate. Evaluation never mutates the element.
pub trait AreaSink {
    fn base(&self) -> &ElementBase;

    /// Derive all cached quantities and bind to the aquifer found at the centroid
    ///
    /// Repeated calls recompute identical state.
    fn initialize(&mut self, aquifers: &dyn AquiferLookup) -> Result<(), ElementError>;

    /// Location used to look up the element's aquifer
    fn centroid(&self) -> Point;

    /// Strict-inside test; also returns the point at which fields should be evaluated
    fn is_inside(&self, p: Point) -> (bool, Point);

    /// Potential influence of a unit recharge rate at `p`
    fn potinf(&self, p: Point, aq: &Aquifer) -> DVector<f64>;

    /// Discharge-vector influence (`[x, y]`) of a unit recharge rate at `p`
    fn disvecinf(&self, p: Point, aq: &Aquifer) -> [DVector<f64>; 2];

    #[cfg(feature = "json_export")]
    fn to_json(&self) -> JsonValue;

    fn nparam(&self) -> usize {
        1
    }

    fn nunknowns(&self) -> usize {
        0
    }

    fn parameters(&self) -> DVector<f64> {
        self.base().parameters()
    }

    /// Modal potential contributed at `p` by the element's actual recharge rate
    fn potential(&self, p: Point, aq: &Aquifer) -> DVector<f64> {
        self.potinf(p, aq) * self.base().rate()
    }

    /// Modal discharge vector contributed at `p` by the element's actual recharge rate
    fn discharge(&self, p: Point, aq: &Aquifer) -> [DVector<f64>; 2] {
        let rate = self.base().rate();
        let [qx, qy] = self.disvecinf(p, aq);
        [qx * rate, qy * rate]
    }
}

/// Any of the area elements
#[derive(Clone, Debug)]
pub enum Element {
    Polygon(PolyAreaSink),
    Strip(StripAreaSink),
}

impl Element {
    pub fn as_sink(&self) -> &dyn AreaSink {
        match self {
            Self::Polygon(sink) => sink,
            Self::Strip(sink) => sink,
        }
    }

    pub fn as_sink_mut(&mut self) -> &mut dyn AreaSink {
        match self {
            Self::Polygon(sink) => sink,
            Self::Strip(sink) => sink,
        }
    }

    pub fn name(&self) -> &str {
        self.as_sink().base().name()
    }
}

impl AreaSink for Element {
    fn base(&self) -> &ElementBase {
        self.as_sink().base()
    }

    fn initialize(&mut self, aquifers: &dyn AquiferLookup) -> Result<(), ElementError> {
        self.as_sink_mut().initialize(aquifers)
    }

    fn centroid(&self) -> Point {
        self.as_sink().centroid()
    }

    fn is_inside(&self, p: Point) -> (bool, Point) {
        self.as_sink().is_inside(p)
    }

    fn potinf(&self, p: Point, aq: &Aquifer) -> DVector<f64> {
        self.as_sink().potinf(p, aq)
    }

    fn disvecinf(&self, p: Point, aq: &Aquifer) -> [DVector<f64>; 2] {
        self.as_sink().disvecinf(p, aq)
    }

    #[cfg(feature = "json_export")]
    fn to_json(&self) -> JsonValue {
        self.as_sink().to_json()
    }
}

impl From<PolyAreaSink> for Element {
    fn from(sink: PolyAreaSink) -> Self {
        Self::Polygon(sink)
    }
}

impl From<StripAreaSink> for Element {
    fn from(sink: StripAreaSink) -> Self {
        Self::Strip(sink)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Polygon(sink) => write!(
                f,
                "{} with {} vertices and infiltration {}",
                sink.base().name(),
                sink.vertices().len(),
                sink.base().rate()
            ),
            Self::Strip(sink) => write!(
                f,
                "{} over [{}, {}] with infiltration {}",
                sink.base().name(),
                sink.xleft(),
                sink.xright(),
                sink.base().rate()
            ),
        }
    }
}

/// Error type for area elements that cannot be set up
#[derive(Debug, Clone, PartialEq)]
pub enum ElementError {
    Geometry(GeometryError),
    UnsupportedAquifer { name: String, aquifer: usize },
    InvalidLayer { name: String, layer: usize, naq: usize },
}

impl std::error::Error for ElementError {}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "{}", err),
            Self::UnsupportedAquifer { name, aquifer } => write!(
                f,
                "{} requires an aquifer with a Laplace mode, but Aquifer {} is semi-confined; Cannot initialize!",
                name, aquifer
            ),
            Self::InvalidLayer { name, layer, naq } => write!(
                f,
                "{} is assigned to layer {}, but its aquifer has only {} layers; Cannot initialize!",
                name, layer, naq
            ),
        }
    }
}

impl From<GeometryError> for ElementError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}
