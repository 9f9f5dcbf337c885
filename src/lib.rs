/*!
Analytic-element influence functions for uniformly distributed recharge.

Two area elements are provided:
* [`PolyAreaSink`]: infiltration over an arbitrary (possibly concave) polygon
* [`StripAreaSink`]: infiltration over an infinite strip in a multi-layer aquifer

Each element reports, per unit recharge rate, its potential and discharge influence in the mode
space of an [`Aquifer`]. A [`Model`] binds elements to aquifers and superposes their contributions.

```no_run
use aem_recharge::{Model, Point};

let mut model = Model::from_file("./test_input/model_a.json").unwrap();
model.initialize().unwrap();

let head = model.head(Point::new(0.5, 0.5)).unwrap();
println!("{}", head);
```
*/

/// Layered aquifer descriptors and the lookup of the aquifer at a location
pub mod aquifer;
/// Area elements: shared record, evaluation trait and the two recharge kernels
pub mod element;
/// Plane geometry used by the area elements
pub mod geometry;
/// Element registration, initialization and superposition
pub mod model;

pub use aquifer::{Aquifer, AquiferLookup, AquiferSet};
pub use element::{AreaSink, Element, ElementOptions, PolyAreaSink, StripAreaSink};
pub use geometry::{Point, Polygon};
pub use model::{Model, ModelError};
