use crate::aquifer::{Aquifer, AquiferError, AquiferLookup, AquiferSet};
use crate::element::{AreaSink, Element, ElementError, ElementOptions, PolyAreaSink, StripAreaSink};
use crate::geometry::{GeometryError, Point, Polygon};

#[cfg(feature = "json_export")]
use json::object;
use json::JsonValue;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::read_to_string;
use std::sync::Arc;

#[cfg(feature = "json_export")]
use std::fs::File;
#[cfg(feature = "json_export")]
use std::io::BufWriter;

/// A set of aquifers and the area elements placed in them
///
/// Elements are identified by the order in which they were added. After `initialize`, every
/// element is bound to the aquifer at its centroid and the model can superpose their
/// contributions at arbitrary points.
#[derive(Debug, Clone)]
pub struct Model {
    aquifers: AquiferSet,
    elements: Vec<Element>,
    aquifer_elements: BTreeMap<usize, Vec<usize>>,
    initialized: bool,
}

impl Model {
    pub fn new(aquifers: AquiferSet) -> Self {
        Self {
            aquifers,
            elements: Vec::new(),
            aquifer_elements: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Load a model from a JSON file
    ///
    /// The file has the following structure (the `region`, `T`, `layer`, `name` and `label` fields are optional):
    /// ``` JSON
    /// {
    ///     "Aquifers": [
    ///         {
    ///             "naq": 2,
    ///             "lab": [2.0],
    ///             "eigvec": [[0.5, 1.0], [0.5, -1.0]],
    ///             "coef": [[1.0, 0.5], [1.0, -0.5]],
    ///             "ilap": true,
    ///             "T": [5.0, 5.0]
    ///         },
    ///         {
    ///             "naq": 1, "lab": [], "eigvec": [[1.0]], "coef": [[1.0]], "ilap": true,
    ///             "region": [[45.0, -5.0], [55.0, -5.0], [55.0, 5.0], [45.0, 5.0]]
    ///         }
    ///     ],
    ///     "Elements": [
    ///         {
    ///             "type": "PolyAreaSink",
    ///             "xy": [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
    ///             "N": 0.001,
    ///             "name": "square"
    ///         },
    ///         {
    ///             "type": "StripAreaSink",
    ///             "xleft": -1.0,
    ///             "xright": 1.0,
    ///             "N": 0.002,
    ///             "layer": 1
    ///         }
    ///     ]
    /// }
    /// ```
    ///
    /// Exactly one aquifer must be without a region; aquifer ids are their positions in the list.
    pub fn from_file(path: impl AsRef<str>) -> Result<Self, ModelError> {
        let model_file_contents = read_to_string(path.as_ref())?;
        let model_file_json = json::parse(&model_file_contents)?;

        let model = Self::from_json(&model_file_json)?;
        log::debug!(
            "loaded {} elements and {} aquifers from {}",
            model.elements.len(),
            model.aquifers.len(),
            path.as_ref()
        );

        Ok(model)
    }

    pub fn from_json(model_json: &JsonValue) -> Result<Self, ModelError> {
        let mut model = Self::new(parse_aquifers(model_json)?);
        for element in parse_elements(model_json)? {
            model.add_element(element);
        }
        Ok(model)
    }

    /// Register an element and return its id
    ///
    /// The model has to be (re)initialized before it can be evaluated again.
    pub fn add_element(&mut self, element: impl Into<Element>) -> usize {
        self.elements.push(element.into());
        self.initialized = false;
        self.elements.len() - 1
    }

    /// Initialize every element and record which aquifer each one is bound to
    ///
    /// Stops at the first element that cannot be initialized; the model then stays uninitialized.
    pub fn initialize(&mut self) -> Result<(), ModelError> {
        self.initialized = false;
        self.aquifer_elements.clear();

        for (id, element) in self.elements.iter_mut().enumerate() {
            element
                .initialize(&self.aquifers)
                .map_err(|source| ModelError::ElementFailed { id, source })?;
        }

        for (id, element) in self.elements.iter().enumerate() {
            self.aquifer_elements
                .entry(element.base().aquifer().id())
                .or_default()
                .push(id);
        }

        self.initialized = true;
        log::info!(
            "initialized {} elements over {} aquifers",
            self.elements.len(),
            self.aquifers.len()
        );

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn aquifers(&self) -> &AquiferSet {
        &self.aquifers
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: usize) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Ids of the elements bound to an aquifer during the last initialization
    pub fn aquifer_elements(&self, aquifer_id: usize) -> &[usize] {
        self.aquifer_elements
            .get(&aquifer_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    fn initialized_element(&self, id: usize) -> Result<&Element, ModelError> {
        if !self.initialized {
            return Err(ModelError::NotInitialized);
        }
        self.elements.get(id).ok_or(ModelError::UnknownElement(id))
    }

    /// Unit-rate potential influence of element `id` at `p`
    ///
    /// The aquifer at `p` is used when `aq` is `None`
    pub fn potinf(
        &self,
        id: usize,
        p: Point,
        aq: Option<&Aquifer>,
    ) -> Result<DVector<f64>, ModelError> {
        let element = self.initialized_element(id)?;
        Ok(match aq {
            Some(aq) => element.potinf(p, aq),
            None => element.potinf(p, &self.aquifers.find_aquifer_data(p)),
        })
    }

    /// Unit-rate discharge influence of element `id` at `p`
    ///
    /// The aquifer at `p` is used when `aq` is `None`
    pub fn disvecinf(
        &self,
        id: usize,
        p: Point,
        aq: Option<&Aquifer>,
    ) -> Result<[DVector<f64>; 2], ModelError> {
        let element = self.initialized_element(id)?;
        Ok(match aq {
            Some(aq) => element.disvecinf(p, aq),
            None => element.disvecinf(p, &self.aquifers.find_aquifer_data(p)),
        })
    }

    fn modal_potential(&self, p: Point, aq: &Aquifer) -> DVector<f64> {
        self.elements
            .iter()
            .fold(DVector::zeros(aq.naq()), |acc, element| acc + element.potential(p, aq))
    }

    /// Layer potentials at `p` from all elements
    pub fn potential(&self, p: Point) -> Result<DVector<f64>, ModelError> {
        if !self.initialized {
            return Err(ModelError::NotInitialized);
        }
        let aq = self.aquifers.find_aquifer_data(p);
        Ok(aq.to_layers(&self.modal_potential(p, &aq)))
    }

    /// Layer discharge vectors (`[x, y]`) at `p` from all elements
    pub fn discharge(&self, p: Point) -> Result<[DVector<f64>; 2], ModelError> {
        if !self.initialized {
            return Err(ModelError::NotInitialized);
        }
        let aq = self.aquifers.find_aquifer_data(p);

        let [qx, qy] = self.elements.iter().fold(
            [DVector::zeros(aq.naq()), DVector::zeros(aq.naq())],
            |[qx, qy], element| {
                let [ex, ey] = element.discharge(p, &aq);
                [qx + ex, qy + ey]
            },
        );

        Ok([aq.to_layers(&qx), aq.to_layers(&qy)])
    }

    /// Layer heads at `p`: potentials divided by the layer transmissivities
    pub fn head(&self, p: Point) -> Result<DVector<f64>, ModelError> {
        let potential = self.potential(p)?;
        let aq = self.aquifers.find_aquifer_data(p);
        Ok(potential.component_div(aq.transmissivity()))
    }

    /// `potential` at many points, evaluated in parallel
    pub fn potential_many(&self, points: &[Point]) -> Result<Vec<DVector<f64>>, ModelError> {
        points.par_iter().map(|&p| self.potential(p)).collect()
    }

    /// `discharge` at many points, evaluated in parallel
    pub fn discharge_many(&self, points: &[Point]) -> Result<Vec<[DVector<f64>; 2]>, ModelError> {
        points.par_iter().map(|&p| self.discharge(p)).collect()
    }

    /// `head` at many points, evaluated in parallel
    pub fn head_many(&self, points: &[Point]) -> Result<Vec<DVector<f64>>, ModelError> {
        points.par_iter().map(|&p| self.head(p)).collect()
    }

    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        let mut aquifers: Vec<&Arc<Aquifer>> = self.aquifers.iter().collect();
        aquifers.sort_by_key(|aq| aq.id());

        object! {
            "Aquifers": JsonValue::from(aquifers.iter().map(|aq| aq.to_json()).collect::<Vec<_>>()),
            "Elements": JsonValue::from(self.elements.iter().map(|element| element.to_json()).collect::<Vec<_>>()),
        }
    }

    /// Print the model to a JSON file specified by path (in the same format `from_file` reads)
    #[cfg(feature = "json_export")]
    pub fn export_to_json(&self, path: impl AsRef<str>) -> std::io::Result<()> {
        let f = File::create(path.as_ref())?;
        let mut w = BufWriter::new(&f);

        self.to_json().write_pretty(&mut w, 4)?;

        Ok(())
    }
}

impl AquiferLookup for Model {
    fn find_aquifer_data(&self, p: Point) -> Arc<Aquifer> {
        self.aquifers.find_aquifer_data(p)
    }
}

fn parse_aquifers(model_json: &JsonValue) -> Result<AquiferSet, ModelError> {
    if !model_json["Aquifers"].is_array() {
        return Err(invalid("Aquifers must be an Array!"));
    }

    let aquifers = model_json["Aquifers"]
        .members()
        .enumerate()
        .map(|(id, aq_json)| {
            let eigvec = parse_matrix(&aq_json["eigvec"], "eigvec")?;
            let coef = parse_matrix(&aq_json["coef"], "coef")?;
            let lab = parse_numbers(&aq_json["lab"], "lab")?;

            if !aq_json["naq"].is_null() && aq_json["naq"].as_usize() != Some(eigvec.nrows()) {
                return Err(invalid(format!(
                    "Aquifer {} has a naq that does not match its eigvec!",
                    id
                )));
            }

            let ilap = if aq_json["ilap"].is_null() {
                true
            } else {
                aq_json["ilap"]
                    .as_bool()
                    .ok_or_else(|| invalid("Aquifer ilap must be a boolean!"))?
            };

            let mut aquifer = Aquifer::new(id, lab, eigvec, coef, ilap)?;
            if !aq_json["T"].is_null() {
                aquifer = aquifer.with_transmissivity(parse_numbers(&aq_json["T"], "T")?)?;
            }
            if !aq_json["region"].is_null() {
                aquifer = aquifer.with_region(Polygon::new(&parse_points(&aq_json["region"], "region")?)?);
            }

            Ok(aquifer)
        })
        .collect::<Result<Vec<Aquifer>, ModelError>>()?;

    Ok(AquiferSet::from_list(aquifers)?)
}

fn parse_elements(model_json: &JsonValue) -> Result<Vec<Element>, ModelError> {
    if !model_json["Elements"].is_array() {
        return Err(invalid("Elements must be an Array!"));
    }

    model_json["Elements"]
        .members()
        .enumerate()
        .map(|(id, element_json)| {
            let rate = element_json["N"]
                .as_f64()
                .ok_or_else(|| invalid(format!("Element {} must have a numerical N!", id)))?;

            let layer = if element_json["layer"].is_null() {
                0
            } else {
                element_json["layer"].as_usize().ok_or_else(|| {
                    invalid(format!("Element {} layer must be a positive integer!", id))
                })?
            };

            let options = ElementOptions {
                layer,
                name: element_json["name"].as_str().map(String::from),
                label: element_json["label"].as_str().map(String::from),
            };

            let element: Result<Element, ElementError> = match element_json["type"].as_str() {
                Some("PolyAreaSink") => {
                    let xy = parse_points(&element_json["xy"], "xy")?;
                    PolyAreaSink::new(xy, rate, options).map(Element::from)
                }
                Some("StripAreaSink") => {
                    let bound = |key: &str| {
                        element_json[key].as_f64().ok_or_else(|| {
                            invalid(format!("Element {} must have a numerical {}!", id, key))
                        })
                    };
                    StripAreaSink::new(bound("xleft")?, bound("xright")?, rate, options)
                        .map(Element::from)
                }
                Some(other) => {
                    return Err(invalid(format!(
                        "Element {} has an unknown type '{}'!",
                        id, other
                    )))
                }
                None => return Err(invalid(format!("Element {} must have a type!", id))),
            };

            element.map_err(|source| ModelError::ElementFailed { id, source })
        })
        .collect()
}

fn parse_numbers(numbers_json: &JsonValue, what: &str) -> Result<Vec<f64>, ModelError> {
    if !numbers_json.is_array() {
        return Err(invalid(format!("{} must be an Array!", what)));
    }

    numbers_json
        .members()
        .map(|n| {
            n.as_f64()
                .ok_or_else(|| invalid(format!("{} must contain numerical values!", what)))
        })
        .collect()
}

fn parse_matrix(matrix_json: &JsonValue, what: &str) -> Result<DMatrix<f64>, ModelError> {
    if !matrix_json.is_array() {
        return Err(invalid(format!("{} must be an Array of rows!", what)));
    }

    let rows = matrix_json
        .members()
        .map(|row| parse_numbers(row, what))
        .collect::<Result<Vec<Vec<f64>>, ModelError>>()?;

    let ncols = rows.first().map(|row| row.len()).unwrap_or(0);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(invalid(format!("{} rows must all have the same length!", what)));
    }

    Ok(DMatrix::from_row_slice(rows.len(), ncols, &rows.concat()))
}

fn parse_points(points_json: &JsonValue, what: &str) -> Result<Vec<Point>, ModelError> {
    if !points_json.is_array() {
        return Err(invalid(format!("{} must be an Array of points!", what)));
    }

    points_json
        .members()
        .map(|point_json| match parse_numbers(point_json, what)?.as_slice() {
            &[x, y] => Ok(Point::new(x, y)),
            _ => Err(invalid(format!("{} points must have a length of 2!", what))),
        })
        .collect()
}

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidFile(msg.into())
}

/// Error type for model loading, initialization and evaluation
#[derive(Debug)]
pub enum ModelError {
    Io(std::io::Error),
    Json(json::Error),
    InvalidFile(String),
    Geometry(GeometryError),
    Aquifer(AquiferError),
    ElementFailed { id: usize, source: ElementError },
    UnknownElement(usize),
    NotInitialized,
}

impl std::error::Error for ModelError {}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Unable to read Model File: {}", err),
            Self::Json(err) => write!(f, "Unable to parse Model File as JSON: {}", err),
            Self::InvalidFile(msg) => write!(f, "Invalid Model File: {}", msg),
            Self::Geometry(err) => write!(f, "{}", err),
            Self::Aquifer(err) => write!(f, "{}", err),
            Self::ElementFailed { id, source } => write!(f, "Element {}: {}", id, source),
            Self::UnknownElement(id) => write!(f, "Model has no Element {}!", id),
            Self::NotInitialized => write!(
                f,
                "Model has not been initialized; Cannot evaluate influence functions!"
            ),
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<json::Error> for ModelError {
    fn from(err: json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<GeometryError> for ModelError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<AquiferError> for ModelError {
    fn from(err: AquiferError) -> Self {
        Self::Aquifer(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_layer_model() -> Model {
        let aquifers = AquiferSet::new(
            Aquifer::single_layer(0, 1.0)
                .with_transmissivity(vec![10.0])
                .unwrap(),
        )
        .unwrap();
        let mut model = Model::new(aquifers);

        let square = vec![
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ];
        model.add_element(PolyAreaSink::new(square, 2.0, ElementOptions::default()).unwrap());
        model.add_element(StripAreaSink::new(4.0, 6.0, 0.5, ElementOptions::default()).unwrap());
        model.initialize().unwrap();
        model
    }

    #[test]
    fn model_from_file() {
        let mut model = Model::from_file("./test_input/model_a.json").unwrap();
        assert_eq!(model.aquifers().len(), 2);
        assert_eq!(model.elements().len(), 3);
        assert!(!model.is_initialized());

        let square = model.element(0).unwrap();
        assert_eq!(square.name(), "square");
        assert_eq!(square.base().rate(), 0.001);

        let strip = model.element(1).unwrap();
        assert_eq!(strip.name(), "StripAreaSink");
        assert_eq!(strip.base().layer(), 1);

        let inner = model.element(2).unwrap();
        assert_eq!(inner.base().label(), Some("zone 7"));

        let background = model.aquifers().background().clone();
        assert_eq!(background.naq(), 2);
        assert_eq!(background.transmissivity()[1], 5.0);
        assert!(model.aquifers().get(1).unwrap().region().is_some());

        model.initialize().unwrap();
        assert_eq!(model.aquifer_elements(0), &[0, 1]);
        assert_eq!(model.aquifer_elements(1), &[2]);
        assert!(model.aquifer_elements(5).is_empty());
    }

    #[test]
    fn semi_confined_strip_aborts_initialization() {
        let mut model = Model::from_file("./test_input/semi_confined.json").unwrap();

        match model.initialize() {
            Err(ModelError::ElementFailed { id, source }) => {
                assert_eq!(id, 1);
                assert!(matches!(source, ElementError::UnsupportedAquifer { aquifer: 0, .. }));
            }
            other => panic!("expected the strip to be rejected, got {:?}", other),
        }

        assert!(!model.is_initialized());
        assert!(matches!(
            model.potential(Point::new(0.0, 0.0)),
            Err(ModelError::NotInitialized)
        ));
    }

    #[test]
    fn superposition() {
        let model = single_layer_model();
        let p = Point::new(0.0, 0.0);

        // square center plus the strip's linear branch left of [4, 6]
        let expected = 2.0 * 0.23429405839872042 - 0.5 * 4.5;
        let potential = model.potential(p).unwrap();
        assert!((potential[0] - expected).abs() < 1e-10);
        assert!((model.potinf(1, p, None).unwrap()[0] + 4.5).abs() < 1e-12);

        let head = model.head(p).unwrap();
        assert!((head[0] - potential[0] / 10.0).abs() < 1e-15);

        // the square is symmetric about the origin; the strip pushes water towards -x
        let [qx, qy] = model.discharge(p).unwrap();
        assert!((qx[0] + 0.5).abs() < 1e-12);
        assert!(qy[0].abs() < 1e-12);
    }

    #[test]
    fn recharge_mound_decays_away_from_strip() {
        let aq = Aquifer::new(
            0,
            vec![2.0],
            DMatrix::from_row_slice(2, 2, &[0.5, 1.0, 0.5, -1.0]),
            DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 1.0, -0.5]),
            true,
        )
        .unwrap();
        let mut model = Model::new(AquiferSet::new(aq).unwrap());
        model.add_element(StripAreaSink::new(-1.0, 1.0, 0.001, ElementOptions::default()).unwrap());
        model.initialize().unwrap();

        let center = model.potential(Point::new(0.0, 0.0)).unwrap();
        let away = model.potential(Point::new(10.0, 0.0)).unwrap();
        for layer in 0..2 {
            assert!(center[layer] > away[layer]);
        }
    }

    #[test]
    fn element_queries_are_checked() {
        let mut model = single_layer_model();
        assert!(matches!(
            model.potinf(7, Point::new(0.0, 0.0), None),
            Err(ModelError::UnknownElement(7))
        ));

        model.add_element(StripAreaSink::new(-9.0, -8.0, 1.0, ElementOptions::default()).unwrap());
        assert!(matches!(
            model.disvecinf(0, Point::new(0.0, 0.0), None),
            Err(ModelError::NotInitialized)
        ));

        model.initialize().unwrap();
        let aq = model.aquifers().background().clone();
        let explicit = model.potinf(2, Point::new(-8.5, 0.0), Some(&aq)).unwrap();
        let detected = model.potinf(2, Point::new(-8.5, 0.0), None).unwrap();
        assert_eq!(explicit, detected);

        // an explicitly passed aquifer is used as given, even where another one would be found
        let elsewhere = Aquifer::single_layer(4, 1.0);
        assert_eq!(
            model.potinf(2, Point::new(-8.5, 0.0), Some(&elsewhere)).unwrap(),
            DVector::zeros(1)
        );
        let [qx, _] = model.disvecinf(2, Point::new(-8.5, 0.0), Some(&elsewhere)).unwrap();
        assert_eq!(qx, DVector::zeros(1));
    }

    #[test]
    fn parallel_matches_serial() {
        let mut model = Model::from_file("./test_input/model_a.json").unwrap();
        model.initialize().unwrap();

        let points: Vec<Point> = (0..40)
            .flat_map(|i| (0..10).map(move |j| Point::new(-10.0 + 1.6 * i as f64, -3.0 + 0.7 * j as f64)))
            .collect();

        let potentials = model.potential_many(&points).unwrap();
        let discharges = model.discharge_many(&points).unwrap();
        let heads = model.head_many(&points).unwrap();

        for (i, p) in points.iter().enumerate() {
            assert_eq!(potentials[i], model.potential(*p).unwrap());
            assert_eq!(discharges[i], model.discharge(*p).unwrap());
            assert_eq!(heads[i], model.head(*p).unwrap());
        }
    }

    #[test]
    fn inhomogeneity_rows_follow_query_aquifer() {
        let mut model = Model::from_file("./test_input/model_a.json").unwrap();
        model.initialize().unwrap();

        let inside = Point::new(50.0, 0.0);
        assert_eq!(model.find_aquifer_data(inside).id(), 1);
        assert_eq!(model.potential(inside).unwrap().len(), 1);

        // the strip lives in the background aquifer only
        assert_eq!(model.potinf(1, inside, None).unwrap(), DVector::zeros(1));
        assert_ne!(model.potinf(2, inside, None).unwrap()[0], 0.0);
    }

    #[test]
    fn invalid_model_files() {
        let missing_rate = json::parse(
            r#"{
                "Aquifers": [{ "naq": 1, "lab": [], "eigvec": [[1.0]], "coef": [[1.0]] }],
                "Elements": [{ "type": "StripAreaSink", "xleft": 0.0, "xright": 1.0 }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Model::from_json(&missing_rate),
            Err(ModelError::InvalidFile(_))
        ));

        let two_backgrounds = json::parse(
            r#"{
                "Aquifers": [
                    { "lab": [], "eigvec": [[1.0]], "coef": [[1.0]] },
                    { "lab": [], "eigvec": [[1.0]], "coef": [[1.0]] }
                ],
                "Elements": []
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Model::from_json(&two_backgrounds),
            Err(ModelError::Aquifer(AquiferError::MultipleBackgrounds))
        ));

        let flat_polygon = json::parse(
            r#"{
                "Aquifers": [{ "lab": [], "eigvec": [[1.0]], "coef": [[1.0]] }],
                "Elements": [{ "type": "PolyAreaSink", "N": 1.0, "xy": [[0, 0], [1, 1], [2, 2]] }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Model::from_json(&flat_polygon),
            Err(ModelError::ElementFailed {
                id: 0,
                source: ElementError::Geometry(GeometryError::ZeroArea)
            })
        ));

        let unknown_type = json::parse(
            r#"{
                "Aquifers": [{ "lab": [], "eigvec": [[1.0]], "coef": [[1.0]] }],
                "Elements": [{ "type": "Well", "N": 1.0 }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Model::from_json(&unknown_type),
            Err(ModelError::InvalidFile(_))
        ));

        assert!(matches!(
            Model::from_file("./test_input/does_not_exist.json"),
            Err(ModelError::Io(_))
        ));
    }

    #[cfg(feature = "json_export")]
    #[test]
    fn export_and_reload() {
        let mut model = Model::from_file("./test_input/model_a.json").unwrap();
        model.initialize().unwrap();

        let path = std::env::temp_dir().join("aem_recharge_export_test.json");
        let path = path.to_str().unwrap();
        model.export_to_json(path).unwrap();

        let mut reloaded = Model::from_file(path).unwrap();
        reloaded.initialize().unwrap();

        assert_eq!(reloaded.elements().len(), model.elements().len());
        for (a, b) in model.elements().iter().zip(reloaded.elements().iter()) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.base().label(), b.base().label());
            assert_eq!(a.base().layer(), b.base().layer());
        }

        for p in [Point::new(0.3, 0.1), Point::new(-4.0, 2.0), Point::new(49.0, 1.0)] {
            let diff = model.potential(p).unwrap() - reloaded.potential(p).unwrap();
            assert!(diff.amax() < 1e-12);
        }
        assert_eq!(reloaded.aquifer_elements(1), &[2]);
    }
}
