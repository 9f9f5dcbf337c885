use crate::geometry::{Point, Polygon};

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::sync::Arc;

/// Read-only description of the layered aquifer system at some location
///
/// The eigen-decomposition of the layer system happens elsewhere; this structure only
/// carries its results:
/// * `lab`: decay lengths of modes `1..naq` (mode 0 is the Laplace mode and has none)
/// * `eigvec`: maps a vector in mode space onto the layers
/// * `coef`: row `i` holds the modal coefficients of a unit source in layer `i`
#[derive(Debug, Clone)]
pub struct Aquifer {
    id: usize,
    naq: usize,
    lab: DVector<f64>,
    eigvec: DMatrix<f64>,
    coef: DMatrix<f64>,
    ilap: bool,
    t: DVector<f64>,
    region: Option<Polygon>,
}

impl Aquifer {
    pub fn new(
        id: usize,
        lab: Vec<f64>,
        eigvec: DMatrix<f64>,
        coef: DMatrix<f64>,
        ilap: bool,
    ) -> Result<Self, AquiferError> {
        let naq = eigvec.nrows();
        if naq == 0 {
            return Err(AquiferError::NoLayers);
        }
        check_dims("eigvec", [naq, naq], eigvec.shape())?;
        check_dims("coef", [naq, naq], coef.shape())?;
        check_dims("lab", [naq - 1, 1], (lab.len(), 1))?;

        if let Some(k) = lab.iter().position(|l| !(l.is_finite() && *l > 0.0)) {
            return Err(AquiferError::InvalidDecayLength(k + 1));
        }

        Ok(Self {
            id,
            naq,
            lab: DVector::from_vec(lab),
            eigvec,
            coef,
            ilap,
            t: DVector::from_element(naq, 1.0),
            region: None,
        })
    }

    /// A single confined layer: only the Laplace mode
    pub fn single_layer(id: usize, transmissivity: f64) -> Self {
        Self {
            id,
            naq: 1,
            lab: DVector::zeros(0),
            eigvec: DMatrix::identity(1, 1),
            coef: DMatrix::identity(1, 1),
            ilap: true,
            t: DVector::from_element(1, transmissivity),
            region: None,
        }
    }

    /// Set the per-layer transmissivities used to convert potentials into heads
    pub fn with_transmissivity(mut self, t: Vec<f64>) -> Result<Self, AquiferError> {
        check_dims("T", [self.naq, 1], (t.len(), 1))?;
        self.t = DVector::from_vec(t);
        Ok(self)
    }

    /// Restrict this aquifer to a polygonal region (an inhomogeneity)
    pub fn with_region(mut self, region: Polygon) -> Self {
        self.region = Some(region);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of layers (and of eigenmodes)
    pub fn naq(&self) -> usize {
        self.naq
    }

    pub fn lab(&self) -> &DVector<f64> {
        &self.lab
    }

    pub fn eigvec(&self) -> &DMatrix<f64> {
        &self.eigvec
    }

    pub fn coef(&self) -> &DMatrix<f64> {
        &self.coef
    }

    /// Whether the top boundary admits the Laplace (leakage-free) mode
    pub fn ilap(&self) -> bool {
        self.ilap
    }

    pub fn transmissivity(&self) -> &DVector<f64> {
        &self.t
    }

    pub fn region(&self) -> Option<&Polygon> {
        self.region.as_ref()
    }

    /// Whether `p` falls inside this aquifer's region (always false for the background aquifer)
    pub fn contains(&self, p: Point) -> bool {
        self.region
            .as_ref()
            .map(|region| region.is_inside(p).0)
            .unwrap_or(false)
    }

    /// Map a vector in mode space onto the layers
    pub fn to_layers(&self, modal: &DVector<f64>) -> DVector<f64> {
        &self.eigvec * modal
    }

    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        let rows = |m: &DMatrix<f64>| {
            JsonValue::from(
                m.row_iter()
                    .map(|row| JsonValue::from(row.iter().cloned().collect::<Vec<f64>>()))
                    .collect::<Vec<_>>(),
            )
        };

        let mut aq_json = object! {
            "naq": self.naq,
            "lab": self.lab.iter().cloned().collect::<Vec<f64>>(),
            "eigvec": rows(&self.eigvec),
            "coef": rows(&self.coef),
            "ilap": self.ilap,
            "T": self.t.iter().cloned().collect::<Vec<f64>>(),
        };

        if let Some(region) = &self.region {
            aq_json["region"] = JsonValue::from(
                region
                    .vertices()
                    .iter()
                    .map(|v| v.to_json())
                    .collect::<Vec<_>>(),
            );
        }

        aq_json
    }
}

impl PartialEq for Aquifer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Aquifer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Aquifer {} ({} layers", self.id, self.naq)?;
        if self.region.is_some() {
            write!(f, ", inhomogeneity")?;
        }
        write!(f, ")")
    }
}

fn check_dims(
    what: &'static str,
    expected: [usize; 2],
    (rows, cols): (usize, usize),
) -> Result<(), AquiferError> {
    if [rows, cols] == expected {
        Ok(())
    } else {
        Err(AquiferError::DimensionMismatch {
            what,
            expected,
            found: [rows, cols],
        })
    }
}

/// Anything that can report the aquifer found at a location
pub trait AquiferLookup {
    fn find_aquifer_data(&self, p: Point) -> Arc<Aquifer>;
}

/// A background aquifer plus any number of polygonal inhomogeneities
#[derive(Debug, Clone)]
pub struct AquiferSet {
    background: Arc<Aquifer>,
    inhoms: Vec<Arc<Aquifer>>,
}

impl AquiferSet {
    pub fn new(background: Aquifer) -> Result<Self, AquiferError> {
        if background.region.is_some() {
            return Err(AquiferError::MissingBackground);
        }

        Ok(Self {
            background: Arc::new(background),
            inhoms: Vec::new(),
        })
    }

    /// Build a set from a flat list; exactly one entry must be without a region
    pub fn from_list(aquifers: Vec<Aquifer>) -> Result<Self, AquiferError> {
        for (i, aq) in aquifers.iter().enumerate() {
            if aquifers[..i].iter().any(|prev| prev.id == aq.id) {
                return Err(AquiferError::DuplicateId(aq.id));
            }
        }

        let (backgrounds, inhoms): (Vec<Aquifer>, Vec<Aquifer>) =
            aquifers.into_iter().partition(|aq| aq.region.is_none());

        let mut backgrounds = backgrounds.into_iter();
        match (backgrounds.next(), backgrounds.next()) {
            (Some(background), None) => {
                let mut set = Self::new(background)?;
                for inhom in inhoms {
                    set.add_inhomogeneity(inhom)?;
                }
                Ok(set)
            }
            (None, _) => Err(AquiferError::MissingBackground),
            (Some(_), Some(_)) => Err(AquiferError::MultipleBackgrounds),
        }
    }

    /// Add an aquifer that applies inside its region
    ///
    /// Regions are searched in the order they were added.
    pub fn add_inhomogeneity(&mut self, aquifer: Aquifer) -> Result<(), AquiferError> {
        if aquifer.region.is_none() {
            return Err(AquiferError::MissingRegion(aquifer.id));
        }
        if self.iter().any(|aq| aq.id == aquifer.id) {
            return Err(AquiferError::DuplicateId(aquifer.id));
        }

        self.inhoms.push(Arc::new(aquifer));
        Ok(())
    }

    pub fn background(&self) -> &Arc<Aquifer> {
        &self.background
    }

    pub fn get(&self, id: usize) -> Option<&Arc<Aquifer>> {
        self.iter().find(|aq| aq.id == id)
    }

    /// Iterate over all aquifers, background first
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Aquifer>> + '_ {
        std::iter::once(&self.background).chain(self.inhoms.iter())
    }

    pub fn len(&self) -> usize {
        self.inhoms.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AquiferLookup for AquiferSet {
    fn find_aquifer_data(&self, p: Point) -> Arc<Aquifer> {
        self.inhoms
            .iter()
            .find(|aq| aq.contains(p))
            .unwrap_or(&self.background)
            .clone()
    }
}

/// Error type for inconsistent aquifer descriptions
#[derive(Debug, Clone, PartialEq)]
pub enum AquiferError {
    NoLayers,
    DimensionMismatch {
        what: &'static str,
        expected: [usize; 2],
        found: [usize; 2],
    },
    InvalidDecayLength(usize),
    MissingBackground,
    MultipleBackgrounds,
    MissingRegion(usize),
    DuplicateId(usize),
}

impl std::error::Error for AquiferError {}

impl fmt::Display for AquiferError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoLayers => write!(f, "Aquifer has no layers; Cannot construct Aquifer!"),
            Self::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "'{}' has shape {:?} (expected {:?}); Cannot construct Aquifer!",
                what, found, expected
            ),
            Self::InvalidDecayLength(mode) => write!(
                f,
                "Decay length of mode {} must be positive and finite; Cannot construct Aquifer!",
                mode
            ),
            Self::MissingBackground => {
                write!(f, "Exactly one Aquifer must have no region; none found!")
            }
            Self::MultipleBackgrounds => write!(
                f,
                "Exactly one Aquifer must have no region; found more than one!"
            ),
            Self::MissingRegion(id) => write!(
                f,
                "Aquifer {} has no region; Cannot add it as an inhomogeneity!",
                id
            ),
            Self::DuplicateId(id) => write!(f, "Aquifer id {} is used more than once!", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer(id: usize) -> Aquifer {
        Aquifer::new(
            id,
            vec![2.0],
            DMatrix::from_row_slice(2, 2, &[0.5, 1.0, 0.5, -1.0]),
            DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 1.0, -0.5]),
            true,
        )
        .unwrap()
    }

    fn square(vertices_cw: bool) -> Polygon {
        let mut xy = vec![
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ];
        if vertices_cw {
            xy.reverse();
        }
        Polygon::new(&xy).unwrap()
    }

    #[test]
    fn descriptor_dimensions() {
        let aq = two_layer(0);
        assert_eq!(aq.naq(), 2);
        assert_eq!(aq.lab().len(), 1);
        assert_eq!(aq.transmissivity().len(), 2);

        let bad_coef = Aquifer::new(
            0,
            vec![2.0],
            DMatrix::identity(2, 2),
            DMatrix::identity(3, 2),
            true,
        );
        assert_eq!(
            bad_coef.unwrap_err(),
            AquiferError::DimensionMismatch {
                what: "coef",
                expected: [2, 2],
                found: [3, 2],
            }
        );

        let bad_lab = Aquifer::new(0, vec![], DMatrix::identity(2, 2), DMatrix::identity(2, 2), true);
        assert!(matches!(bad_lab, Err(AquiferError::DimensionMismatch { what: "lab", .. })));

        let neg_lab = Aquifer::new(
            0,
            vec![-1.0],
            DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            true,
        );
        assert_eq!(neg_lab.unwrap_err(), AquiferError::InvalidDecayLength(1));

        assert!(two_layer(0).with_transmissivity(vec![1.0]).is_err());
    }

    #[test]
    fn mode_to_layer_mapping() {
        let aq = two_layer(0);
        let layers = aq.to_layers(&DVector::from_vec(vec![2.0, 1.0]));
        assert_eq!(layers, DVector::from_vec(vec![2.0, 0.0]));
    }

    #[test]
    fn inhomogeneity_lookup_either_orientation() {
        for cw in [false, true] {
            let mut set = AquiferSet::new(Aquifer::single_layer(0, 10.0)).unwrap();
            set.add_inhomogeneity(two_layer(1).with_region(square(cw)))
                .unwrap();

            assert_eq!(set.find_aquifer_data(Point::new(0.2, 0.3)).id(), 1);
            assert_eq!(set.find_aquifer_data(Point::new(3.0, 0.3)).id(), 0);
            assert_eq!(set.len(), 2);
            assert!(set.get(1).unwrap().contains(Point::new(-0.9, 0.9)));
        }
    }

    #[test]
    fn set_construction_rules() {
        assert_eq!(
            AquiferSet::from_list(vec![two_layer(0), two_layer(1)]).unwrap_err(),
            AquiferError::MultipleBackgrounds
        );
        assert_eq!(
            AquiferSet::from_list(vec![two_layer(0).with_region(square(false))]).unwrap_err(),
            AquiferError::MissingBackground
        );
        assert_eq!(
            AquiferSet::from_list(vec![two_layer(3), two_layer(3).with_region(square(true))])
                .unwrap_err(),
            AquiferError::DuplicateId(3)
        );

        let mut set = AquiferSet::new(two_layer(0)).unwrap();
        assert_eq!(
            set.add_inhomogeneity(two_layer(1)).unwrap_err(),
            AquiferError::MissingRegion(1)
        );
    }
}
