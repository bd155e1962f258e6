//! Coordinate and address record types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A raw input row: column name to cell value.
pub type Record = BTreeMap<String, String>;

/// Column holding the unique address key.
pub const ADDRESS_FIELD: &str = "formatted_address";
/// Column holding the latitude in decimal degrees.
pub const LATITUDE_FIELD: &str = "latitude";
/// Column holding the longitude in decimal degrees.
pub const LONGITUDE_FIELD: &str = "longitude";
/// Metadata column holding the visitation status code.
pub const CODE_FIELD: &str = "code";
/// Metadata column holding the filing date, compared lexicographically.
pub const FILING_DATE_FIELD: &str = "filing_date";
/// Code assigned to addresses with no prior knowledge.
pub const UNVISITED: &str = "unvisited";

/// A latitude/longitude pair in decimal degrees.
///
/// # Examples
///
/// ```
/// use u_canvass::models::Coordinate;
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(3.0, 4.0);
/// assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Offset of this point from `origin` as `(longitude, latitude)` deltas.
    pub fn offset_from(&self, origin: &Coordinate) -> (f64, f64) {
        (
            self.longitude - origin.longitude,
            self.latitude - origin.latitude,
        )
    }

    /// Straight-line distance in degree space.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (dx, dy) = self.offset_from(other);
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(43.184189, -77.620369)
    }
}

/// A geocoded address plus whatever metadata came with it.
///
/// The formatted address string is the identity of the record. Metadata is
/// carried through untouched so outputs keep the input's record shape;
/// coordinates parsed from a record are written back with their original
/// cell text.
///
/// # Examples
///
/// ```
/// use u_canvass::models::{Address, Record};
///
/// let mut row = Record::new();
/// row.insert("formatted_address".into(), "12 Elm St, Rochester, NY 14621".into());
/// row.insert("latitude".into(), "43.19".into());
/// row.insert("longitude".into(), "-77.61".into());
/// row.insert("grantee".into(), "Jane Roe".into());
///
/// let addr = Address::from_record(&row).unwrap();
/// assert_eq!(addr.metadata("grantee"), Some("Jane Roe"));
/// assert_eq!(addr.to_record(), row);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    formatted_address: String,
    location: Coordinate,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    /// Latitude and longitude cells as read, when parsed from a record.
    #[serde(skip)]
    location_text: Option<(String, String)>,
}

impl Address {
    pub fn new(formatted_address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            location: Coordinate::new(latitude, longitude),
            metadata: BTreeMap::new(),
            location_text: None,
        }
    }

    /// Parses a raw row, separating the required fields from metadata.
    ///
    /// Fails with [`Error::MalformedInput`] when the address is missing or
    /// blank, or when either coordinate is missing, unparsable, or non-finite.
    pub fn from_record(record: &Record) -> Result<Self> {
        let formatted_address = record
            .get(ADDRESS_FIELD)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::malformed("", "missing formatted_address"))?
            .to_string();
        let (latitude, lat_text) = parse_coordinate(record, LATITUDE_FIELD, &formatted_address)?;
        let (longitude, lon_text) =
            parse_coordinate(record, LONGITUDE_FIELD, &formatted_address)?;

        let metadata = record
            .iter()
            .filter(|(k, _)| {
                !matches!(k.as_str(), ADDRESS_FIELD | LATITUDE_FIELD | LONGITUDE_FIELD)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            formatted_address,
            location: Coordinate::new(latitude, longitude),
            metadata,
            location_text: Some((lat_text, lon_text)),
        })
    }

    /// Renders this address back into the input row shape.
    pub fn to_record(&self) -> Record {
        let mut record = self.metadata.clone();
        record.insert(ADDRESS_FIELD.to_string(), self.formatted_address.clone());
        let (lat, lon) = match &self.location_text {
            Some((lat, lon)) => (lat.clone(), lon.clone()),
            None => (
                self.location.latitude().to_string(),
                self.location.longitude().to_string(),
            ),
        };
        record.insert(LATITUDE_FIELD.to_string(), lat);
        record.insert(LONGITUDE_FIELD.to_string(), lon);
        record
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the visitation status code.
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with_metadata(CODE_FIELD, code)
    }

    pub fn formatted_address(&self) -> &str {
        &self.formatted_address
    }

    pub fn location(&self) -> &Coordinate {
        &self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude()
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata_fields(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Visitation status code, [`UNVISITED`] when none is recorded.
    pub fn code(&self) -> &str {
        self.metadata(CODE_FIELD).unwrap_or(UNVISITED)
    }

    pub fn filing_date(&self) -> Option<&str> {
        self.metadata(FILING_DATE_FIELD)
    }

    /// Straight-line distance to another address.
    pub fn distance_to(&self, other: &Address) -> f64 {
        self.location.distance_to(&other.location)
    }
}

/// Parses one coordinate cell, returning the value and the cell as read.
fn parse_coordinate(record: &Record, field: &str, address: &str) -> Result<(f64, String)> {
    let raw = record
        .get(field)
        .ok_or_else(|| Error::malformed(address, format!("missing {field}")))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::malformed(address, format!("unparsable {field} {raw:?}")))?;
    if !value.is_finite() {
        return Err(Error::malformed(address, format!("non-finite {field}")));
    }
    Ok((value, raw.clone()))
}
