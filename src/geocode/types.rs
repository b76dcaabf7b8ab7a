//! Core types for the geocoding subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The marker the upstream extractor emits for "field not supplied".
/// Distinct from an empty string; never a literal place name.
pub const ABSENT: &str = "None";

/// A batch of extracted location mentions: six parallel arrays, one entry
/// per mention. The wire format of the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationBatch {
    pub cities: Vec<String>,
    pub provinces_counties: Vec<String>,
    pub states: Vec<String>,
    pub countries: Vec<String>,
    pub landmarks: Vec<String>,
    pub summary: Vec<String>,
}

impl LocationBatch {
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Check the equal-length precondition. Must pass before any oracle
    /// call; a mismatched batch is never partially processed.
    pub fn validate(&self) -> Result<(), GeocodeError> {
        let n = self.cities.len();
        let lengths = [
            ("provinces_counties", self.provinces_counties.len()),
            ("states", self.states.len()),
            ("countries", self.countries.len()),
            ("landmarks", self.landmarks.len()),
            ("summary", self.summary.len()),
        ];
        for (field, len) in lengths {
            if len != n {
                return Err(GeocodeError::MalformedBatch(format!(
                    "field '{}' has {} entries, expected {} (same as 'cities')",
                    field, len, n
                )));
            }
        }
        Ok(())
    }

    /// The per-index view of the batch, with the sentinel converted to
    /// `Option` at the boundary.
    pub fn row(&self, ix: usize) -> LocationRow {
        LocationRow {
            city: present(&self.cities[ix]),
            province_or_county: present(&self.provinces_counties[ix]),
            state: present(&self.states[ix]),
            country: present(&self.countries[ix]),
            landmark: present(&self.landmarks[ix]),
            summary: present(&self.summary[ix]),
        }
    }
}

/// The only place in the crate that compares against the sentinel.
fn present(field: &str) -> Option<String> {
    if field == ABSENT {
        None
    } else {
        Some(field.to_string())
    }
}

/// One mention with absent fields made explicit.
#[derive(Debug, Clone, Default)]
pub struct LocationRow {
    pub city: Option<String>,
    pub province_or_county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub landmark: Option<String>,
    pub summary: Option<String>,
}

/// One ranked address candidate from the oracle.
///
/// `importance` is the oracle's own relevance score; it is carried through
/// to the output for inspection but never used for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub osm_id: Option<i64>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
}

impl Candidate {
    pub fn class_is(&self, class: &str) -> bool {
        self.class.as_deref() == Some(class)
    }

    pub fn kind_in(&self, kinds: &[&str]) -> bool {
        self.kind.as_deref().map_or(false, |k| kinds.contains(&k))
    }
}

/// One row of the output table: the original input fields plus what the
/// oracle matched and the derived map label.
///
/// `lat` and `lon` are filled together from one winning candidate or not
/// at all. Consumers plot rows with coordinates and skip the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    #[serde(rename = "cities")]
    pub city: String,
    #[serde(rename = "provinces_counties")]
    pub province_or_county: String,
    #[serde(rename = "states")]
    pub state: String,
    #[serde(rename = "countries")]
    pub country: String,
    #[serde(rename = "landmarks")]
    pub landmark: String,
    pub summary: String,
    pub display_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub osm_id: Option<i64>,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub importance: Option<f64>,
    /// Never empty; falls back to the sentinel only when every source
    /// field is absent.
    pub map_name: String,
}

/// Geocoding subsystem errors.
#[derive(Debug)]
pub enum GeocodeError {
    /// Wrong key set or unequal field-array lengths in the input batch.
    /// Fatal: aborts the whole batch before any oracle call.
    MalformedBatch(String),
    /// Transport failure talking to the oracle (caught per query).
    Network(String),
    /// The oracle answered with something that is not a candidate list.
    InvalidResponse(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedBatch(msg) => write!(f, "Malformed location batch: {}", msg),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for GeocodeError {}
