//! Batch resolution — the whole extraction batch to the output table.

use super::oracle::GeocodeOracle;
use super::resolver::RowResolver;
use super::types::{
    Candidate, GeocodeError, LocationBatch, LocationRow, ResolvedLocation, ABSENT,
};

/// Resolves extraction batches row by row, strictly in order. Rows are
/// independent; the sequential walk exists because the oracle enforces a
/// minimum inter-request delay.
pub struct BatchGeocoder<O: GeocodeOracle> {
    oracle: O,
    language: String,
}

impl<O: GeocodeOracle> BatchGeocoder<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            language: "en".to_string(),
        }
    }

    /// Oracle locale for display names.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Resolve every row of the batch. The length precondition is checked
    /// before any oracle call; one row failing to resolve never aborts
    /// the rest, and the output preserves input order and length.
    pub fn resolve_batch(
        &self,
        batch: &LocationBatch,
    ) -> Result<Vec<ResolvedLocation>, GeocodeError> {
        batch.validate()?;

        let resolver = RowResolver::new(&self.oracle, &self.language);
        let mut out = Vec::with_capacity(batch.len());

        for ix in 0..batch.len() {
            let row = batch.row(ix);
            let chosen = resolver.resolve(&row);
            let record = output_row(batch, ix, &row, chosen.as_ref());
            eprintln!(
                "  [{}/{}] {} -> {}",
                ix + 1,
                batch.len(),
                record.map_name,
                if record.lat.is_some() { "located" } else { "no match" },
            );
            out.push(record);
        }

        Ok(out)
    }
}

/// Assemble one output record. Coordinates come from the winning
/// candidate as a pair, never singly.
fn output_row(
    batch: &LocationBatch,
    ix: usize,
    row: &LocationRow,
    chosen: Option<&Candidate>,
) -> ResolvedLocation {
    ResolvedLocation {
        city: batch.cities[ix].clone(),
        province_or_county: batch.provinces_counties[ix].clone(),
        state: batch.states[ix].clone(),
        country: batch.countries[ix].clone(),
        landmark: batch.landmarks[ix].clone(),
        summary: batch.summary[ix].clone(),
        display_name: chosen.map(|c| c.display_name.clone()),
        lat: chosen.map(|c| c.lat),
        lon: chosen.map(|c| c.lon),
        osm_id: chosen.and_then(|c| c.osm_id),
        class: chosen.and_then(|c| c.class.clone()),
        kind: chosen.and_then(|c| c.kind.clone()),
        importance: chosen.and_then(|c| c.importance),
        map_name: derive_map_name(row, chosen.map(|c| c.display_name.as_str())),
    }
}

/// The label shown on the map: the oracle's own most specific name when
/// available (first comma segment of display_name, which reflects what
/// was actually matched), then the row's fields from most to least
/// specific, then the sentinel.
fn derive_map_name(row: &LocationRow, display_name: Option<&str>) -> String {
    if let Some(dn) = display_name {
        if let Some(first) = dn.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    [
        &row.landmark,
        &row.city,
        &row.province_or_county,
        &row.state,
        &row.country,
    ]
    .into_iter()
    .find_map(|field| field.clone())
    .unwrap_or_else(|| ABSENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::oracle::StructuredQuery;
    use crate::geocode::testutil::{cand, ScriptedOracle};
    use approx::assert_relative_eq;

    fn batch() -> LocationBatch {
        LocationBatch {
            cities: vec!["Paris".into(), "None".into(), "None".into()],
            provinces_counties: vec!["Paris".into(), "None".into(), "None".into()],
            states: vec!["None".into(), "California".into(), "None".into()],
            countries: vec!["France".into(), "USA".into(), "None".into()],
            landmarks: vec!["None".into(), "Golden Gate Park".into(), "None".into()],
            summary: vec!["Capital visit".into(), "Concert in the park".into(), "None".into()],
        }
    }

    fn scripted() -> ScriptedOracle {
        let oracle = ScriptedOracle::new();
        oracle.respond_structured(
            StructuredQuery {
                city: Some("Paris".into()),
                country: Some("France".into()),
                ..Default::default()
            },
            vec![Candidate {
                display_name: "Paris, Île-de-France, Metropolitan France, France".into(),
                lat: 48.8566,
                lon: 2.3522,
                osm_id: Some(7444),
                class: Some("place".into()),
                kind: Some("city".into()),
                importance: Some(0.96),
            }],
        );
        oracle.respond_free_text(
            "Golden Gate Park, California",
            vec![cand("Golden Gate Park, San Francisco, CA", "leisure", "park")],
        );
        oracle
    }

    #[test]
    fn test_output_preserves_length_and_order() {
        let geocoder = BatchGeocoder::new(scripted());
        let b = batch();
        let table = geocoder.resolve_batch(&b).unwrap();

        assert_eq!(table.len(), b.len());
        assert_eq!(table[0].city, "Paris");
        assert_eq!(table[1].landmark, "Golden Gate Park");
        assert_eq!(table[2].city, "None");
    }

    #[test]
    fn test_coordinates_are_paired() {
        let geocoder = BatchGeocoder::new(scripted());
        let table = geocoder.resolve_batch(&batch()).unwrap();

        for resolved in &table {
            assert_eq!(resolved.lat.is_some(), resolved.lon.is_some());
        }
        assert_relative_eq!(table[0].lat.unwrap(), 48.8566);
        assert_relative_eq!(table[0].lon.unwrap(), 2.3522);
        assert!(table[2].lat.is_none());
    }

    #[test]
    fn test_malformed_batch_aborts_before_any_query() {
        let oracle = ScriptedOracle::new();
        let geocoder = BatchGeocoder::new(oracle);

        let mut b = batch();
        b.landmarks.push("Extra".into());
        let err = geocoder.resolve_batch(&b).unwrap_err();
        assert!(matches!(err, GeocodeError::MalformedBatch(_)));
        assert!(geocoder.oracle.queries.borrow().is_empty());
    }

    #[test]
    fn test_map_name_favors_oracle_display_name() {
        let geocoder = BatchGeocoder::new(scripted());
        let table = geocoder.resolve_batch(&batch()).unwrap();

        // First comma segment of the matched display name, independent of
        // the landmark field's own value.
        assert_eq!(table[1].map_name, "Golden Gate Park");
        assert_eq!(table[0].map_name, "Paris");
    }

    #[test]
    fn test_map_name_falls_back_through_fields() {
        // Unresolved rows: label comes from the input fields.
        let oracle = ScriptedOracle::new();
        let geocoder = BatchGeocoder::new(oracle);
        let b = LocationBatch {
            cities: vec!["None".into(), "Seattle".into()],
            provinces_counties: vec!["None".into(), "King".into()],
            states: vec!["Washington".into(), "Washington".into()],
            countries: vec!["USA".into(), "USA".into()],
            landmarks: vec!["None".into(), "None".into()],
            summary: vec!["None".into(), "None".into()],
        };
        let table = geocoder.resolve_batch(&b).unwrap();

        assert_eq!(table[0].map_name, "Washington");
        assert_eq!(table[1].map_name, "Seattle");
    }

    #[test]
    fn test_fully_absent_row_resolves_to_sentinel_label() {
        let oracle = ScriptedOracle::new();
        let geocoder = BatchGeocoder::new(oracle);
        let b = LocationBatch {
            cities: vec!["None".into()],
            provinces_counties: vec!["None".into()],
            states: vec!["None".into()],
            countries: vec!["None".into()],
            landmarks: vec!["None".into()],
            summary: vec!["None".into()],
        };
        let table = geocoder.resolve_batch(&b).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table[0].lat.is_none());
        assert!(table[0].lon.is_none());
        assert!(table[0].display_name.is_none());
        assert!(table[0].osm_id.is_none());
        assert_eq!(table[0].map_name, "None");
        assert!(geocoder.oracle.queries.borrow().is_empty());
    }

    #[test]
    fn test_one_failing_row_never_corrupts_the_rest() {
        let oracle = scripted();
        oracle.fail_structured(StructuredQuery {
            city: Some("Paris".into()),
            country: Some("France".into()),
            ..Default::default()
        });
        let geocoder = BatchGeocoder::new(oracle);
        let table = geocoder.resolve_batch(&batch()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table[0].lat.is_none());
        assert!(table[1].lat.is_some());
    }

    #[test]
    fn test_idempotent_against_deterministic_oracle() {
        let geocoder = BatchGeocoder::new(scripted());
        let b = batch();
        let first = geocoder.resolve_batch(&b).unwrap();
        let second = geocoder.resolve_batch(&b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_batch() {
        let geocoder = BatchGeocoder::new(ScriptedOracle::new());
        let b = LocationBatch {
            cities: vec![],
            provinces_counties: vec![],
            states: vec![],
            countries: vec![],
            landmarks: vec![],
            summary: vec![],
        };
        let table = geocoder.resolve_batch(&b).unwrap();
        assert!(table.is_empty());
    }
}
