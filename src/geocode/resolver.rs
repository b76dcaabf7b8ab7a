//! Row resolution — one input row to one best-guess candidate.
//!
//! Mention flow:  no landmark → single structured query over the present
//! administrative fields; landmark → free-text queries in decreasing
//! specificity, because structured queries are unreliable for named
//! landmarks: Nominatim tends to answer with the containing region.

use super::landmark::{is_natural_landmark, select_best};
use super::oracle::{GeocodeOracle, OracleQuery, SearchParams, StructuredQuery};
use super::types::{Candidate, LocationRow};

/// Ranked candidates requested per landmark tier.
const TIER_LIMIT: usize = 5;

/// One attempt in the landmark fallback sequence: a query built from the
/// row's context when its prerequisites are present, and a keep-filter
/// that discards bare administrative echoes of that same context.
struct Tier {
    build: fn(&LocationRow, &str) -> Option<String>,
    keep: fn(&Candidate) -> bool,
}

/// The fallback sequence, most specific first. Evaluated in order with
/// early exit on the first tier that yields a usable candidate.
const TIERS: &[Tier] = &[
    // "{landmark}, {city}, {state}"
    Tier {
        build: |row, lm| match (&row.city, &row.state) {
            (Some(city), Some(state)) => Some(format!("{}, {}, {}", lm, city, state)),
            _ => None,
        },
        keep: |c| !(c.class_is("place") && c.kind_in(&["city", "state", "country"])),
    },
    // "{landmark}, {state}"
    Tier {
        build: |row, lm| row.state.as_ref().map(|state| format!("{}, {}", lm, state)),
        keep: |c| !(c.class_is("place") && c.kind_in(&["state", "country"])),
    },
    // "{landmark}, {country}"
    Tier {
        build: |row, lm| row.country.as_ref().map(|country| format!("{}, {}", lm, country)),
        keep: |c| !c.kind_in(&["country"]),
    },
];

/// Resolves one row against the oracle. Stateless across rows.
pub struct RowResolver<'a, O: GeocodeOracle> {
    oracle: &'a O,
    language: String,
}

impl<'a, O: GeocodeOracle> RowResolver<'a, O> {
    pub fn new(oracle: &'a O, language: &str) -> Self {
        Self {
            oracle,
            language: language.to_string(),
        }
    }

    /// Resolve a row to its winning candidate, if any. A `None` outcome
    /// is not an error: the row simply stays off the map.
    pub fn resolve(&self, row: &LocationRow) -> Option<Candidate> {
        match &row.landmark {
            Some(lm) => self.resolve_landmark(row, lm),
            None => self.resolve_structured(row),
        }
    }

    /// Structured path: exactly one query over the present fields.
    fn resolve_structured(&self, row: &LocationRow) -> Option<Candidate> {
        let mut query = StructuredQuery {
            city: row.city.clone(),
            county: row.province_or_county.clone(),
            state: row.state.clone(),
            country: row.country.clone(),
        };

        // A city that names its own county (San Francisco) makes the
        // structured query self-referential; drop the county.
        if let (Some(city), Some(county)) = (&query.city, &query.county) {
            if city.to_lowercase() == county.to_lowercase() {
                query.county = None;
            }
        }

        if query.is_empty() {
            return None; // nothing to ask the oracle
        }

        let params = SearchParams::single(&self.language);
        match self.oracle.search(&OracleQuery::Structured(query), &params) {
            Ok(candidates) => candidates.into_iter().next(),
            Err(e) => {
                eprintln!("  Warning: structured query failed: {}", e);
                None
            }
        }
    }

    /// Landmark path: tiered free-text queries, stopping at the first
    /// tier whose filtered candidate set is non-empty. A transient
    /// failure on one tier is logged and the next tier still runs.
    fn resolve_landmark(&self, row: &LocationRow, landmark: &str) -> Option<Candidate> {
        let prefer_natural = is_natural_landmark(Some(landmark));
        let params = SearchParams::ranked(&self.language, TIER_LIMIT);

        for tier in TIERS {
            let text = match (tier.build)(row, landmark) {
                Some(text) => text,
                None => continue,
            };

            let candidates = match self.oracle.search(&OracleQuery::FreeText(text.clone()), &params) {
                Ok(candidates) => candidates,
                Err(e) => {
                    eprintln!("  Warning: query '{}' failed: {}", text, e);
                    continue;
                }
            };

            let usable: Vec<Candidate> =
                candidates.into_iter().filter(|c| (tier.keep)(c)).collect();
            if !usable.is_empty() {
                return Some(select_best(&usable, prefer_natural).clone());
            }
        }

        None
    }
}
