//! Shared test doubles for the geocoding subsystem.

use super::oracle::{GeocodeOracle, OracleQuery, SearchParams, StructuredQuery};
use super::types::{Candidate, GeocodeError};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A deterministic scripted oracle: canned answers keyed by query,
/// every received query recorded in order. The same query always gets
/// the same answer, so batch resolution against it is reproducible.
pub(crate) struct ScriptedOracle {
    responses: RefCell<HashMap<String, Vec<Candidate>>>,
    failures: RefCell<HashSet<String>>,
    pub(crate) queries: RefCell<Vec<OracleQuery>>,
}

impl ScriptedOracle {
    pub(crate) fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashSet::new()),
            queries: RefCell::new(Vec::new()),
        }
    }

    fn key(query: &OracleQuery) -> String {
        match query {
            OracleQuery::FreeText(q) => q.clone(),
            OracleQuery::Structured(s) => format!(
                "city={:?}|county={:?}|state={:?}|country={:?}",
                s.city, s.county, s.state, s.country
            ),
        }
    }

    pub(crate) fn respond_free_text(&self, text: &str, candidates: Vec<Candidate>) {
        self.responses
            .borrow_mut()
            .insert(Self::key(&OracleQuery::FreeText(text.to_string())), candidates);
    }

    pub(crate) fn respond_structured(&self, query: StructuredQuery, candidates: Vec<Candidate>) {
        self.responses
            .borrow_mut()
            .insert(Self::key(&OracleQuery::Structured(query)), candidates);
    }

    pub(crate) fn fail_free_text(&self, text: &str) {
        self.failures
            .borrow_mut()
            .insert(Self::key(&OracleQuery::FreeText(text.to_string())));
    }

    pub(crate) fn fail_structured(&self, query: StructuredQuery) {
        self.failures
            .borrow_mut()
            .insert(Self::key(&OracleQuery::Structured(query)));
    }
}

impl GeocodeOracle for ScriptedOracle {
    fn search(
        &self,
        query: &OracleQuery,
        _params: &SearchParams,
    ) -> Result<Vec<Candidate>, GeocodeError> {
        self.queries.borrow_mut().push(query.clone());

        let key = Self::key(query);
        if self.failures.borrow().contains(&key) {
            return Err(GeocodeError::Network("scripted outage".into()));
        }
        Ok(self.responses.borrow().get(&key).cloned().unwrap_or_default())
    }
}

/// A candidate with the fields the selector and filters look at.
pub(crate) fn cand(display_name: &str, class: &str, kind: &str) -> Candidate {
    Candidate {
        display_name: display_name.to_string(),
        lat: 37.0,
        lon: -122.0,
        osm_id: Some(1),
        class: Some(class.to_string()),
        kind: Some(kind.to_string()),
        importance: Some(0.5),
    }
}

/// An administrative-area candidate (class "place").
pub(crate) fn place(display_name: &str, kind: &str) -> Candidate {
    cand(display_name, "place", kind)
}
