//! The geocode oracle: query contracts and the Nominatim client.

use super::cache::ResponseCache;
use super::types::{Candidate, GeocodeError};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim's usage policy: at most one request per second.
const MIN_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// A structured query over the administrative fields. Absent fields are
/// omitted from the request entirely, never sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredQuery {
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl StructuredQuery {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.county.is_none()
            && self.state.is_none()
            && self.country.is_none()
    }
}

/// What the resolver asks the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleQuery {
    Structured(StructuredQuery),
    FreeText(String),
}

/// Per-call knobs, mirroring the Nominatim search parameters.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub language: String,
    pub address_details: bool,
    pub extra_tags: bool,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl SearchParams {
    /// Single best result, no address breakdown (structured path).
    pub fn single(language: &str) -> Self {
        Self {
            language: language.to_string(),
            address_details: false,
            extra_tags: false,
            limit: 1,
            timeout_secs: 10,
        }
    }

    /// Ranked candidate list with address detail (landmark tiers).
    pub fn ranked(language: &str, limit: usize) -> Self {
        Self {
            language: language.to_string(),
            address_details: true,
            extra_tags: true,
            limit,
            timeout_secs: 10,
        }
    }
}

/// External geocoding service returning ranked address candidates.
///
/// Implementations own their rate limiting, caching, and retry policy;
/// callers only see the final outcome of each search. A failed search is
/// one `Err` per call, which the resolver treats as an empty tier.
pub trait GeocodeOracle {
    fn search(
        &self,
        query: &OracleQuery,
        params: &SearchParams,
    ) -> Result<Vec<Candidate>, GeocodeError>;
}

// ─── Nominatim client ────────────────────────────────────────────

/// Raw Nominatim search result. Coordinates arrive as strings.
#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    osm_id: Option<i64>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    importance: Option<f64>,
}

/// An unparsable coordinate drops the candidate, not the whole query.
fn to_candidate(r: NominatimResult) -> Option<Candidate> {
    let lat: f64 = r.lat.parse().ok()?;
    let lon: f64 = r.lon.parse().ok()?;
    Some(Candidate {
        display_name: r.display_name,
        lat,
        lon,
        osm_id: r.osm_id,
        class: r.class,
        kind: r.kind,
        importance: r.importance,
    })
}

/// The OpenStreetMap Nominatim client.
///
/// Carries the collaborator-owned policies: a minimum inter-request delay
/// and a 7-day on-disk response cache keyed by request URL. The engine
/// above never throttles or caches on its own.
pub struct NominatimOracle {
    base_url: String,
    user_agent: String,
    cache: Option<Mutex<ResponseCache>>,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimOracle {
    pub fn new(user_agent: &str) -> Self {
        Self {
            base_url: NOMINATIM_URL.to_string(),
            user_agent: user_agent.to_string(),
            cache: Some(Mutex::new(ResponseCache::load())),
            last_request: Mutex::new(None),
        }
    }

    /// Client without the response cache: every query goes to the wire.
    pub fn without_cache(user_agent: &str) -> Self {
        Self {
            base_url: NOMINATIM_URL.to_string(),
            user_agent: user_agent.to_string(),
            cache: None,
            last_request: Mutex::new(None),
        }
    }

    /// Point the client at a different endpoint (self-hosted mirrors).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn request_url(&self, query: &OracleQuery, params: &SearchParams) -> String {
        let mut url = format!("{}?format=json", self.base_url);
        match query {
            OracleQuery::Structured(q) => {
                let fields = [
                    ("city", &q.city),
                    ("county", &q.county),
                    ("state", &q.state),
                    ("country", &q.country),
                ];
                for (key, value) in fields {
                    if let Some(v) = value {
                        url.push_str(&format!("&{}={}", key, urlencod(v)));
                    }
                }
            }
            OracleQuery::FreeText(q) => {
                url.push_str(&format!("&q={}", urlencod(q)));
            }
        }
        url.push_str(&format!("&limit={}", params.limit));
        url.push_str(&format!(
            "&addressdetails={}",
            if params.address_details { 1 } else { 0 }
        ));
        if params.extra_tags {
            url.push_str("&extratags=1");
        }
        url.push_str(&format!("&accept-language={}", urlencod(&params.language)));
        url
    }

    fn throttle(&self) {
        let mut last = self.last_request.lock().unwrap();
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < MIN_REQUEST_DELAY {
                std::thread::sleep(MIN_REQUEST_DELAY - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl GeocodeOracle for NominatimOracle {
    fn search(
        &self,
        query: &OracleQuery,
        params: &SearchParams,
    ) -> Result<Vec<Candidate>, GeocodeError> {
        let url = self.request_url(query, params);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().unwrap().get(&url) {
                return Ok(hit);
            }
        }

        self.throttle();

        let response = ureq::get(&url)
            .set("User-Agent", &self.user_agent)
            .timeout(Duration::from_secs(params.timeout_secs))
            .call()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let results: Vec<NominatimResult> = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let candidates: Vec<Candidate> = results.into_iter().filter_map(to_candidate).collect();

        if let Some(cache) = &self.cache {
            cache.lock().unwrap().put(&url, &candidates);
        }

        Ok(candidates)
    }
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencod(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ',' => "%2C".to_string(),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' => {
                c.to_string()
            }
            _ => format!("%{:02X}", c as u32),
        })
        .collect()
}
