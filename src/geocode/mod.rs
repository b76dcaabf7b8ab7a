//! Location resolution subsystem for News Atlas.
//!
//! Turns batches of LLM-extracted place-name rows into coordinates and
//! display labels via the Nominatim geocoding oracle, with landmark-aware
//! disambiguation and per-row failure isolation.

pub mod batch;
pub mod cache;
pub mod landmark;
pub mod oracle;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use batch::BatchGeocoder;
pub use landmark::{is_natural_landmark, select_best};
pub use oracle::{GeocodeOracle, NominatimOracle, OracleQuery, SearchParams, StructuredQuery};
pub use resolver::RowResolver;
pub use types::{Candidate, GeocodeError, LocationBatch, LocationRow, ResolvedLocation};
