//! News Atlas — location resolution engine for news-article mapping.
//!
//! The upstream extraction step (an LLM collaborator) produces batches of
//! loosely structured place-name rows: city, county/province, state,
//! country, landmark, and a free-text summary, each possibly absent.
//! This crate resolves every row to a best-guess geographic point and a
//! human-displayable label using OpenStreetMap Nominatim, compensating
//! for the extractor's inconsistencies with deterministic disambiguation
//! heuristics: landmark detection, tiered free-text query fallback,
//! candidate-class filtering, and duplicate-field suppression.

pub mod geocode;
pub mod server;
