//! Landmark classification and candidate selection.
//!
//! Nominatim often answers a landmark query with the containing city or
//! region instead of the landmark itself. The heuristics here steer the
//! choice toward candidates whose OSM class matches the landmark's
//! character: natural features for "Lake Tahoe", built structures for
//! "Golden Gate Bridge".

use super::types::Candidate;

/// Lexical cues for natural features. Lowercased substring match.
const NATURAL_TOKENS: &[&str] = &[
    "lake", "river", "canyon", "mount", "mt ", "peak", "forest", "park",
    "bay", "sea", "ocean", "island", "valley", "falls", "glacier",
    "spring", "springs", "desert", "dune", "beach", "cave", "volcano",
    "reef", "gorge",
];

/// OSM classes preferred when the landmark reads as a natural feature.
pub const NATURAL_CLASSES: &[&str] = &[
    "natural", "waterway", "landuse", "geological", "leisure", "boundary", "place",
];

/// OSM classes preferred when the landmark reads as man-made.
pub const MANMADE_CLASSES: &[&str] = &[
    "amenity", "tourism", "historic", "man_made", "building", "railway",
    "aeroway", "highway", "shop", "bridge",
];

/// True iff the name carries a natural-feature cue. Absent names never do.
/// Pure and total: no I/O, never errors.
pub fn is_natural_landmark(name: Option<&str>) -> bool {
    let n = match name {
        Some(n) => n.to_lowercase(),
        None => return false,
    };
    NATURAL_TOKENS.iter().any(|t| n.contains(t))
}

/// Pick the best candidate: the first (in oracle order) whose class is in
/// the active preference set, else the oracle's own top result.
///
/// `candidates` must be non-empty.
pub fn select_best(candidates: &[Candidate], prefer_natural: bool) -> &Candidate {
    let prefs = if prefer_natural { NATURAL_CLASSES } else { MANMADE_CLASSES };
    candidates
        .iter()
        .find(|c| c.class.as_deref().map_or(false, |cl| prefs.contains(&cl)))
        .unwrap_or(&candidates[0])
}
