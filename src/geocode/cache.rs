//! File-based oracle response cache at ~/.atlas/geocode_cache.json.
//!
//! TTL: 7 days. Keyed by full request URL. Best-effort persistence:
//! a missing or corrupt cache file starts empty.

use super::types::Candidate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const CACHE_TTL_MS: i64 = 7 * 24 * 3600 * 1000; // 7 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    timestamp: i64,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// The response cache.
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    /// Load the cache from the default location (~/.atlas/geocode_cache.json).
    pub fn load() -> Self {
        let path = Self::default_path();
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// Load the cache from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".atlas")
            .join("geocode_cache.json")
    }

    fn read_file(path: &PathBuf) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Look up a request URL. Returns None if missing or expired.
    pub fn get(&self, url: &str) -> Option<Vec<Candidate>> {
        let entry = self.entries.get(url)?;

        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None; // expired
        }

        Some(entry.candidates.clone())
    }

    /// Store the oracle's answer for a request URL and persist to disk.
    /// Empty answers are cached too: "nothing found" is a valid result.
    pub fn put(&mut self, url: &str, candidates: &[Candidate]) {
        let entry = CacheEntry {
            timestamp: chrono::Utc::now().timestamp_millis(),
            candidates: candidates.to_vec(),
        };
        self.entries.insert(url.to_string(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(&self.entries) {
            let _ = fs::write(&self.path, json);
        }
    }

    /// Number of entries (for testing).
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (ResponseCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        (ResponseCache::load_from(path), dir)
    }

    fn cand(name: &str) -> Candidate {
        Candidate {
            display_name: name.into(),
            lat: 48.8566,
            lon: 2.3522,
            osm_id: Some(7444),
            class: Some("place".into()),
            kind: Some("city".into()),
            importance: Some(0.96),
        }
    }

    #[test]
    fn test_put_get() {
        let (mut cache, _dir) = test_cache();
        cache.put("https://example/search?q=paris", &[cand("Paris, France")]);

        let hit = cache.get("https://example/search?q=paris").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].display_name, "Paris, France");
    }

    #[test]
    fn test_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get("https://example/search?q=nowhere").is_none());
    }

    #[test]
    fn test_empty_answer_is_cached() {
        let (mut cache, _dir) = test_cache();
        cache.put("https://example/search?q=xyzzy", &[]);
        let hit = cache.get("https://example/search?q=xyzzy");
        assert_eq!(hit, Some(vec![]));
    }

    #[test]
    fn test_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");

        {
            let mut cache = ResponseCache::load_from(path.clone());
            cache.put("url-a", &[cand("Tokyo, Japan")]);
        }

        let cache2 = ResponseCache::load_from(path);
        let hit = cache2.get("url-a").unwrap();
        assert_eq!(hit[0].display_name, "Tokyo, Japan");
    }

    #[test]
    fn test_expired_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        let stale = r#"{
            "url-old": {
                "timestamp": 1,
                "candidates": []
            }
        }"#;
        fs::write(&path, stale).unwrap();

        let cache = ResponseCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("url-old").is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = ResponseCache::load_from(path);
        assert_eq!(cache.len(), 0);
    }
}
