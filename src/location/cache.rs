//! File-based forward-geocoding cache at ~/.filmap/geocode_cache.json.
//!
//! TTL: 30 days. Case-insensitive, whitespace-trimmed keys.
//! Only successful lookups are stored.

use super::providers::ForwardGeocoder;
use super::types::Coordinate;
use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000; // 30 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    timestamp: i64,
}

/// The geocode cache.
pub struct GeocodeCache {
    path: Option<PathBuf>,
    entries: HashMap<String, CacheEntry>,
    dirty: bool,
}

impl GeocodeCache {
    /// Load cache from the default location (~/.filmap/geocode_cache.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load cache from a specific path. A missing or unreadable file yields
    /// an empty cache.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    /// A cache that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: HashMap::new(),
            dirty: false,
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".filmap")
            .join("geocode_cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    fn key(location: &str) -> String {
        location.trim().to_lowercase()
    }

    /// Look up a location. Returns None if missing or expired.
    pub fn get(&self, location: &str) -> Option<Coordinate> {
        let entry = self.entries.get(&Self::key(location))?;

        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None; // expired
        }

        Coordinate::new(entry.lat, entry.lon).ok()
    }

    pub fn put(&mut self, location: &str, coord: Coordinate) {
        let entry = CacheEntry {
            lat: coord.lat,
            lon: coord.lon,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.insert(Self::key(location), entry);
        self.dirty = true;
    }

    /// Write the cache to disk if anything changed since the last save.
    pub fn save(&mut self) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json)?;
        self.dirty = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for GeocodeCache {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!("could not persist geocode cache: {}", e);
        }
    }
}

/// Forward geocoder that answers from the cache first and only falls back
/// to the wrapped provider on a miss. With no provider (offline mode) a miss
/// is a [`ServiceError::Offline`].
pub struct CachedGeocoder<G> {
    cache: GeocodeCache,
    inner: Option<G>,
}

impl<G: ForwardGeocoder> CachedGeocoder<G> {
    pub fn new(cache: GeocodeCache, inner: G) -> Self {
        Self {
            cache,
            inner: Some(inner),
        }
    }

    pub fn offline(cache: GeocodeCache) -> Self {
        Self { cache, inner: None }
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    pub fn save(&mut self) -> std::io::Result<()> {
        self.cache.save()
    }
}

impl<G: ForwardGeocoder> ForwardGeocoder for CachedGeocoder<G> {
    fn geocode(&mut self, location: &str) -> Result<Coordinate, ServiceError> {
        if let Some(coord) = self.cache.get(location) {
            debug!(location, "geocode cache hit");
            return Ok(coord);
        }
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| ServiceError::Offline(location.to_string()))?;
        let coord = inner.geocode(location)?;
        self.cache.put(location, coord);
        Ok(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (GeocodeCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        (GeocodeCache::load_from(path), dir)
    }

    struct CountingGeocoder {
        calls: usize,
    }

    impl ForwardGeocoder for CountingGeocoder {
        fn geocode(&mut self, location: &str) -> Result<Coordinate, ServiceError> {
            self.calls += 1;
            if location.contains("Nowhere") {
                return Err(ServiceError::NotFound(location.to_string()));
            }
            Ok(Coordinate::new(49.84, 24.03).unwrap())
        }
    }

    #[test]
    fn test_cache_put_get() {
        let (mut cache, _dir) = test_cache();
        cache.put("Arena Lviv, Lviv, Ukraine", Coordinate::new(49.8055, 23.9736).unwrap());

        let c = cache.get("Arena Lviv, Lviv, Ukraine").unwrap();
        assert!((c.lat - 49.8055).abs() < 1e-9);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_case_insensitive() {
        let (mut cache, _dir) = test_cache();
        cache.put("New York City, New York, USA", Coordinate::new(40.71, -74.0).unwrap());
        assert!(cache.get("NEW YORK CITY, NEW YORK, USA").is_some());
        assert!(cache.get("  new york city, new york, usa ").is_some());
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get("nonexistent").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("geocode_cache.json");

        {
            let mut cache = GeocodeCache::load_from(path.clone());
            cache.put("Tokyo, Japan", Coordinate::new(35.6762, 139.6503).unwrap());
            cache.save().unwrap();
        }

        let cache2 = GeocodeCache::load_from(path);
        assert!(cache2.get("tokyo, japan").is_some());
    }

    #[test]
    fn test_cache_persisted_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        {
            let mut cache = GeocodeCache::load_from(path.clone());
            cache.put("Kyiv, Ukraine", Coordinate::new(50.45, 30.52).unwrap());
        }
        assert!(GeocodeCache::load_from(path).get("kyiv, ukraine").is_some());
    }

    #[test]
    fn test_cache_expired_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        fs::write(
            &path,
            r#"{"old place": {"lat": 1.0, "lon": 2.0, "timestamp": 0}}"#,
        )
        .unwrap();

        let cache = GeocodeCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("old place").is_none());
    }

    #[test]
    fn test_cache_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocode_cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(GeocodeCache::load_from(path).is_empty());
    }

    #[test]
    fn test_cached_geocoder_hits_provider_once() {
        let mut g = CachedGeocoder::new(GeocodeCache::in_memory(), CountingGeocoder { calls: 0 });
        g.geocode("Lviv, Ukraine").unwrap();
        g.geocode("lviv, ukraine").unwrap();
        assert_eq!(g.inner.as_ref().unwrap().calls, 1);
        assert_eq!(g.cache().len(), 1);
    }

    #[test]
    fn test_cached_geocoder_does_not_cache_failures() {
        let mut g = CachedGeocoder::new(GeocodeCache::in_memory(), CountingGeocoder { calls: 0 });
        assert!(g.geocode("Nowhere Land").is_err());
        assert!(g.geocode("Nowhere Land").is_err());
        assert_eq!(g.inner.as_ref().unwrap().calls, 2);
        assert!(g.cache().is_empty());
    }

    #[test]
    fn test_offline_geocoder_cache_only() {
        let mut cache = GeocodeCache::in_memory();
        cache.put("Lviv, Ukraine", Coordinate::new(49.84, 24.03).unwrap());
        let mut g: CachedGeocoder<CountingGeocoder> = CachedGeocoder::offline(cache);
        assert!(g.geocode("Lviv, Ukraine").is_ok());
        assert!(matches!(
            g.geocode("Odesa, Ukraine"),
            Err(ServiceError::Offline(_))
        ));
    }
}
