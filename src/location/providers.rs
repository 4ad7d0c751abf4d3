//! Geocoding providers: OpenStreetMap Nominatim (forward + reverse).

use super::types::Coordinate;
use crate::error::ServiceError;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Turns a free-text filming location into a coordinate.
pub trait ForwardGeocoder {
    fn geocode(&mut self, location: &str) -> Result<Coordinate, ServiceError>;
}

/// Turns a coordinate into the English name of the country it lies in.
pub trait ReverseGeocoder {
    fn reverse(&mut self, coord: Coordinate) -> Result<String, ServiceError>;
}

/// A reverse geocoder that always fails; used in offline mode so the
/// resolver falls back to its configured default country.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReverseGeocoder;

impl ReverseGeocoder for NoReverseGeocoder {
    fn reverse(&mut self, coord: Coordinate) -> Result<String, ServiceError> {
        Err(ServiceError::Offline(coord.to_string()))
    }
}

// ─── Nominatim provider ─────────────────────────────────────────

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("filmap/", env!("CARGO_PKG_VERSION"), " (film-location-map)");

/// Nominatim usage policy: at most one request per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize, Debug, Clone)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct ReverseAddress {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct ReverseResult {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

/// Blocking Nominatim client with built-in request throttling.
pub struct NominatimClient {
    base_url: String,
    last_request: Option<Instant>,
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimClient {
    pub fn new() -> Self {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Point the client at a self-hosted Nominatim instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            last_request: None,
        }
    }

    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                std::thread::sleep(MIN_REQUEST_INTERVAL - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn get(&mut self, path: &str, params: &[(&str, &str)]) -> Result<ureq::Response, ServiceError> {
        self.throttle();
        let url = format!("{}/{}", self.base_url, path);
        let mut request = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        for (k, v) in params {
            request = request.query(k, v);
        }
        request
            .call()
            .map_err(|e| ServiceError::Network(e.to_string()))
    }
}

impl ForwardGeocoder for NominatimClient {
    fn geocode(&mut self, location: &str) -> Result<Coordinate, ServiceError> {
        let query = location.trim();
        if query.is_empty() {
            return Err(ServiceError::NotFound(String::new()));
        }

        let response = self.get("search", &[("q", query), ("format", "json"), ("limit", "1")])?;
        let results: Vec<SearchResult> = response
            .into_json()
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        let top = results
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(query.to_string()))?;
        debug!(location = query, display_name = ?top.display_name, "nominatim search hit");

        parse_coordinate(&top.lat, &top.lon)
    }
}

impl ReverseGeocoder for NominatimClient {
    fn reverse(&mut self, coord: Coordinate) -> Result<String, ServiceError> {
        let lat = coord.lat.to_string();
        let lon = coord.lon.to_string();
        let response = self.get(
            "reverse",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "jsonv2"),
                ("accept-language", "en"),
                ("zoom", "3"),
            ],
        )?;
        let result: ReverseResult = response
            .into_json()
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        country_from_reverse(result).ok_or_else(|| ServiceError::NotFound(coord.to_string()))
    }
}

fn parse_coordinate(lat: &str, lon: &str) -> Result<Coordinate, ServiceError> {
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| ServiceError::InvalidResponse(format!("bad latitude '{}'", lat)))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| ServiceError::InvalidResponse(format!("bad longitude '{}'", lon)))?;
    Coordinate::new(lat, lon).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

/// Prefer the structured `address.country`; otherwise the last component of
/// the display name, which Nominatim always ends with the country.
fn country_from_reverse(result: ReverseResult) -> Option<String> {
    if result.error.is_some() {
        return None;
    }
    let structured = result
        .address
        .and_then(|a| a.country)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    structured.or_else(|| {
        result
            .display_name
            .as_deref()
            .and_then(|d| d.split(',').next_back())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    })
}
