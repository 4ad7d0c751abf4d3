//! Core types for the location subsystem.

use crate::error::FilmapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN, infinities and out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, FilmapError> {
        let c = Self { lat, lon };
        c.validate()?;
        Ok(c)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn validate(&self) -> Result<(), FilmapError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(FilmapError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}°{}, {:.4}°{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// Parses `"lat,lon"` as typed by a user, e.g. `"49.84, 24.03"`.
impl FromStr for Coordinate {
    type Err = FilmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(FilmapError::InvalidInput(format!(
                "expected 'lat, long', got '{}'",
                s.trim()
            )));
        }
        let lat: f64 = parts[0]
            .parse()
            .map_err(|_| FilmapError::InvalidInput(format!("bad latitude '{}'", parts[0])))?;
        let lon: f64 = parts[1]
            .parse()
            .map_err(|_| FilmapError::InvalidInput(format!("bad longitude '{}'", parts[1])))?;
        Coordinate::new(lat, lon)
    }
}

/// One row of the country centroid table.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub name: String,
    pub centroid: Coordinate,
}

impl CountryRecord {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            centroid: Coordinate { lat, lon },
        }
    }
}

/// One row of the city coordinate table.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub name: String,
    pub coordinate: Coordinate,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            coordinate: Coordinate { lat, lon },
        }
    }
}

/// Canonical country entry returned by a [`CountryLookup`](super::CountryLookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    /// Formal name, e.g. "Republic of Poland". Not every country has one.
    pub official_name: Option<String>,
    /// Common short name, e.g. "Poland".
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub alpha_2: String,
    /// ISO 3166-1 alpha-3 code.
    pub alpha_3: String,
}

impl CountryInfo {
    /// Name variants used to recognise the country inside a free-text location:
    /// official name (if any), common name, alpha-3 code. Empty strings are dropped.
    pub fn variants(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(3);
        if let Some(official) = &self.official_name {
            out.push(official.clone());
        }
        out.push(self.name.clone());
        out.push(self.alpha_3.clone());
        out.retain(|v| !v.trim().is_empty());
        out
    }
}
