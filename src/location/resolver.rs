//! Nearest-country and nearest-city resolution.
//!
//! Country flow: two nearest centroids → + user's actual country (reverse
//! geocode, else fallback) → USA dominance rule.
//! City flow: the closest `limit` cities, ascending.

use super::countries::CountryLookup;
use super::providers::ReverseGeocoder;
use super::types::{CityRecord, Coordinate, CountryRecord};
use crate::distance::distance;
use crate::error::FilmapError;
use tracing::{debug, warn};

/// Alpha-3 code of the country whose filming density swamps every other.
pub const USA_CODE: &str = "USA";

pub const DEFAULT_FALLBACK_COUNTRY: &str = "Ukraine";
pub const NEAREST_COUNTRY_COUNT: usize = 2;
pub const NEAR_CITY_LIMIT: usize = 100;

/// Resolves which countries' filming locations a user should see.
pub struct NearestCountryResolver<'a> {
    countries: &'a [CountryRecord],
    lookup: &'a dyn CountryLookup,
    fallback_country: String,
}

impl<'a> NearestCountryResolver<'a> {
    pub fn new(countries: &'a [CountryRecord], lookup: &'a dyn CountryLookup) -> Self {
        Self {
            countries,
            lookup,
            fallback_country: DEFAULT_FALLBACK_COUNTRY.to_string(),
        }
    }

    /// Country assumed for the user when reverse geocoding fails.
    pub fn with_fallback_country(mut self, country: impl Into<String>) -> Self {
        self.fallback_country = country.into();
        self
    }

    pub fn fallback_country(&self) -> &str {
        &self.fallback_country
    }

    /// The first `n` distinct country names ordered by centroid distance.
    pub fn nearest(&self, user: Coordinate, n: usize) -> Result<Vec<String>, FilmapError> {
        user.validate()?;
        if self.countries.is_empty() {
            return Err(FilmapError::EmptyDataset("country table".into()));
        }

        let ranked = rank_by_distance(user, self.countries, |c| c.centroid);
        let mut nearest: Vec<String> = Vec::with_capacity(n);
        for (country, _) in ranked {
            if nearest.len() == n {
                break;
            }
            if !nearest.contains(&country.name) {
                nearest.push(country.name.clone());
            }
        }
        Ok(nearest)
    }

    /// Returns 1–3 country names: `["USA"]` for users in the USA, otherwise
    /// the nearest countries plus the user's own, with the USA removed.
    pub fn resolve(
        &self,
        user: Coordinate,
        reverse: &mut dyn ReverseGeocoder,
    ) -> Result<Vec<String>, FilmapError> {
        user.validate()?;
        let mut candidates = self.nearest(user, NEAREST_COUNTRY_COUNT)?;

        let actual = match reverse.reverse(user) {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    "reverse geocoding {} failed ({}); assuming {}",
                    user, e, self.fallback_country
                );
                self.fallback_country.clone()
            }
        };
        if !candidates.contains(&actual) {
            candidates.push(actual.clone());
        }

        let actual_code = self.code_of(&actual);
        if actual_code.as_deref() == Some(USA_CODE) {
            debug!("user is in the USA, ignoring neighbouring countries");
            return Ok(vec![USA_CODE.to_string()]);
        }

        let resolved: Vec<String> = candidates
            .into_iter()
            .filter(|name| match self.code_of(name) {
                Some(code) => code != USA_CODE,
                None => false,
            })
            .collect();

        if resolved.is_empty() {
            return Err(FilmapError::UnresolvableCountry);
        }
        debug!(countries = ?resolved, "resolved candidate countries");
        Ok(resolved)
    }

    fn code_of(&self, name: &str) -> Option<String> {
        match self.lookup.lookup(name) {
            Ok(info) => Some(info.alpha_3),
            Err(e) => {
                debug!("country lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }
}

/// Resolves the cities closest to a user.
pub struct NearestCityResolver<'a> {
    cities: &'a [CityRecord],
    limit: usize,
}

impl<'a> NearestCityResolver<'a> {
    pub fn new(cities: &'a [CityRecord]) -> Self {
        Self {
            cities,
            limit: NEAR_CITY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Up to `limit` city names, closest first. Ties keep table order.
    pub fn resolve(&self, user: Coordinate) -> Result<Vec<String>, FilmapError> {
        user.validate()?;
        Ok(rank_by_distance(user, self.cities, |c| c.coordinate)
            .into_iter()
            .take(self.limit)
            .map(|(city, _)| city.name.clone())
            .collect())
    }
}

/// Rows paired with their distance to `user`, ascending, stable. `user` must
/// already be valid; rows whose distance cannot be computed are dropped.
fn rank_by_distance<T>(
    user: Coordinate,
    rows: &[T],
    coord: impl Fn(&T) -> Coordinate,
) -> Vec<(&T, f64)> {
    let mut ranked: Vec<(&T, f64)> = rows
        .iter()
        .filter_map(|row| match distance(coord(row), user) {
            Ok(d) => Some((row, d)),
            Err(e) => {
                debug!("skipping row: {}", e);
                None
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}
