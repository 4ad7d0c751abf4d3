//! Picks the filming locations worth showing a user.
//!
//! Two paths:
//! - USA: the user is in the USA, so only US locations that mention one of
//!   the user's 100 nearest cities are kept.
//! - Countries: locations that mention any name variant of the resolved
//!   nearby countries are kept.
//!
//! Every kept location is forward geocoded; failures drop the location.

use super::index::FilmLocationIndex;
use super::matcher::{first_match, LocationMatcher, SubstringMatcher};
use crate::error::FilmapError;
use crate::location::{
    CountryLookup, Coordinate, ForwardGeocoder, NearestCityResolver, NearestCountryResolver,
    ReverseGeocoder, USA_CODE,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A matched, geocoded filming location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredLocationRecord {
    pub location: String,
    pub coordinate: Coordinate,
    pub films: Vec<String>,
}

impl FilteredLocationRecord {
    /// Films joined with `/`, as stored in the intermediate table.
    pub fn films_joined(&self) -> String {
        self.films.join("/")
    }
}

/// What the engine decided to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterScope {
    /// User is in the USA; match against nearby city names.
    Usa { near_cities: Vec<String> },
    /// Match against name variants of the resolved countries.
    Countries { variants: Vec<String> },
}

pub struct LocationFilterEngine<'a> {
    countries: NearestCountryResolver<'a>,
    cities: NearestCityResolver<'a>,
    lookup: &'a dyn CountryLookup,
    matcher: Box<dyn LocationMatcher + 'a>,
}

impl<'a> LocationFilterEngine<'a> {
    pub fn new(
        countries: NearestCountryResolver<'a>,
        cities: NearestCityResolver<'a>,
        lookup: &'a dyn CountryLookup,
    ) -> Self {
        Self {
            countries,
            cities,
            lookup,
            matcher: Box::new(SubstringMatcher),
        }
    }

    pub fn with_matcher(mut self, matcher: impl LocationMatcher + 'a) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Decide between the USA path and the country path for `user`.
    pub fn scope(
        &self,
        user: Coordinate,
        reverse: &mut dyn ReverseGeocoder,
    ) -> Result<FilterScope, FilmapError> {
        let countries = self.countries.resolve(user, reverse)?;
        if countries.len() == 1 && countries[0] == USA_CODE {
            return Ok(FilterScope::Usa {
                near_cities: self.cities.resolve(user)?,
            });
        }

        let mut variants: Vec<String> = Vec::new();
        for name in &countries {
            let expanded = match self.lookup.lookup(name) {
                Ok(info) => info.variants(),
                Err(e) => {
                    debug!("no canonical entry for '{}' ({}), matching the raw name", name, e);
                    Vec::new()
                }
            };
            let expanded = if expanded.is_empty() {
                vec![name.clone()]
            } else {
                expanded
            };
            for v in expanded {
                if !v.trim().is_empty() && !variants.contains(&v) {
                    variants.push(v);
                }
            }
        }
        Ok(FilterScope::Countries { variants })
    }

    /// Filtered, geocoded locations for `year` around `user`, in the index's
    /// location order. Each location is emitted at most once.
    pub fn filter(
        &self,
        index: &FilmLocationIndex,
        year: &str,
        user: Coordinate,
        reverse: &mut dyn ReverseGeocoder,
        forward: &mut dyn ForwardGeocoder,
    ) -> Result<Vec<FilteredLocationRecord>, FilmapError> {
        // Checked before any network traffic.
        let locations = index.locations_for(year)?;

        let scope = self.scope(user, reverse)?;
        let (needles, require_usa) = match &scope {
            FilterScope::Usa { near_cities } => {
                info!("user is in the USA, matching {} nearby cities", near_cities.len());
                (near_cities.as_slice(), true)
            }
            FilterScope::Countries { variants } => {
                info!(variants = ?variants, "matching country name variants");
                (variants.as_slice(), false)
            }
        };

        let mut out = Vec::new();
        let mut geocode_failures = 0usize;
        for (location, films) in locations {
            if require_usa && !location.contains(USA_CODE) {
                continue;
            }
            let Some(place) = first_match(self.matcher.as_ref(), location, needles) else {
                continue;
            };
            match forward.geocode(location) {
                Ok(coordinate) => {
                    debug!(location = %location, matched = place, "kept location");
                    out.push(FilteredLocationRecord {
                        location: location.clone(),
                        coordinate,
                        films: collect_films(films),
                    });
                }
                Err(e) => {
                    geocode_failures += 1;
                    debug!(location = %location, "skipping, geocoding failed: {}", e);
                }
            }
        }

        info!(
            kept = out.len(),
            geocode_failures,
            year,
            "location filtering finished"
        );
        Ok(out)
    }
}

fn collect_films(films: &BTreeSet<String>) -> Vec<String> {
    films.iter().cloned().collect()
}
