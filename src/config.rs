//! Runtime settings for a filmap run.
//!
//! The binary fills this in from command-line flags and `FILMAP_*`
//! environment variables; library users can start from [`Config::default`].

use crate::location::GeocodeCache;
use crate::location::resolver::{DEFAULT_FALLBACK_COUNTRY, NEAR_CITY_LIMIT};
use crate::render::MAP_MARKER_LIMIT;
use std::path::{Path, PathBuf};

pub const DEFAULT_COUNTRIES_PATH: &str = "countries_coordinates.csv";
pub const DEFAULT_CITIES_PATH: &str = "city_coordinates.tsv";
pub const DEFAULT_FILMS_PATH: &str = "locations.csv";

#[derive(Debug, Clone)]
pub struct Config {
    /// Tab-separated country centroid table.
    pub countries_path: PathBuf,
    /// Tab-separated city coordinate table.
    pub cities_path: PathBuf,
    /// Comma-separated film record stream.
    pub films_path: PathBuf,
    /// Optional GeoJSON country borders layer.
    pub borders_path: Option<PathBuf>,
    /// Optional world capitals layer.
    pub capitals_path: Option<PathBuf>,
    /// Directory receiving the filtered table and the map.
    pub out_dir: PathBuf,
    /// Geocode cache file.
    pub cache_path: PathBuf,
    /// Never touch the network; answer from the cache only.
    pub offline: bool,
    /// Country assumed when the user's own country cannot be determined.
    pub fallback_country: String,
    /// Cities considered "near" on the USA path.
    pub near_city_limit: usize,
    /// Entries reported in the ranking summary.
    pub top: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_path: PathBuf::from(DEFAULT_COUNTRIES_PATH),
            cities_path: PathBuf::from(DEFAULT_CITIES_PATH),
            films_path: PathBuf::from(DEFAULT_FILMS_PATH),
            borders_path: None,
            capitals_path: None,
            out_dir: PathBuf::from("."),
            cache_path: GeocodeCache::default_path(),
            offline: false,
            fallback_country: DEFAULT_FALLBACK_COUNTRY.to_string(),
            near_city_limit: NEAR_CITY_LIMIT,
            top: MAP_MARKER_LIMIT,
        }
    }
}

impl Config {
    /// Where the filtered location table for `year` is written.
    pub fn table_path(&self, year: &str) -> PathBuf {
        self.out_dir.join(format!("{}_filtered_locations.csv", year))
    }

    pub fn with_out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = out_dir.as_ref().to_path_buf();
        self
    }
}
