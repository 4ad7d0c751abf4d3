//! HTML map output.
//!
//! The Leaflet page has one marker per ranked location (first 10 only), a
//! "You are here" marker, and optional layers for country borders (GeoJSON)
//! and world capitals. The page itself is the `movies_map.html` template.

use askama::Template;
use crate::error::FilmapError;
use crate::films::RankedFilmEntry;
use crate::location::Coordinate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Markers drawn on the map.
pub const MAP_MARKER_LIMIT: usize = 10;
pub const MAP_ZOOM: u8 = 10;

const LEAFLET_VERSION: &str = "1.9.4";

pub trait MapRenderer {
    /// Render `entries` for `year` around `user`; returns the written file.
    fn render(
        &self,
        entries: &[RankedFilmEntry],
        year: &str,
        user: Coordinate,
    ) -> Result<PathBuf, FilmapError>;
}

#[derive(Template)]
#[template(path = "movies_map.html")]
struct MoviesMapTemplate<'a> {
    year: &'a str,
    leaflet_version: &'a str,
    user_lat: f64,
    user_lon: f64,
    zoom: u8,
    marker_limit: usize,
    markers_json: String,
    has_borders: bool,
    borders_json: String,
    has_capitals: bool,
    capitals_json: String,
}

#[derive(Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    popup: String,
}

pub struct LeafletRenderer {
    out_dir: PathBuf,
    borders: Option<serde_json::Value>,
    capitals: Vec<Coordinate>,
}

impl LeafletRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            borders: None,
            capitals: Vec::new(),
        }
    }

    /// Add a "Borders" layer from a GeoJSON document.
    pub fn with_borders(mut self, geojson: serde_json::Value) -> Self {
        self.borders = Some(geojson);
        self
    }

    /// Add a "World capitals" layer of small circles.
    pub fn with_capitals(mut self, capitals: Vec<Coordinate>) -> Self {
        self.capitals = capitals;
        self
    }

    pub fn map_path(&self, year: &str) -> PathBuf {
        self.out_dir.join(format!("{}_movies_map.html", year))
    }

    /// The complete HTML page.
    pub fn page(
        &self,
        entries: &[RankedFilmEntry],
        year: &str,
        user: Coordinate,
    ) -> Result<String, FilmapError> {
        let markers: Vec<Marker> = entries
            .iter()
            .take(MAP_MARKER_LIMIT)
            .map(|e| Marker {
                lat: e.coordinate.lat,
                lon: e.coordinate.lon,
                popup: popup_text(&e.films),
            })
            .collect();
        let capitals: Vec<[f64; 2]> = self.capitals.iter().map(|c| [c.lat, c.lon]).collect();

        let template = MoviesMapTemplate {
            year,
            leaflet_version: LEAFLET_VERSION,
            user_lat: user.lat,
            user_lon: user.lon,
            zoom: MAP_ZOOM,
            marker_limit: MAP_MARKER_LIMIT,
            markers_json: script_json(&markers),
            has_borders: self.borders.is_some(),
            borders_json: self.borders.as_ref().map(script_json).unwrap_or_default(),
            has_capitals: !capitals.is_empty(),
            capitals_json: script_json(&capitals),
        };
        Ok(template.render()?)
    }
}

impl MapRenderer for LeafletRenderer {
    fn render(
        &self,
        entries: &[RankedFilmEntry],
        year: &str,
        user: Coordinate,
    ) -> Result<PathBuf, FilmapError> {
        fs::create_dir_all(&self.out_dir).map_err(|e| FilmapError::io(&self.out_dir, e))?;
        let path = self.map_path(year);
        let html = self.page(entries, year, user)?;
        fs::write(&path, html).map_err(|e| FilmapError::io(&path, e))?;
        info!(
            path = %path.display(),
            markers = entries.len().min(MAP_MARKER_LIMIT),
            "map written"
        );
        Ok(path)
    }
}

/// Popup for a marker: the `/`-joined film list shown comma-separated.
/// Leaflet inserts popup text as HTML, so it is escaped here.
pub fn popup_text(films: &str) -> String {
    let list: Vec<&str> = films.split('/').collect();
    html_escape(&format!("There're some movies, filmed here: {}", list.join(",")))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON for inlining into a `<script>` block.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// Read a GeoJSON document for the borders layer.
pub fn load_geojson(path: &Path) -> Result<serde_json::Value, FilmapError> {
    let data = fs::read_to_string(path).map_err(|e| FilmapError::io(path, e))?;
    serde_json::from_str(&data)
        .map_err(|e| FilmapError::InvalidInput(format!("{}: {}", path.display(), e)))
}
