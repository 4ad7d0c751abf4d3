//! End-to-end run: index → filter → table → rank → map.

use crate::config::Config;
use crate::error::FilmapError;
use crate::films::{
    canonical_year, table, FilmLocationIndex, FilmProximityRanker, LocationFilterEngine,
    RankedFilmEntry,
};
use crate::loader;
use crate::location::{
    CityRecord, Coordinate, CountryLookup, CountryRecord, ForwardGeocoder, NearestCityResolver,
    NearestCountryResolver, ReverseGeocoder,
};
use crate::render::MapRenderer;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Country and city tables, loaded once and shared read-only by every run.
#[derive(Debug, Clone)]
pub struct GeoContext {
    pub countries: Vec<CountryRecord>,
    pub cities: Vec<CityRecord>,
}

impl GeoContext {
    pub fn new(
        countries: Vec<CountryRecord>,
        cities: Vec<CityRecord>,
    ) -> Result<Self, FilmapError> {
        if countries.is_empty() {
            return Err(FilmapError::EmptyDataset("country table".into()));
        }
        Ok(Self { countries, cities })
    }

    pub fn load(config: &Config) -> Result<Self, FilmapError> {
        let countries = loader::load_countries(&config.countries_path)?;
        let cities = loader::load_cities(&config.cities_path)?;
        Self::new(countries, cities)
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub year: String,
    pub user: Coordinate,
    pub table_path: PathBuf,
    pub map_path: PathBuf,
    pub ranked: Vec<RankedFilmEntry>,
}

pub struct Pipeline<'a> {
    context: &'a GeoContext,
    config: &'a Config,
    lookup: &'a dyn CountryLookup,
    reverse: &'a mut dyn ReverseGeocoder,
    forward: &'a mut dyn ForwardGeocoder,
    renderer: &'a dyn MapRenderer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        context: &'a GeoContext,
        config: &'a Config,
        lookup: &'a dyn CountryLookup,
        reverse: &'a mut dyn ReverseGeocoder,
        forward: &'a mut dyn ForwardGeocoder,
        renderer: &'a dyn MapRenderer,
    ) -> Self {
        Self {
            context,
            config,
            lookup,
            reverse,
            forward,
            renderer,
        }
    }

    /// Load the film stream from the configured path and run.
    pub fn run(&mut self, year: &str, user: Coordinate) -> Result<RunReport, FilmapError> {
        let index = loader::load_film_index(&self.config.films_path)?;
        self.run_with_index(&index, year, user)
    }

    pub fn run_with_index(
        &mut self,
        index: &FilmLocationIndex,
        year: &str,
        user: Coordinate,
    ) -> Result<RunReport, FilmapError> {
        let started = Instant::now();
        user.validate()?;
        let year = canonical_year(year);

        let engine = LocationFilterEngine::new(
            NearestCountryResolver::new(&self.context.countries, self.lookup)
                .with_fallback_country(self.config.fallback_country.clone()),
            NearestCityResolver::new(&self.context.cities)
                .with_limit(self.config.near_city_limit),
            self.lookup,
        );
        let filtered =
            engine.filter(index, &year, user, &mut *self.reverse, &mut *self.forward)?;

        let table_path = self.config.table_path(&year);
        table::write_file(&table_path, &filtered)?;
        info!(path = %table_path.display(), rows = filtered.len(), "filtered table written");

        let records = table::read_file(&table_path)?;
        let ranked = FilmProximityRanker::rank(&records, user)?;

        let map_path = self.renderer.render(&ranked, &year, user)?;
        info!(
            year = %year,
            ranked = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run finished"
        );

        Ok(RunReport {
            year,
            user,
            table_path,
            map_path,
            ranked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::films::FilmRecord;
    use crate::location::BuiltinCountries;
    use crate::render::LeafletRenderer;
    use std::fs;

    struct FixedReverse(&'static str);

    impl ReverseGeocoder for FixedReverse {
        fn reverse(&mut self, _: Coordinate) -> Result<String, ServiceError> {
            Ok(self.0.to_string())
        }
    }

    struct FixedForward(Vec<(&'static str, f64, f64)>);

    impl ForwardGeocoder for FixedForward {
        fn geocode(&mut self, location: &str) -> Result<Coordinate, ServiceError> {
            self.0
                .iter()
                .find(|(name, _, _)| *name == location)
                .map(|(_, lat, lon)| Coordinate { lat: *lat, lon: *lon })
                .ok_or_else(|| ServiceError::NotFound(location.to_string()))
        }
    }

    fn rec(film: &str, year: &str, location: &str) -> FilmRecord {
        FilmRecord {
            film: film.into(),
            year: year.into(),
            location: location.into(),
        }
    }

    fn context() -> GeoContext {
        GeoContext::new(
            vec![
                CountryRecord::new("Ukraine", 48.3794, 31.1656),
                CountryRecord::new("Poland", 51.9194, 19.1451),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_run_writes_table_and_map() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_out_dir(dir.path());
        let context = context();
        let index = FilmLocationIndex::build(vec![
            rec("FilmA", "2020", "Lviv Ukraine"),
            rec("FilmB", "2020", "Kyiv Ukraine"),
            rec("FilmC", "2020", "Paris France"),
        ]);
        let mut reverse = FixedReverse("Ukraine");
        let mut forward = FixedForward(vec![
            ("Lviv Ukraine", 49.8397, 24.0297),
            ("Kyiv Ukraine", 50.4501, 30.5234),
        ]);
        let renderer = LeafletRenderer::new(dir.path());

        let report = Pipeline::new(
            &context,
            &config,
            &BuiltinCountries,
            &mut reverse,
            &mut forward,
            &renderer,
        )
        .run_with_index(&index, "2020", Coordinate::new(50.4, 30.5).unwrap())
        .unwrap();

        assert_eq!(report.year, "2020");
        let films: Vec<&str> = report.ranked.iter().map(|e| e.films.as_str()).collect();
        assert_eq!(films, vec!["FilmB", "FilmA"]);
        assert!(report.table_path.exists());
        assert_eq!(report.map_path, dir.path().join("2020_movies_map.html"));
        let table = fs::read_to_string(&report.table_path).unwrap();
        assert!(table.starts_with("location;\tlatitude;\tlongitude;\tfilms\n"));
    }

    #[test]
    fn test_missing_year_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_out_dir(dir.path());
        let context = context();
        let index = FilmLocationIndex::build(vec![rec("FilmA", "2020", "Lviv Ukraine")]);
        let mut reverse = FixedReverse("Ukraine");
        let mut forward = FixedForward(vec![]);
        let renderer = LeafletRenderer::new(dir.path());

        let err = Pipeline::new(
            &context,
            &config,
            &BuiltinCountries,
            &mut reverse,
            &mut forward,
            &renderer,
        )
        .run_with_index(&index, "1901", Coordinate::new(49.8, 24.0).unwrap())
        .unwrap_err();

        assert!(matches!(err, FilmapError::NoDataForYear(_)));
        assert!(!config.table_path("1901").exists());
    }

    #[test]
    fn test_invalid_user_coordinate() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_out_dir(dir.path());
        let context = context();
        let index = FilmLocationIndex::default();
        let mut reverse = FixedReverse("Ukraine");
        let mut forward = FixedForward(vec![]);
        let renderer = LeafletRenderer::new(dir.path());

        let err = Pipeline::new(
            &context,
            &config,
            &BuiltinCountries,
            &mut reverse,
            &mut forward,
            &renderer,
        )
        .run_with_index(&index, "2020", Coordinate { lat: 91.0, lon: 0.0 })
        .unwrap_err();
        assert!(matches!(err, FilmapError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_empty_country_table_rejected() {
        let err = GeoContext::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, FilmapError::EmptyDataset(_)));
    }

    #[test]
    fn test_run_loads_film_file() {
        let dir = tempfile::tempdir().unwrap();
        let films = dir.path().join("locations.csv");
        fs::write(&films, "FilmA,2020,Lviv Ukraine\n").unwrap();
        let config = Config {
            films_path: films,
            ..Config::default().with_out_dir(dir.path())
        };
        let context = context();
        let mut reverse = FixedReverse("Ukraine");
        let mut forward = FixedForward(vec![("Lviv Ukraine", 49.8397, 24.0297)]);
        let renderer = LeafletRenderer::new(dir.path());

        let report = Pipeline::new(
            &context,
            &config,
            &BuiltinCountries,
            &mut reverse,
            &mut forward,
            &renderer,
        )
        .run("2020", Coordinate::new(49.84, 24.03).unwrap())
        .unwrap();
        assert_eq!(report.ranked.len(), 1);
        assert_eq!(report.ranked[0].films, "FilmA");
    }
}
