//! Readers for the three input datasets.
//!
//! - Country centroids: tab-separated, header with `name`, `latitude`, `longitude`.
//! - Cities: tab-separated, header with `city_ascii`, `lat`, `lng`.
//! - Film locations: comma-separated `film,year,...,location`, no header.
//! - World capitals (optional map layer): comma-separated, header with
//!   `CapitalLatitude`, `CapitalLongitude`.
//!
//! Extra columns are ignored and rows that fail to parse are skipped.

use crate::error::FilmapError;
use crate::films::FilmLocationIndex;
use crate::location::{CityRecord, Coordinate, CountryRecord};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CountryRow {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    city_ascii: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CapitalRow {
    capital_latitude: f64,
    capital_longitude: f64,
}

pub fn read_countries<R: Read>(input: R) -> Result<Vec<CountryRecord>, FilmapError> {
    let mut rdr = tsv_reader(input);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CountryRow>().enumerate() {
        match row {
            Ok(row) if !row.name.is_empty() => {
                out.push(CountryRecord::new(row.name, row.latitude, row.longitude))
            }
            Ok(_) => debug!(row = i + 1, "skipping country row without a name"),
            Err(e) => debug!(row = i + 1, "skipping country row: {}", e),
        }
    }
    Ok(out)
}

pub fn read_cities<R: Read>(input: R) -> Result<Vec<CityRecord>, FilmapError> {
    let mut rdr = tsv_reader(input);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CityRow>().enumerate() {
        match row {
            Ok(row) if !row.city_ascii.is_empty() => {
                out.push(CityRecord::new(row.city_ascii, row.lat, row.lng))
            }
            Ok(_) => debug!(row = i + 1, "skipping city row without a name"),
            Err(e) => debug!(row = i + 1, "skipping city row: {}", e),
        }
    }
    Ok(out)
}

/// Capital coordinates; rows outside the valid range are dropped.
pub fn read_capitals<R: Read>(input: R) -> Result<Vec<Coordinate>, FilmapError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CapitalRow>().enumerate() {
        match row.map_err(FilmapError::from).and_then(|row| {
            Coordinate::new(row.capital_latitude, row.capital_longitude)
        }) {
            Ok(c) => out.push(c),
            Err(e) => debug!(row = i + 1, "skipping capital row: {}", e),
        }
    }
    Ok(out)
}

/// Build the film index from the raw record stream in one pass. Fields are
/// split on every comma; quotes are ordinary characters. Bytes that are not
/// valid UTF-8 are dropped from the field they appear in.
pub fn read_film_index<R: Read>(input: R) -> Result<FilmLocationIndex, FilmapError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(input);

    let mut unreadable = 0usize;
    let rows = rdr.byte_records().filter_map(|record| match record {
        Ok(record) => Some(record.iter().map(decode_lossy).collect::<Vec<String>>()),
        Err(e) => {
            unreadable += 1;
            debug!("skipping unreadable film row: {}", e);
            None
        }
    });
    let index = FilmLocationIndex::from_rows(rows);

    info!(
        locations = index.len(),
        skipped = index.skipped() + unreadable,
        "film index built"
    );
    Ok(index)
}

pub fn load_countries(path: &Path) -> Result<Vec<CountryRecord>, FilmapError> {
    let countries = read_countries(open(path)?)?;
    info!(path = %path.display(), count = countries.len(), "loaded country centroids");
    Ok(countries)
}

pub fn load_cities(path: &Path) -> Result<Vec<CityRecord>, FilmapError> {
    let cities = read_cities(open(path)?)?;
    info!(path = %path.display(), count = cities.len(), "loaded cities");
    Ok(cities)
}

pub fn load_capitals(path: &Path) -> Result<Vec<Coordinate>, FilmapError> {
    read_capitals(open(path)?)
}

pub fn load_film_index(path: &Path) -> Result<FilmLocationIndex, FilmapError> {
    read_film_index(open(path)?)
}

fn open(path: &Path) -> Result<File, FilmapError> {
    File::open(path).map_err(|e| FilmapError::io(path, e))
}

fn tsv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_countries() {
        let data = "country\tlatitude\tlongitude\tname\n\
                    UA\t48.379433\t31.16558\tUkraine\n\
                    PL\t51.919438\t19.145136\tPoland\n\
                    XX\t\t\tNowhere\n\
                    UM\tbad\t1.0\tMinor Islands\n";
        let countries = read_countries(data.as_bytes()).unwrap();
        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ukraine", "Poland"]);
        assert_eq!(countries[0].centroid.lat, 48.379433);
        assert_eq!(countries[0].centroid.lon, 31.16558);
    }

    #[test]
    fn test_read_cities() {
        let data = "city\tcity_ascii\tlat\tlng\tcountry\n\
                    Lawrence\tLawrence\t38.9597\t-95.2641\tUnited States\n\
                    Eudora\tEudora\t38.9345\t-95.0957\tUnited States\n\
                    Broken\tBroken\tx\ty\tNowhere\n";
        let cities = read_cities(data.as_bytes()).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].name, "Eudora");
        assert_eq!(cities[1].coordinate.lon, -95.0957);
    }

    #[test]
    fn test_read_film_index() {
        let data = "Film A,2020,Lviv Ukraine\n\
                    Film B,2020,{Episode},(studio),Kyiv Ukraine\n\
                    Film C, 2019 ,Warsaw Poland\n\
                    broken row\n";
        let index = read_film_index(data.as_bytes()).unwrap();
        let y2020 = index.locations_for("2020").unwrap();
        assert!(y2020.contains_key("Lviv Ukraine"));
        assert!(y2020["Kyiv Ukraine"].contains("Film B"));
        assert!(index.contains_year("2019"));
        assert_eq!(index.skipped(), 1);
    }

    #[test]
    fn test_film_index_unbalanced_quote_keeps_later_rows() {
        let data = "\"Broken Title (2001),2001,Lviv Ukraine\n\
                    FilmB,2001,Kyiv Ukraine\n\
                    FilmC,2001,Odesa Ukraine\n";
        let index = read_film_index(data.as_bytes()).unwrap();
        let y2001 = index.locations_for("2001").unwrap();
        assert_eq!(y2001.len(), 3);
        assert!(y2001["Lviv Ukraine"].contains("\"Broken Title (2001)"));
        assert!(y2001["Odesa Ukraine"].contains("FilmC"));
        assert_eq!(index.skipped(), 0);
    }

    #[test]
    fn test_film_index_keeps_quoted_titles_verbatim() {
        let data = "\"#1 Single\" (2006),2006,Los Angeles, California, USA\n";
        let index = read_film_index(data.as_bytes()).unwrap();
        let y2006 = index.locations_for("2006").unwrap();
        assert!(y2006["USA"].contains("\"#1 Single\" (2006)"));
    }

    #[test]
    fn test_film_index_drops_invalid_utf8() {
        let mut data = b"Caf".to_vec();
        data.push(0xE9);
        data.extend_from_slice(b" Film,2020,L\xFFviv Ukraine\n");
        let index = read_film_index(data.as_slice()).unwrap();
        let y2020 = index.locations_for("2020").unwrap();
        assert!(y2020["Lviv Ukraine"].contains("Caf Film"));
    }

    #[test]
    fn test_read_capitals() {
        let data = "CountryName,CapitalName,CapitalLatitude,CapitalLongitude,CountryCode\n\
                    Ukraine,Kyiv,50.45,30.516667,UA\n\
                    Nowhere,None,,,XX\n\
                    Poland,Warsaw,52.25,21.0,PL\n";
        let capitals = read_capitals(data.as_bytes()).unwrap();
        assert_eq!(capitals.len(), 2);
        assert_eq!(capitals[1], Coordinate::new(52.25, 21.0).unwrap());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.tsv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "name\tlatitude\tlongitude").unwrap();
        writeln!(f, "Ukraine\t48.379433\t31.16558").unwrap();
        drop(f);

        assert_eq!(load_countries(&path).unwrap().len(), 1);
        let err = load_cities(&dir.path().join("missing.tsv")).unwrap_err();
        assert!(matches!(err, FilmapError::Io { .. }));
    }
}
