//! Year → location → films index built from the flat film record stream.

use crate::error::FilmapError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One `film, year, ..., location` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmRecord {
    pub film: String,
    pub year: String,
    pub location: String,
}

impl FilmRecord {
    /// Build a record from the split fields of one input row. The location is
    /// the last field; anything between year and location is ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, FilmapError> {
        if fields.len() < 3 {
            return Err(FilmapError::MalformedRecord(format!(
                "expected at least 3 fields, got {}",
                fields.len()
            )));
        }
        let film = fields[0].as_ref().trim();
        let year = canonical_year(fields[1].as_ref());
        let location = fields[fields.len() - 1].as_ref().trim();

        if film.is_empty() || year.is_empty() || location.is_empty() {
            return Err(FilmapError::MalformedRecord(format!(
                "empty field in '{}'",
                fields
                    .iter()
                    .map(|f| f.as_ref())
                    .collect::<Vec<_>>()
                    .join(",")
            )));
        }

        Ok(Self {
            film: film.to_string(),
            year,
            location: location.to_string(),
        })
    }
}

/// Canonical year key: trimmed, unquoted, and for integral years the plain
/// decimal form (`" 2020"` and `"02020"` both become `"2020"`).
pub fn canonical_year(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"').trim();
    match trimmed.parse::<i64>() {
        Ok(year) => year.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

type LocationMap = BTreeMap<String, BTreeSet<String>>;

/// Immutable year → location → set-of-films mapping.
///
/// Ordered maps keep every iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct FilmLocationIndex {
    years: BTreeMap<String, LocationMap>,
    skipped: usize,
}

impl FilmLocationIndex {
    /// Single-pass build from well-formed records.
    pub fn build(records: impl IntoIterator<Item = FilmRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Single-pass build from raw split rows. Malformed rows are skipped and
    /// counted in [`skipped`](Self::skipped).
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for row in rows {
            match FilmRecord::from_fields(row.as_ref()) {
                Ok(record) => index.insert(record),
                Err(e) => {
                    debug!("skipping film row: {}", e);
                    index.skipped += 1;
                }
            }
        }
        index
    }

    fn insert(&mut self, record: FilmRecord) {
        self.years
            .entry(record.year)
            .or_default()
            .entry(record.location)
            .or_default()
            .insert(record.film);
    }

    /// All locations (with their films) recorded for `year`.
    pub fn locations_for(&self, year: &str) -> Result<&LocationMap, FilmapError> {
        let key = canonical_year(year);
        self.years
            .get(&key)
            .ok_or(FilmapError::NoDataForYear(key))
    }

    pub fn contains_year(&self, year: &str) -> bool {
        self.years.contains_key(&canonical_year(year))
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }

    /// Number of distinct (year, location) pairs.
    pub fn len(&self) -> usize {
        self.years.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Rows rejected while building from raw input.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(film: &str, year: &str, location: &str) -> FilmRecord {
        FilmRecord {
            film: film.into(),
            year: year.into(),
            location: location.into(),
        }
    }

    #[test]
    fn test_build_groups_by_year_and_location() {
        let index = FilmLocationIndex::build(vec![
            rec("FilmA", "2020", "Lviv Ukraine"),
            rec("FilmB", "2020", "Lviv Ukraine"),
            rec("FilmC", "2020", "Kyiv Ukraine"),
            rec("FilmD", "2019", "Lviv Ukraine"),
        ]);
        let y2020 = index.locations_for("2020").unwrap();
        assert_eq!(y2020.len(), 2);
        let lviv: Vec<&str> = y2020["Lviv Ukraine"].iter().map(String::as_str).collect();
        assert_eq!(lviv, vec!["FilmA", "FilmB"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_films_deduplicated() {
        let index = FilmLocationIndex::build(vec![
            rec("FilmA", "2020", "Lviv Ukraine"),
            rec("FilmA", "2020", "Lviv Ukraine"),
        ]);
        assert_eq!(index.locations_for("2020").unwrap()["Lviv Ukraine"].len(), 1);
    }

    #[test]
    fn test_missing_year() {
        let index = FilmLocationIndex::build(vec![rec("FilmA", "2020", "Lviv Ukraine")]);
        let err = index.locations_for("1999").unwrap_err();
        assert!(matches!(err, FilmapError::NoDataForYear(y) if y == "1999"));
        assert!(!index.contains_year("1999"));
    }

    #[test]
    fn test_year_canonicalized() {
        assert_eq!(canonical_year(" 2020 "), "2020");
        assert_eq!(canonical_year("\"2020\""), "2020");
        assert_eq!(canonical_year("02020"), "2020");
        assert_eq!(canonical_year("????"), "????");

        let index = FilmLocationIndex::from_rows(vec![vec!["FilmA", " 2020", "Lviv Ukraine"]]);
        assert!(index.contains_year("2020"));
        assert!(index.locations_for(&2020.to_string()).is_ok());
    }

    #[test]
    fn test_from_rows_uses_last_field_as_location() {
        let index = FilmLocationIndex::from_rows(vec![vec![
            "FilmA",
            "2020",
            "{episode}",
            "(studio)",
            "Arena Lviv Lviv Ukraine",
        ]]);
        assert!(index.locations_for("2020").unwrap().contains_key("Arena Lviv Lviv Ukraine"));
    }

    #[test]
    fn test_from_rows_skips_malformed() {
        let index = FilmLocationIndex::from_rows(vec![
            vec!["FilmA", "2020", "Lviv Ukraine"],
            vec!["only two", "2020"],
            vec!["", "2020", "Kyiv Ukraine"],
            vec!["FilmB", "2020", "  "],
        ]);
        assert_eq!(index.skipped(), 3);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_from_fields_errors() {
        assert!(matches!(
            FilmRecord::from_fields(&["a", "b"]),
            Err(FilmapError::MalformedRecord(_))
        ));
        let ok = FilmRecord::from_fields(&[" Film ", "2001", "x", " Place "]).unwrap();
        assert_eq!(ok, rec("Film", "2001", "Place"));
    }

    #[test]
    fn test_years_sorted() {
        let index = FilmLocationIndex::build(vec![
            rec("A", "2020", "x"),
            rec("B", "1999", "y"),
        ]);
        assert_eq!(index.years().collect::<Vec<_>>(), vec!["1999", "2020"]);
    }
}
