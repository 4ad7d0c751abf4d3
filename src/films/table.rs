//! The `;\t`-separated table of filtered locations written between filtering
//! and ranking.
//!
//! ```text
//! location;	latitude;	longitude;	films
//! Lviv Ukraine;	49.8397;	24.0297;	FilmA/FilmB
//! ```
//!
//! Film titles are `/`-separated; a `/` or `\` inside a title is written
//! with a leading backslash.

use super::filter::FilteredLocationRecord;
use crate::error::FilmapError;
use crate::location::Coordinate;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

pub const SEPARATOR: &str = ";\t";
pub const HEADER: [&str; 4] = ["location", "latitude", "longitude", "films"];

/// Write the header and one row per record.
pub fn write<W: Write>(mut out: W, records: &[FilteredLocationRecord]) -> std::io::Result<()> {
    writeln!(out, "{}", HEADER.join(SEPARATOR))?;
    for record in records {
        writeln!(
            out,
            "{}{sep}{}{sep}{}{sep}{}",
            clean(&record.location),
            record.coordinate.lat,
            record.coordinate.lon,
            clean(&join_titles(&record.films)),
            sep = SEPARATOR
        )?;
    }
    out.flush()
}

/// Read records back, skipping the header and rows that do not parse.
pub fn read<R: Read>(input: R) -> std::io::Result<Vec<FilteredLocationRecord>> {
    let mut records = Vec::new();
    for (i, line) in BufReader::new(input).lines().enumerate() {
        let line = line?;
        if i == 0 && line.trim_end() == HEADER.join(SEPARATOR) {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(&line) {
            Some(record) => records.push(record),
            None => debug!(line = i + 1, "skipping unparsable table row"),
        }
    }
    Ok(records)
}

pub fn write_file(path: &Path, records: &[FilteredLocationRecord]) -> Result<(), FilmapError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FilmapError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| FilmapError::io(path, e))?;
    write(BufWriter::new(file), records).map_err(|e| FilmapError::io(path, e))
}

pub fn read_file(path: &Path) -> Result<Vec<FilteredLocationRecord>, FilmapError> {
    let file = File::open(path).map_err(|e| FilmapError::io(path, e))?;
    read(file).map_err(|e| FilmapError::io(path, e))
}

fn parse_row(line: &str) -> Option<FilteredLocationRecord> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    if fields.len() < 4 {
        return None;
    }
    let lat: f64 = fields[1].trim().parse().ok()?;
    let lon: f64 = fields[2].trim().parse().ok()?;
    let coordinate = Coordinate::new(lat, lon).ok()?;
    let films = split_titles(&fields[3..].join(SEPARATOR));
    Some(FilteredLocationRecord {
        location: fields[0].to_string(),
        coordinate,
        films,
    })
}

fn join_titles(films: &[String]) -> String {
    films
        .iter()
        .map(|f| f.replace('\\', "\\\\").replace('/', "\\/"))
        .collect::<Vec<_>>()
        .join("/")
}

fn split_titles(field: &str) -> Vec<String> {
    let mut titles = Vec::new();
    let mut current = String::new();
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.extend(chars.next()),
            '/' => titles.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    titles.push(current);
    titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Line breaks and the separator would split a row.
fn clean(field: &str) -> String {
    field.replace(['\n', '\r'], " ").replace(SEPARATOR, "; ")
}
