//! Orders filtered locations by distance from the user.

use super::filter::FilteredLocationRecord;
use crate::distance::distance;
use crate::error::FilmapError;
use crate::location::Coordinate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFilmEntry {
    /// Film names joined with `/`.
    pub films: String,
    pub coordinate: Coordinate,
    pub distance_km: f64,
}

pub struct FilmProximityRanker;

impl FilmProximityRanker {
    /// Every record with its distance to `user`, closest first. Equal
    /// distances keep input order. Records with invalid coordinates are
    /// dropped; an invalid `user` is an error.
    pub fn rank(
        records: &[FilteredLocationRecord],
        user: Coordinate,
    ) -> Result<Vec<RankedFilmEntry>, FilmapError> {
        user.validate()?;
        let mut ranked: Vec<RankedFilmEntry> = records
            .iter()
            .filter_map(|record| match distance(record.coordinate, user) {
                Ok(distance_km) => Some(RankedFilmEntry {
                    films: record.films_joined(),
                    coordinate: record.coordinate,
                    distance_km,
                }),
                Err(e) => {
                    debug!(location = %record.location, "not ranked: {}", e);
                    None
                }
            })
            .collect();
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(ranked)
    }
}
