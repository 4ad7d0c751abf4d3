//! Error types shared by every stage of the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of an external collaborator (geocoder, country lookup).
///
/// Callers decide per call site whether this is skipped, replaced by a
/// default, or surfaced.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: '{0}'")]
    NotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("offline mode, no cached answer for '{0}'")]
    Offline(String),
}

#[derive(Debug, Error)]
pub enum FilmapError {
    #[error("invalid coordinate ({lat}, {lon}); expected lat in -90..90 and lon in -180..180")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("none of the candidate countries could be resolved")]
    UnresolvableCountry,

    #[error("no filming locations recorded for year {0}")]
    NoDataForYear(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The pipeline recovers from every service failure itself (skip the row
    /// or use the fallback country), so it never returns this. Library callers
    /// that call a geocoder directly can propagate its error with `?`.
    #[error("external service failure: {0}")]
    ExternalServiceFailure(#[from] ServiceError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl FilmapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = FilmapError> = std::result::Result<T, E>;
