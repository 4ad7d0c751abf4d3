//! filmap: finds where films of a given year were shot near you and puts the
//! closest locations on a map.

pub mod config;
pub mod distance;
pub mod error;
pub mod films;
pub mod loader;
pub mod location;
pub mod pipeline;
pub mod render;

pub use config::Config;
pub use error::{FilmapError, Result, ServiceError};
pub use pipeline::{GeoContext, Pipeline, RunReport};
