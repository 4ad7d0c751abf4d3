//! Film-location side of filmap: the year index, location matching, the
//! filter engine, the intermediate table and distance ranking.

pub mod filter;
pub mod index;
pub mod matcher;
pub mod ranker;
pub mod table;

pub use filter::{FilterScope, FilteredLocationRecord, LocationFilterEngine};
pub use index::{canonical_year, FilmLocationIndex, FilmRecord};
pub use matcher::{ComponentMatcher, LocationMatcher, SubstringMatcher};
pub use ranker::{FilmProximityRanker, RankedFilmEntry};
