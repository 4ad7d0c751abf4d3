//! Location subsystem for filmap.
//!
//! Coordinates, the built-in country table with fuzzy lookup, Nominatim
//! geocoding, a local geocode cache, and nearest country/city resolution.

pub mod cache;
pub mod countries;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::{CachedGeocoder, GeocodeCache};
pub use countries::{BuiltinCountries, CountryLookup};
pub use providers::{ForwardGeocoder, NoReverseGeocoder, NominatimClient, ReverseGeocoder};
pub use resolver::{NearestCityResolver, NearestCountryResolver, USA_CODE};
pub use types::{CityRecord, Coordinate, CountryInfo, CountryRecord};
