//! Weather features for Raincast
//!
//! Resolves a coordinate, fetches current conditions from an OpenWeatherMap
//! compatible API, reverse geocodes an area label via Nominatim, and turns
//! the result into the fixed-shape feature vector the prediction service
//! consumes.

pub mod builder;
pub mod features;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;
pub mod validate;

pub use builder::{FeatureBundle, WeatherFeatureBuilder};
pub use features::{Feature, FeatureVector, FieldValue};
pub use geocode::{AreaLabel, ReverseGeocoder};
pub use location::{
    GeolocationSource, LocationResolver, Resolution, ResolutionState, UnavailableGeolocation,
};
pub use provider::WeatherProvider;
pub use types::*;
pub use validate::{FeatureEditor, FeatureValidator, ValidRange, ValidationResult};
