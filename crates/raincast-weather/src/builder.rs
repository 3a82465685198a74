//! Coordinate → feature vector.

use crate::features::{Feature, FeatureVector};
use crate::geocode::{AreaLabel, ReverseGeocoder};
use crate::provider::WeatherProvider;
use crate::types::{Coordinate, CurrentConditions, DisplayMetadata, WeatherError};

/// Everything one build produces.
#[derive(Debug, Clone)]
pub struct FeatureBundle {
    pub vector: FeatureVector,
    pub label: AreaLabel,
    pub display: DisplayMetadata,
}

#[derive(Debug, Clone)]
pub struct WeatherFeatureBuilder {
    provider: WeatherProvider,
    geocoder: ReverseGeocoder,
}

impl WeatherFeatureBuilder {
    pub fn new(provider: WeatherProvider, geocoder: ReverseGeocoder) -> Self {
        Self { provider, geocoder }
    }

    /// Fetch conditions and the area label concurrently. Only the weather
    /// fetch can fail the build; the caller decides whether to retry.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn build(&self, coordinate: Coordinate) -> Result<FeatureBundle, WeatherError> {
        let (conditions, label) = tokio::join!(
            self.provider.current(coordinate),
            self.geocoder.area_label(coordinate)
        );
        let conditions = conditions?;

        let vector = vector_from_conditions(&conditions, label.area());
        tracing::info!("Built feature vector for {}", vector.area());

        Ok(FeatureBundle {
            vector,
            label,
            display: conditions.display,
        })
    }
}

/// Map provider conditions onto the fixed feature shape.
///
/// Fields the provider has no source for are placeholders: dew point mirrors
/// temperature, solar radiation mirrors cloud cover, the rest are zero.
pub fn vector_from_conditions(c: &CurrentConditions, area: impl Into<String>) -> FeatureVector {
    FeatureVector::new(area)
        .with(Feature::Temperature, c.temperature_c)
        .with(Feature::Humidity, c.humidity_pct)
        .with(Feature::Pressure, c.pressure_hpa)
        .with(Feature::WindSpeed, c.wind_speed_kmh)
        .with(Feature::CloudCover, c.cloud_cover_pct)
        .with(Feature::Visibility, c.visibility_km)
        .with(Feature::DewPoint, c.temperature_c)
        .with(Feature::UvIndex, 0.0)
        .with(Feature::SolarRadiation, c.cloud_cover_pct)
        .with(Feature::WindDirection, c.wind_direction_deg)
        .with(Feature::PrecipitationLastHour, c.precipitation_last_hour_mm)
        .with(Feature::SoilMoisture, 0.0)
        .with(Feature::EvaporationRate, 0.0)
        .with(Feature::FeelsLike, c.feels_like_c)
        .with(Feature::TempChange1h, 0.0)
        .with(Feature::WindGust, c.wind_gust_kmh.unwrap_or(0.0))
        .with(Feature::PressureTendency, 0.0)
}
