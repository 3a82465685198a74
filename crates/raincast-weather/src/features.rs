//! The fixed-shape feature vector consumed by the prediction service.
//!
//! Every vector carries all seventeen fields in the same order. A field holds
//! either a provider number or the raw text of a user edit, parsed on demand.

use serde_json::{Map, Value};

/// Wire name of the area label.
pub const AREA_KEY: &str = "Area";

/// One named measurement in the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    CloudCover,
    Visibility,
    DewPoint,
    UvIndex,
    SolarRadiation,
    WindDirection,
    PrecipitationLastHour,
    SoilMoisture,
    EvaporationRate,
    FeelsLike,
    TempChange1h,
    WindGust,
    PressureTendency,
}

impl Feature {
    pub const COUNT: usize = 17;

    /// All fields in wire order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Temperature,
        Feature::Humidity,
        Feature::Pressure,
        Feature::WindSpeed,
        Feature::CloudCover,
        Feature::Visibility,
        Feature::DewPoint,
        Feature::UvIndex,
        Feature::SolarRadiation,
        Feature::WindDirection,
        Feature::PrecipitationLastHour,
        Feature::SoilMoisture,
        Feature::EvaporationRate,
        Feature::FeelsLike,
        Feature::TempChange1h,
        Feature::WindGust,
        Feature::PressureTendency,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Name used in the prediction request body.
    pub fn wire_name(self) -> &'static str {
        match self {
            Feature::Temperature => "Temperature(C)",
            Feature::Humidity => "Humidity(%)",
            Feature::Pressure => "Pressure(hPa)",
            Feature::WindSpeed => "WindSpeed(km/h)",
            Feature::CloudCover => "CloudCover(%)",
            Feature::Visibility => "Visibility(km)",
            Feature::DewPoint => "DewPoint(C)",
            Feature::UvIndex => "UVIndex",
            Feature::SolarRadiation => "SolarRadiation(W/m²)",
            Feature::WindDirection => "WindDirection(°)",
            Feature::PrecipitationLastHour => "PrecipitationLastHour(mm)",
            Feature::SoilMoisture => "SoilMoisture(%)",
            Feature::EvaporationRate => "EvaporationRate(mm/day)",
            Feature::FeelsLike => "FeelsLikeTemp(C)",
            Feature::TempChange1h => "TempChange1h(C)",
            Feature::WindGust => "WindGust(km/h)",
            Feature::PressureTendency => "PressureTendency(hPa/3h)",
        }
    }

    /// Short snake_case key, used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Pressure => "pressure",
            Feature::WindSpeed => "wind_speed",
            Feature::CloudCover => "cloud_cover",
            Feature::Visibility => "visibility",
            Feature::DewPoint => "dew_point",
            Feature::UvIndex => "uv_index",
            Feature::SolarRadiation => "solar_radiation",
            Feature::WindDirection => "wind_direction",
            Feature::PrecipitationLastHour => "precipitation_last_hour",
            Feature::SoilMoisture => "soil_moisture",
            Feature::EvaporationRate => "evaporation_rate",
            Feature::FeelsLike => "feels_like",
            Feature::TempChange1h => "temp_change_1h",
            Feature::WindGust => "wind_gust",
            Feature::PressureTendency => "pressure_tendency",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Feature::Temperature => "Temperature",
            Feature::Humidity => "Humidity",
            Feature::Pressure => "Pressure",
            Feature::WindSpeed => "Wind Speed",
            Feature::CloudCover => "Cloud Cover",
            Feature::Visibility => "Visibility",
            Feature::DewPoint => "Dew Point",
            Feature::UvIndex => "UV Index",
            Feature::SolarRadiation => "Solar Radiation",
            Feature::WindDirection => "Wind Direction",
            Feature::PrecipitationLastHour => "Precipitation (1h)",
            Feature::SoilMoisture => "Soil Moisture",
            Feature::EvaporationRate => "Evaporation Rate",
            Feature::FeelsLike => "Feels Like",
            Feature::TempChange1h => "Temperature Change (1h)",
            Feature::WindGust => "Wind Gust",
            Feature::PressureTendency => "Pressure Tendency",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Feature::Temperature | Feature::DewPoint | Feature::FeelsLike | Feature::TempChange1h => {
                "°C"
            }
            Feature::Humidity | Feature::CloudCover | Feature::SoilMoisture => "%",
            Feature::Pressure => "hPa",
            Feature::WindSpeed | Feature::WindGust => "km/h",
            Feature::Visibility => "km",
            Feature::UvIndex => "",
            Feature::SolarRadiation => "W/m²",
            Feature::WindDirection => "°",
            Feature::PrecipitationLastHour => "mm",
            Feature::EvaporationRate => "mm/day",
            Feature::PressureTendency => "hPa/3h",
        }
    }

    /// Look a field up by wire name or short key (case-insensitive for keys).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|f| {
            f.wire_name() == name
                || f.key().eq_ignore_ascii_case(name)
                || f.key().replace('_', "").eq_ignore_ascii_case(name)
        })
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    /// Raw user input, parsed on demand.
    Text(String),
}

impl FieldValue {
    /// Finite numeric value, or `None` for empty, unparseable or non-finite input.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Number(0.0)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical feature vector plus area label.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [FieldValue; Feature::COUNT],
    area: String,
}

impl FeatureVector {
    /// A vector with every field at the `0` placeholder.
    pub fn new(area: impl Into<String>) -> Self {
        Self {
            values: std::array::from_fn(|_| FieldValue::default()),
            area: area.into(),
        }
    }

    pub fn get(&self, feature: Feature) -> &FieldValue {
        &self.values[feature.index()]
    }

    pub fn number(&self, feature: Feature) -> Option<f64> {
        self.get(feature).as_number()
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = FieldValue::Number(value);
    }

    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Replace a field with raw user input.
    pub fn edit(&mut self, feature: Feature, raw: impl Into<String>) {
        self.values[feature.index()] = FieldValue::Text(raw.into());
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn set_area(&mut self, area: impl Into<String>) {
        self.area = area.into();
    }

    /// Fields in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &FieldValue)> {
        Feature::ALL.into_iter().zip(self.values.iter())
    }

    /// Request body: every field as a number under its wire name, plus `Area`.
    /// Fails with the first field that does not hold a number.
    pub fn to_payload(&self) -> Result<Map<String, Value>, Feature> {
        let mut body = Map::new();
        for (feature, value) in self.iter() {
            let n = value.as_number().ok_or(feature)?;
            body.insert(feature.wire_name().to_string(), Value::from(n));
        }
        body.insert(AREA_KEY.to_string(), Value::String(self.area.clone()));
        Ok(body)
    }
}
