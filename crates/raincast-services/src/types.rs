//! Prediction service payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::risk::{ConfidenceBucket, RiskTier};

/// Area shown for records stored without one.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FinalPrediction {
    Yes,
    #[default]
    No,
}

impl FinalPrediction {
    pub fn is_rain(self) -> bool {
        self == FinalPrediction::Yes
    }
}

// Anything other than "Yes" reads as No. Some records hold a one-element list.
impl<'de> Deserialize<'de> for FinalPrediction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match &value {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()),
            _ => None,
        };
        Ok(match text {
            Some(s) if s.trim().eq_ignore_ascii_case("yes") => FinalPrediction::Yes,
            _ => FinalPrediction::No,
        })
    }
}

/// Immediate response to a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    #[serde(rename = "RainfallPrediction", default)]
    pub rainfall_prediction: FinalPrediction,
    #[serde(rename = "RiskSummary", default, deserialize_with = "null_as_default")]
    pub risk_summary: String,
    #[serde(rename = "Precautions", default, deserialize_with = "null_as_default")]
    pub precautions: Vec<String>,
}

impl PredictionOutcome {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::classify(&self.risk_summary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionDetail {
    #[serde(default)]
    pub final_prediction: FinalPrediction,
    #[serde(default, deserialize_with = "null_as_default")]
    pub was_overridden: bool,
}

/// Conditions captured with a stored prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub cloud_cover: Option<f64>,
}

impl WeatherSnapshot {
    /// `(label, value, unit)` for each captured reading, skipping missing ones.
    pub fn readings(&self) -> impl Iterator<Item = (&'static str, f64, &'static str)> {
        [
            ("Temperature", self.temperature, "°C"),
            ("Humidity", self.humidity, "%"),
            ("Pressure", self.pressure, "hPa"),
            ("Cloud Cover", self.cloud_cover, "%"),
        ]
        .into_iter()
        .filter_map(|(label, value, unit)| value.map(|v| (label, v, unit)))
    }
}

/// A stored prediction from the principal's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    #[serde(rename = "user_id", default, deserialize_with = "null_as_default")]
    pub owner: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default = "unknown_location", deserialize_with = "area_or_unknown")]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prediction: PredictionDetail,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub precautions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub was_overridden: bool,
    #[serde(default)]
    pub weather_conditions: Option<WeatherSnapshot>,
}

impl PredictionRecord {
    pub fn final_prediction(&self) -> FinalPrediction {
        self.prediction.final_prediction
    }

    /// The override flag may sit on the record or on its prediction.
    pub fn was_overridden(&self) -> bool {
        self.was_overridden || self.prediction.was_overridden
    }

    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::classify(&self.risk_summary)
    }

    pub fn confidence_bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::classify(self.model_confidence)
    }

    /// Parsed timestamp. The service emits RFC 2822 dates; RFC 3339 is also accepted.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

fn unknown_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

fn area_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let area = Option::<String>::deserialize(deserializer)?;
    Ok(area
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(unknown_location))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_names() {
        let outcome: PredictionOutcome = serde_json::from_value(serde_json::json!({
            "RainfallPrediction": "Yes",
            "RiskSummary": "High humidity",
            "Precautions": ["Carry an umbrella", "Avoid low-lying roads"]
        }))
        .unwrap();

        assert_eq!(outcome.rainfall_prediction, FinalPrediction::Yes);
        assert_eq!(outcome.precautions.len(), 2);
        assert_eq!(outcome.risk_tier(), RiskTier::High);
    }

    #[test]
    fn test_record_full() {
        let record: PredictionRecord = serde_json::from_value(serde_json::json!({
            "id": "65f1c0ffee",
            "user_id": "u1",
            "timestamp": "Mon, 15 Jan 2024 10:30:00 GMT",
            "area": "Kathmandu, Nepal",
            "prediction": {"final_prediction": "Yes", "was_overridden": true},
            "risk_summary": "Moderate rainfall risk",
            "precautions": ["Carry an umbrella"],
            "model_confidence": 0.82,
            "was_overridden": false,
            "weather_conditions": {"humidity": 85, "pressure": 1005, "temperature": 22.5, "cloud_cover": 90}
        }))
        .unwrap();

        assert_eq!(record.owner, "u1");
        assert_eq!(record.final_prediction(), FinalPrediction::Yes);
        assert!(record.was_overridden());
        assert_eq!(record.risk_tier(), RiskTier::Medium);
        assert_eq!(record.confidence_bucket(), ConfidenceBucket::Good);
        assert_eq!(
            record.weather_conditions.as_ref().and_then(|w| w.humidity),
            Some(85.0)
        );
        let readings: Vec<_> = record
            .weather_conditions
            .as_ref()
            .map(|w| w.readings().collect())
            .unwrap_or_default();
        assert_eq!(readings[0], ("Temperature", 22.5, "°C"));
        assert_eq!(readings.len(), 4);
        assert_eq!(
            record.recorded_at().map(|t| t.to_rfc3339()),
            Some("2024-01-15T10:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_record_defaults() {
        let record: PredictionRecord = serde_json::from_value(serde_json::json!({
            "id": "1",
            "area": null,
            "model_confidence": null
        }))
        .unwrap();

        assert_eq!(record.area, UNKNOWN_LOCATION);
        assert_eq!(record.model_confidence, 0.0);
        assert_eq!(record.final_prediction(), FinalPrediction::No);
        assert!(!record.was_overridden());
        assert!(record.precautions.is_empty());
        assert_eq!(record.recorded_at(), None);

        let missing: PredictionRecord =
            serde_json::from_value(serde_json::json!({"id": "2", "area": ""})).unwrap();
        assert_eq!(missing.area, UNKNOWN_LOCATION);
    }

    #[test]
    fn test_snapshot_skips_missing_readings() {
        let snapshot = WeatherSnapshot {
            humidity: Some(70.0),
            ..WeatherSnapshot::default()
        };
        let readings: Vec<_> = snapshot.readings().collect();
        assert_eq!(readings, vec![("Humidity", 70.0, "%")]);
    }

    #[test]
    fn test_final_prediction_shapes() {
        let parse = |v: serde_json::Value| serde_json::from_value::<FinalPrediction>(v).unwrap();
        assert_eq!(parse(serde_json::json!("yes")), FinalPrediction::Yes);
        assert_eq!(parse(serde_json::json!(["Yes"])), FinalPrediction::Yes);
        assert_eq!(parse(serde_json::json!("No")), FinalPrediction::No);
        assert_eq!(parse(serde_json::json!(null)), FinalPrediction::No);
    }
}
