//! Current conditions from an OpenWeatherMap-compatible API.
//! Each call is a point-in-time snapshot; nothing is cached.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Coordinate, CurrentConditions, DisplayMetadata, WeatherError};

/// m/s to km/h
const MS_TO_KMH: f64 = 3.6;
/// Visibility reported when the provider omits it (its own cap).
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    wind: OwmWind,
    clouds: OwmClouds,
    visibility: Option<f64>,
    rain: Option<OwmRain>,
    #[serde(default)]
    name: String,
    sys: Option<OwmSys>,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    icon: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmError {
    message: Option<String>,
}

impl From<OwmResponse> for CurrentConditions {
    fn from(r: OwmResponse) -> Self {
        let first = r.weather.into_iter().next();
        Self {
            temperature_c: r.main.temp,
            feels_like_c: r.main.feels_like,
            humidity_pct: r.main.humidity,
            pressure_hpa: r.main.pressure,
            wind_speed_kmh: r.wind.speed * MS_TO_KMH,
            wind_direction_deg: r.wind.deg,
            wind_gust_kmh: r.wind.gust.map(|g| g * MS_TO_KMH),
            cloud_cover_pct: r.clouds.all,
            visibility_km: r.visibility.unwrap_or(DEFAULT_VISIBILITY_M) / 1000.0,
            precipitation_last_hour_mm: r.rain.and_then(|rain| rain.one_hour).unwrap_or(0.0),
            display: DisplayMetadata {
                station_name: r.name,
                country_code: r.sys.and_then(|s| s.country),
                icon: first.as_ref().and_then(|w| w.icon.clone()),
                description: first.and_then(|w| w.description),
                fetched_at: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch current conditions at `coordinate`.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn current(&self, coordinate: Coordinate) -> Result<CurrentConditions, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/data/2.5/weather", self.base_url);
        let lat = coordinate.lat().to_string();
        let lon = coordinate.lng().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                ("appid", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OwmError>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);
            tracing::warn!("Weather provider returned {}: {}", status, message);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 21.5, "feels_like": 21.9, "pressure": 1008, "humidity": 83},
            "visibility": 8000,
            "wind": {"speed": 5.0, "deg": 240, "gust": 10.0},
            "rain": {"1h": 0.6},
            "clouds": {"all": 75},
            "sys": {"country": "NP"},
            "name": "Kathmandu"
        })
    }

    #[tokio::test]
    async fn test_current_converts_units() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&mock_server)
            .await;

        let provider =
            WeatherProvider::new(&mock_server.uri(), Some("key".into()), Duration::from_secs(5))
                .unwrap();
        let c = provider
            .current(Coordinate::new(27.7172, 85.3240).unwrap())
            .await
            .unwrap();

        assert_eq!(c.temperature_c, 21.5);
        assert_eq!(c.humidity_pct, 83.0);
        assert_eq!(c.pressure_hpa, 1008.0);
        assert!((c.wind_speed_kmh - 18.0).abs() < 1e-9);
        assert!((c.wind_gust_kmh.unwrap() - 36.0).abs() < 1e-9);
        assert_eq!(c.visibility_km, 8.0);
        assert_eq!(c.precipitation_last_hour_mm, 0.6);
        assert_eq!(c.display.station_name, "Kathmandu");
        assert_eq!(c.display.country_code.as_deref(), Some("NP"));
        assert_eq!(c.display.icon.as_deref(), Some("10d"));
    }

    #[tokio::test]
    async fn test_missing_optional_blocks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": {"temp": 10.0, "feels_like": 9.0, "pressure": 1020, "humidity": 40},
                "wind": {"speed": 1.0},
                "clouds": {"all": 0}
            })))
            .mount(&mock_server)
            .await;

        let provider =
            WeatherProvider::new(&mock_server.uri(), Some("key".into()), Duration::from_secs(5))
                .unwrap();
        let c = provider
            .current(Coordinate::new(0.0, 0.0).unwrap())
            .await
            .unwrap();

        assert_eq!(c.precipitation_last_hour_mm, 0.0);
        assert_eq!(c.wind_gust_kmh, None);
        assert_eq!(c.visibility_km, 10.0);
        assert_eq!(c.wind_direction_deg, 0.0);
    }

    #[tokio::test]
    async fn test_non_success_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .mount(&mock_server)
            .await;

        let provider =
            WeatherProvider::new(&mock_server.uri(), Some("bad".into()), Duration::from_secs(5))
                .unwrap();
        let result = provider.current(Coordinate::new(0.0, 0.0).unwrap()).await;

        match result {
            Err(WeatherError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let provider =
            WeatherProvider::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let result = provider.current(Coordinate::new(0.0, 0.0).unwrap()).await;
        assert!(matches!(result, Err(WeatherError::MissingApiKey)));
    }
}
