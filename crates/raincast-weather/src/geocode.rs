//! Reverse geocoding: convert coordinates to an area label.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Coordinate;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Raincast/0.1.0";

/// Label used when no locality component resolves.
pub const UNKNOWN_AREA: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub suburb: Option<String>,
    pub hamlet: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
}

/// Human-readable area for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaLabel {
    pub place: String,
    pub country: Option<String>,
}

impl AreaLabel {
    pub fn unknown() -> Self {
        Self {
            place: UNKNOWN_AREA.to_string(),
            country: None,
        }
    }

    /// Pick the most specific locality: suburb > hamlet > village > town > city > county.
    pub fn from_address(addr: NominatimAddress) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let place = non_empty(addr.suburb)
            .or_else(|| non_empty(addr.hamlet))
            .or_else(|| non_empty(addr.village))
            .or_else(|| non_empty(addr.town))
            .or_else(|| non_empty(addr.city))
            .or_else(|| non_empty(addr.county))
            .unwrap_or_else(|| UNKNOWN_AREA.to_string());

        Self {
            place,
            country: non_empty(addr.country),
        }
    }

    /// The string stored on the feature vector and on prediction records.
    pub fn area(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.place, country),
            None => self.place.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reverse geocode a coordinate. Never fails: any error yields `AreaLabel::unknown()`.
    pub async fn area_label(&self, coordinate: Coordinate) -> AreaLabel {
        let url = format!("{}/reverse", self.base_url);
        let lat = coordinate.lat().to_string();
        let lon = coordinate.lng().to_string();

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Reverse geocode request failed: {}", e);
                return AreaLabel::unknown();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Reverse geocode returned status {}", response.status());
            return AreaLabel::unknown();
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Reverse geocode parse error: {}", e);
                return AreaLabel::unknown();
            }
        };

        let label = body
            .address
            .map(AreaLabel::from_address)
            .unwrap_or_else(AreaLabel::unknown);

        tracing::debug!("Reverse geocoded {} to: {}", coordinate, label.area());
        label
    }
}
