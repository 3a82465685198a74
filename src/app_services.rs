//! Shared application services built once from configuration.
//!
//! Views are created from here and share one prediction client, one session
//! and one notifier.

use std::sync::Arc;

use anyhow::{Context, Result};
use raincast_auth::{CredentialStore, Session, SharedSession};
use raincast_core::Config;
use raincast_services::PredictionClient;
use raincast_weather::{
    Coordinate, GeolocationSource, LocationResolver, ReverseGeocoder, WeatherFeatureBuilder,
    WeatherProvider,
};

use crate::notification::Notifier;
use crate::views::{HistoryView, PredictionView};

pub struct AppServices {
    config: Config,
    session: SharedSession,
    client: Arc<PredictionClient>,
    builder: WeatherFeatureBuilder,
    notifier: Notifier,
}

impl AppServices {
    pub fn new(config: Config) -> Result<Self> {
        let session = Session::open(CredentialStore::new(config.session_path())).shared();

        let client = PredictionClient::new(
            &config.services.prediction_api_url,
            config.services.request_timeout(),
            session.clone(),
        )
        .context("Failed to create prediction client")?;

        let provider = WeatherProvider::new(
            &config.weather.provider_url,
            config.weather.effective_api_key(),
            config.weather.request_timeout(),
        )
        .context("Failed to create weather provider")?;
        let geocoder = ReverseGeocoder::new(&config.weather.geocoder_url)
            .context("Failed to create reverse geocoder")?;

        let notifier = Notifier::new(config.notifications.dismiss_after());

        Ok(Self {
            config,
            session,
            client: Arc::new(client),
            builder: WeatherFeatureBuilder::new(provider, geocoder),
            notifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Configured fallback location.
    pub fn fallback_coordinate(&self) -> Result<Coordinate> {
        let location = &self.config.location;
        Coordinate::new(location.fallback_latitude, location.fallback_longitude)
            .context("Configured fallback location is not a valid coordinate")
    }

    pub fn prediction_view<G: GeolocationSource>(
        &self,
        source: G,
    ) -> Result<PredictionView<G, PredictionClient>> {
        let resolver = LocationResolver::new(source, self.fallback_coordinate()?)
            .with_timeout(self.config.location.timeout())
            .with_high_accuracy(self.config.location.high_accuracy);

        Ok(PredictionView::new(
            resolver,
            self.builder.clone(),
            Arc::clone(&self.client),
            self.notifier.clone(),
        ))
    }

    pub fn history_view(&self) -> HistoryView<PredictionClient> {
        HistoryView::new(Arc::clone(&self.client), self.notifier.clone())
    }
}
