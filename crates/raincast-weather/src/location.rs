//! Location resolution with a bounded wait on the device.
//!
//! An explicit coordinate always wins. Otherwise the device is asked once;
//! denial, unavailability or the timeout all settle on the fallback
//! coordinate with a non-fatal warning. Nothing is retried here.

use std::future::Future;
use std::time::Duration;

use crate::types::{Coordinate, LocationError};

/// Default upper bound on waiting for the device.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A source of device position fixes.
pub trait GeolocationSource: Send + Sync {
    /// Request the current position once.
    fn current_position(
        &self,
        high_accuracy: bool,
    ) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Source for platforms without a location service.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGeolocation;

impl GeolocationSource for UnavailableGeolocation {
    async fn current_position(&self, _high_accuracy: bool) -> Result<Coordinate, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Where a resolution attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    AwaitingDevice,
    Resolved,
    FallbackApplied,
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub state: ResolutionState,
    /// Set when the fallback was applied.
    pub warning: Option<LocationError>,
}

impl Resolution {
    pub fn used_fallback(&self) -> bool {
        self.state == ResolutionState::FallbackApplied
    }
}

pub struct LocationResolver<G> {
    source: G,
    fallback: Coordinate,
    timeout: Duration,
    high_accuracy: bool,
    state: ResolutionState,
}

impl<G: GeolocationSource> LocationResolver<G> {
    pub fn new(source: G, fallback: Coordinate) -> Self {
        Self {
            source,
            fallback,
            timeout: DEFAULT_TIMEOUT,
            high_accuracy: true,
            state: ResolutionState::Unresolved,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    /// Resolve exactly one coordinate. Settles within the configured timeout.
    pub async fn resolve(&mut self, explicit: Option<Coordinate>) -> Resolution {
        self.state = ResolutionState::Unresolved;

        if let Some(coordinate) = explicit {
            tracing::info!("Using explicit location: {}", coordinate);
            self.state = ResolutionState::Resolved;
            return Resolution {
                coordinate,
                state: self.state,
                warning: None,
            };
        }

        self.state = ResolutionState::AwaitingDevice;
        let request = self.source.current_position(self.high_accuracy);

        let outcome = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match outcome {
            Ok(coordinate) => {
                tracing::info!("Got device location: {}", coordinate);
                self.state = ResolutionState::Resolved;
                Resolution {
                    coordinate,
                    state: self.state,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("Location unavailable ({}), using fallback {}", e, self.fallback);
                self.state = ResolutionState::FallbackApplied;
                Resolution {
                    coordinate: self.fallback,
                    state: self.state,
                    warning: Some(e),
                }
            }
        }
    }
}
