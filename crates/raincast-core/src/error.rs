//! Centralized error taxonomy for the Raincast client.
//!
//! Every failure the prediction pipeline can surface maps onto one `AppError`
//! variant. Each variant knows how it is presented (`Presentation`) and what
//! the user should read (`user_message`). None of them is fatal.

use std::collections::BTreeMap;

use thiserror::Error;

/// How an error is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Non-fatal notice; the flow continues (e.g. fallback location applied).
    Warning,
    /// Shown in place with a manual "Try again" affordance.
    InPlaceRetry,
    /// Shown next to the offending fields; fixed by re-editing.
    InlineFields,
    /// Dismissible notification.
    Notification,
}

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Weather provider error: {0}")]
    WeatherProvider(String),

    /// Field name -> message for every invalid field.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::LocationUnavailable(_) => {
                "Location access denied. Please allow location or select manually.".to_string()
            }
            AppError::WeatherProvider(_) => "Failed to fetch weather data".to_string(),
            AppError::Validation(_) => "Fix errors to update".to_string(),
            AppError::Unauthenticated => "Please login to make predictions".to_string(),
            AppError::SessionExpired => "Session expired. Please login again.".to_string(),
            AppError::PredictionFailed(msg) => msg.clone(),
            AppError::DeleteFailed(_) => {
                "Could not delete prediction. Please try again.".to_string()
            }
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// How this error is surfaced.
    pub fn presentation(&self) -> Presentation {
        match self {
            AppError::LocationUnavailable(_) => Presentation::Warning,
            AppError::WeatherProvider(_) | AppError::Unauthenticated => {
                Presentation::InPlaceRetry
            }
            AppError::Validation(_) => Presentation::InlineFields,
            AppError::SessionExpired
            | AppError::PredictionFailed(_)
            | AppError::DeleteFailed(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Other(_) => Presentation::Notification,
        }
    }

    /// Whether the user has to sign in again before continuing.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AppError::SessionExpired | AppError::Unauthenticated)
    }

    /// Whether a manual retry of the same action can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::WeatherProvider(_) | AppError::PredictionFailed(_) | AppError::DeleteFailed(_)
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}
