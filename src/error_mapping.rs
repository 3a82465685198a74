//! Maps crate errors onto `raincast_core::AppError` for consistent user-facing
//! messages and presentation.

use raincast_auth::SessionError;
use raincast_core::AppError;
use raincast_services::PredictionError;
use raincast_weather::{LocationError, WeatherError};

/// Conversion into the application error taxonomy.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for LocationError {
    fn into_app_error(self) -> AppError {
        AppError::LocationUnavailable(self.to_string())
    }
}

impl IntoAppError for WeatherError {
    fn into_app_error(self) -> AppError {
        AppError::WeatherProvider(self.to_string())
    }
}

impl IntoAppError for PredictionError {
    fn into_app_error(self) -> AppError {
        match self {
            PredictionError::Unauthenticated => AppError::Unauthenticated,
            PredictionError::SessionExpired => AppError::SessionExpired,
            PredictionError::Validation(result) => AppError::Validation(result.into_named()),
            PredictionError::Failed(msg) => AppError::PredictionFailed(msg),
            PredictionError::DeleteFailed(msg) => AppError::DeleteFailed(msg),
        }
    }
}

impl IntoAppError for SessionError {
    fn into_app_error(self) -> AppError {
        match self {
            SessionError::Io(e) => AppError::Io(e),
            other => AppError::Other(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raincast_core::Presentation;
    use raincast_weather::{Feature, FeatureValidator, FeatureVector};

    #[test]
    fn location_is_a_warning() {
        let err = LocationError::Timeout.into_app_error();
        assert!(matches!(err, AppError::LocationUnavailable(_)));
        assert_eq!(err.presentation(), Presentation::Warning);
    }

    #[test]
    fn weather_offers_in_place_retry() {
        let err = WeatherError::MissingApiKey.into_app_error();
        assert_eq!(err.presentation(), Presentation::InPlaceRetry);
        assert!(err.is_retryable());
    }

    #[test]
    fn session_expired_stays_distinct() {
        let err = PredictionError::SessionExpired.into_app_error();
        assert!(matches!(err, AppError::SessionExpired));
        assert!(err.requires_reauth());
        assert_eq!(err.presentation(), Presentation::Notification);
    }

    #[test]
    fn validation_keeps_field_names() {
        let mut vector = FeatureVector::new("x");
        vector.edit(Feature::Humidity, "wet");
        let result = FeatureValidator::validate(&vector);

        let err = PredictionError::Validation(result).into_app_error();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(
                    fields.get("Humidity(%)").map(String::as_str),
                    Some("Must be a number")
                );
            }
            other => panic!("expected validation, got {:?}", other),
        }
    }

    #[test]
    fn server_message_passes_through() {
        let err = PredictionError::Failed("Models not loaded".into()).into_app_error();
        assert_eq!(err.user_message(), "Models not loaded");
    }
}
