//! Prediction service error types.

use raincast_weather::ValidationResult;
use thiserror::Error;

/// Shown when the server gives no usable message.
pub const GENERIC_PREDICTION_FAILURE: &str = "Failed to get prediction. Please try again.";
pub const GENERIC_HISTORY_FAILURE: &str = "Could not retrieve predictions";
pub const GENERIC_DELETE_FAILURE: &str = "Failed to delete prediction";

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid fields: {}", .0.len())]
    Validation(ValidationResult),

    #[error("Prediction failed: {0}")]
    Failed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),
}

impl PredictionError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please log in to make predictions".to_string(),
            Self::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Self::Validation(_) => "Please fix the highlighted fields".to_string(),
            Self::Failed(msg) | Self::DeleteFailed(msg) => msg.clone(),
        }
    }

    /// Whether the caller should send the user back to sign in.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert!(PredictionError::SessionExpired
            .user_message()
            .contains("expired"));
        assert_eq!(
            PredictionError::Failed("Models not loaded".into()).user_message(),
            "Models not loaded"
        );
    }

    #[test]
    fn test_requires_reauth() {
        assert!(PredictionError::Unauthenticated.requires_reauth());
        assert!(PredictionError::SessionExpired.requires_reauth());
        assert!(!PredictionError::Failed("x".into()).requires_reauth());
        assert!(!PredictionError::DeleteFailed("x".into()).requires_reauth());
    }
}
