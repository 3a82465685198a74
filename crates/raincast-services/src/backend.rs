//! Prediction service backend trait.
//!
//! `PredictionClient` is the HTTP implementation; views and the repository
//! only depend on this trait so tests can drive them without a server.

use std::future::Future;

use raincast_weather::FeatureVector;

use crate::error::PredictionError;
use crate::types::{PredictionOutcome, PredictionRecord};

/// Result type for prediction backend operations.
pub type PredictionResult<T> = Result<T, PredictionError>;

pub trait PredictionBackend: Send + Sync {
    /// Submit a feature vector for prediction.
    ///
    /// # Errors
    /// `Validation` for an invalid vector, `Unauthenticated` without a
    /// credential, `SessionExpired` on server rejection, `Failed` otherwise.
    fn submit(
        &self,
        vector: &FeatureVector,
    ) -> impl Future<Output = PredictionResult<PredictionOutcome>> + Send;

    /// Fetch the principal's prediction history.
    fn list(&self) -> impl Future<Output = PredictionResult<Vec<PredictionRecord>>> + Send;

    /// Delete one record. Deleting an already-deleted record succeeds.
    fn delete(&self, id: &str) -> impl Future<Output = PredictionResult<()>> + Send;
}
