//! Prediction service HTTP client.

use std::time::Duration;

use raincast_auth::SharedSession;
use raincast_weather::{FeatureValidator, FeatureVector};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::{PredictionBackend, PredictionResult};
use crate::error::{
    PredictionError, GENERIC_DELETE_FAILURE, GENERIC_HISTORY_FAILURE, GENERIC_PREDICTION_FAILURE,
};
use crate::types::{PredictionOutcome, PredictionRecord};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ServerError {
    error: Option<String>,
    message: Option<String>,
}

pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
    session: SharedSession,
}

impl PredictionClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: SharedSession,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Bearer header for the current credential. No credential, no request.
    fn auth_header(&self) -> PredictionResult<String> {
        let session = self.session.lock();
        let token = session.token().ok_or(PredictionError::Unauthenticated)?;
        Ok(format!("Bearer {}", token))
    }

    /// Submit a vector for prediction. The vector is re-validated first and
    /// never reaches the network when invalid.
    #[instrument(skip(self, vector), fields(area = %vector.area()), level = "info")]
    pub async fn submit_prediction(
        &self,
        vector: &FeatureVector,
    ) -> PredictionResult<PredictionOutcome> {
        let validation = FeatureValidator::validate(vector);
        if !validation.is_valid() {
            return Err(PredictionError::Validation(validation));
        }
        let body = vector.to_payload().map_err(|feature| {
            tracing::warn!("Field {} is not a number", feature);
            PredictionError::Failed(format!("{} must be a number", feature.display_name()))
        })?;
        let auth = self.auth_header()?;

        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_failure(e, GENERIC_PREDICTION_FAILURE))?;

        let outcome: PredictionOutcome = self
            .handle_response(response, GENERIC_PREDICTION_FAILURE)
            .await?;
        tracing::info!(
            "Prediction received: {:?} ({})",
            outcome.rainfall_prediction,
            outcome.risk_tier()
        );
        Ok(outcome)
    }

    /// Fetch the principal's prediction history.
    #[instrument(skip(self), level = "info")]
    pub async fn list_predictions(&self) -> PredictionResult<Vec<PredictionRecord>> {
        let auth = self.auth_header()?;
        let url = format!("{}/api/predictions", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", auth)
            .send()
            .await
            .map_err(|e| transport_failure(e, GENERIC_HISTORY_FAILURE))?;

        let records: Vec<PredictionRecord> = self
            .handle_response(response, GENERIC_HISTORY_FAILURE)
            .await?;
        tracing::debug!("Fetched {} predictions", records.len());
        Ok(records)
    }

    /// Delete one record. A 404 means it is already gone and counts as success.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_prediction(&self, id: &str) -> PredictionResult<()> {
        let auth = self.auth_header()?;
        let url = format!(
            "{}/api/predictions/{}",
            self.base_url,
            urlencoding::encode(id)
        );

        let response = self
            .client
            .delete(&url)
            .header("Authorization", auth)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Delete request failed: {}", e);
                PredictionError::DeleteFailed(GENERIC_DELETE_FAILURE.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Deleted prediction {}", id);
            Ok(())
        } else if status == StatusCode::NOT_FOUND {
            tracing::info!("Prediction {} already deleted", id);
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED {
            Err(self.expire_session())
        } else {
            let message = server_message(response, GENERIC_DELETE_FAILURE).await;
            tracing::error!("Delete returned {}: {}", status, message);
            Err(PredictionError::DeleteFailed(message))
        }
    }

    fn expire_session(&self) -> PredictionError {
        tracing::warn!("Credential rejected by prediction service");
        self.session.lock().expire();
        PredictionError::SessionExpired
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        generic: &str,
    ) -> PredictionResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                tracing::error!("Unreadable prediction service response: {}", e);
                PredictionError::Failed(generic.to_string())
            })
        } else if status == StatusCode::UNAUTHORIZED {
            Err(self.expire_session())
        } else {
            let message = server_message(response, generic).await;
            tracing::error!("Prediction service returned {}: {}", status, message);
            Err(PredictionError::Failed(message))
        }
    }
}

impl PredictionBackend for PredictionClient {
    async fn submit(&self, vector: &FeatureVector) -> PredictionResult<PredictionOutcome> {
        self.submit_prediction(vector).await
    }

    async fn list(&self) -> PredictionResult<Vec<PredictionRecord>> {
        self.list_predictions().await
    }

    async fn delete(&self, id: &str) -> PredictionResult<()> {
        self.delete_prediction(id).await
    }
}

fn transport_failure(e: reqwest::Error, generic: &str) -> PredictionError {
    tracing::warn!("Prediction service unreachable: {}", e);
    PredictionError::Failed(generic.to_string())
}

/// The `error` or `message` field of an error body, else the generic text.
async fn server_message(response: Response, generic: &str) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ServerError>(&text)
        .ok()
        .and_then(|e| e.error.or(e.message))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| generic.to_string())
}
