//! Prediction view: locate, build features, edit, submit.
//!
//! Every pending call races the view's cancellation token. Once the view is
//! torn down no result is written back.

use std::sync::Arc;

use raincast_core::{AppError, Presentation, SubmitState};
use raincast_services::{PredictionBackend, PredictionOutcome};
use raincast_weather::{
    Coordinate, DisplayMetadata, Feature, FeatureEditor, FeatureVector, GeolocationSource,
    LocationResolver, Resolution, ValidationResult, WeatherFeatureBuilder,
};
use tokio_util::sync::CancellationToken;

use crate::error_mapping::IntoAppError;
use crate::notification::Notifier;

/// How a view operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Done,
    /// The view was torn down while the call was pending; nothing was written.
    Cancelled,
}

pub struct PredictionView<G, B> {
    resolver: LocationResolver<G>,
    builder: WeatherFeatureBuilder,
    backend: Arc<B>,
    notifier: Notifier,
    cancel: CancellationToken,
    submit_state: SubmitState,
    resolution: Option<Resolution>,
    editor: Option<FeatureEditor>,
    display: Option<DisplayMetadata>,
    outcome: Option<PredictionOutcome>,
    warning: Option<AppError>,
    error: Option<AppError>,
}

impl<G: GeolocationSource, B: PredictionBackend> PredictionView<G, B> {
    pub fn new(
        resolver: LocationResolver<G>,
        builder: WeatherFeatureBuilder,
        backend: Arc<B>,
        notifier: Notifier,
    ) -> Self {
        Self {
            resolver,
            builder,
            backend,
            notifier,
            cancel: CancellationToken::new(),
            submit_state: SubmitState::Idle,
            resolution: None,
            editor: None,
            display: None,
            outcome: None,
            warning: None,
            error: None,
        }
    }

    /// Handle for tearing the view down from elsewhere.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn vector(&self) -> Option<&FeatureVector> {
        self.editor.as_ref().map(FeatureEditor::vector)
    }

    pub fn field_errors(&self) -> Option<&ValidationResult> {
        self.editor.as_ref().map(FeatureEditor::errors)
    }

    pub fn display(&self) -> Option<&DisplayMetadata> {
        self.display.as_ref()
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        self.outcome.as_ref()
    }

    /// Non-fatal notice, e.g. the fallback location was used.
    pub fn warning(&self) -> Option<&AppError> {
        self.warning.as_ref()
    }

    /// In-place error with a retry affordance.
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.submit_state.can_submit()
            && self
                .editor
                .as_ref()
                .is_some_and(FeatureEditor::is_submittable)
    }

    /// Resolve a location and build the feature vector for it. Calling this
    /// again is the manual retry after a weather failure.
    pub async fn load(&mut self, explicit: Option<Coordinate>) -> Result<Settled, AppError> {
        let resolution = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Settled::Cancelled),
            r = self.resolver.resolve(explicit) => r,
        };
        if self.cancel.is_cancelled() {
            return Ok(Settled::Cancelled);
        }

        self.warning = resolution
            .warning
            .clone()
            .map(IntoAppError::into_app_error);
        let coordinate = resolution.coordinate;
        self.resolution = Some(resolution);

        let built = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Settled::Cancelled),
            b = self.builder.build(coordinate) => b,
        };
        if self.cancel.is_cancelled() {
            return Ok(Settled::Cancelled);
        }

        match built {
            Ok(bundle) => {
                self.error = None;
                self.outcome = None;
                self.display = Some(bundle.display);
                self.editor = Some(FeatureEditor::new(bundle.vector));
                Ok(Settled::Done)
            }
            Err(e) => {
                tracing::warn!("Weather fetch failed: {}", e);
                let message = e.to_string();
                self.error = Some(AppError::WeatherProvider(message.clone()));
                Err(AppError::WeatherProvider(message))
            }
        }
    }

    /// Apply raw user input to one field; only that field is re-validated.
    pub fn edit(&mut self, feature: Feature, raw: impl Into<String>) {
        if let Some(editor) = self.editor.as_mut() {
            editor.edit(feature, raw);
        }
    }

    /// Submit the current vector. Refused while a submission is in flight or
    /// while any field is invalid.
    pub async fn submit(&mut self) -> Result<Settled, AppError> {
        if !self.submit_state.can_submit() {
            return Err(AppError::PredictionFailed(
                "A prediction is already in progress".to_string(),
            ));
        }
        let Some(editor) = self.editor.as_ref() else {
            return Err(AppError::PredictionFailed(
                "Weather data is not loaded yet".to_string(),
            ));
        };
        if !editor.is_submittable() {
            return Err(AppError::Validation(editor.errors().clone().into_named()));
        }
        let vector = editor.vector().clone();

        // Settles on drop, including when this future is dropped mid-call
        let result = {
            let _in_flight = self.submit_state.enter();
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                r = self.backend.submit(&vector) => Some(r),
            }
        };

        let Some(result) = result.filter(|_| !self.cancel.is_cancelled()) else {
            return Ok(Settled::Cancelled);
        };

        match result {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                Ok(Settled::Done)
            }
            Err(e) => {
                let err = e.into_app_error();
                if err.presentation() == Presentation::Notification {
                    self.notifier.error(err.user_message());
                }
                Err(err)
            }
        }
    }
}
