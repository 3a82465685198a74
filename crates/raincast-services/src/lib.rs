//! Prediction service client, history and risk classification.

pub mod backend;
pub mod error;
pub mod prediction;
pub mod repository;
pub mod risk;
pub mod types;

pub use backend::{PredictionBackend, PredictionResult};
pub use error::PredictionError;
pub use prediction::PredictionClient;
pub use repository::PredictionRepository;
pub use risk::{ConfidenceBucket, RiskFilter, RiskTier, UnknownRiskLevel};
pub use types::*;
