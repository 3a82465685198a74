pub mod config;
pub mod error;
pub mod submit_state;

pub use config::{
    Config, ConfigValidation, LocationConfig, NotificationConfig, ServiceConfig, WeatherConfig,
};
pub use error::{AppError, ConfigError, Presentation};
pub use submit_state::{InFlight, SubmitState};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Raincast core initialized");
    Ok(())
}
