pub mod config;
pub mod error;

pub use config::{
    AutocompleteConfig, Config, ForecastConfig, LocationConfig, ProvidersConfig, RetrySettings,
    StorageConfig, TemperatureUnit, ValidationResult,
};
pub use error::{AppError, ConfigError, NetworkError, PlaceError, ReqwestErrorExt, StorageError};

use anyhow::Result;

/// Initialize logging for the dashboard. Logs go to stderr so they never
/// interleave with the rendered cards.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("wxboard core initialized");
    Ok(())
}
