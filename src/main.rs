mod terminal;

use anyhow::{Context, Result};
use wxboard_core::{AppError, Config};
use wxboard_places::{
    intent_channel, Autocomplete, Dashboard, PlaceListManager, PlaceStore, StorageBackend,
};
use wxboard_weather::{ForecastProvider, GeocodingClient, Locator, RetryConfig};

use crate::terminal::{Rows, TerminalView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    wxboard_core::init()?;

    let (config, _validation) = Config::load_validated().map_err(startup_error)?;
    tracing::info!("Data directory: {}", config.data_dir.display());

    let retry = RetryConfig::new(
        config.retry.max_retries,
        config.retry.initial_delay_ms,
        config.retry.max_delay_ms,
    );
    let timeout = config.providers.request_timeout();

    let geocoder = GeocodingClient::new(
        &config.providers.geocoding_url,
        &config.providers.reverse_geocoding_url,
        timeout,
    )
    .context("Failed to build geocoding client")?
    .with_language(&config.forecast.language)
    .with_retry(retry.clone());

    let forecasts = ForecastProvider::new(&config.providers.forecast_url, timeout)
        .context("Failed to build forecast client")?
        .with_days(config.forecast.days)
        .with_fahrenheit(config.forecast.temperature_unit.is_fahrenheit())
        .with_retry(retry);

    let locator = if config.location.enabled {
        Locator::ip(&config.location.ip_lookup_url).context("Failed to build position client")?
    } else {
        tracing::info!("Position lookup disabled");
        Locator::Disabled
    };

    let store = PlaceStore::new(
        StorageBackend::file(&config.data_dir),
        config.storage.key.clone(),
    );

    let rows = Rows::default();
    let manager = PlaceListManager::new(
        store,
        geocoder.clone(),
        forecasts,
        locator,
        Box::new(TerminalView::new(rows.clone())),
    )
    .with_unit(config.forecast.temperature_unit)
    .with_location_timeout(config.location.timeout());

    let (tx, rx) = intent_channel();
    let autocomplete = Autocomplete::new(
        geocoder,
        tx.clone(),
        config.autocomplete.debounce(),
        config.autocomplete.suggestion_limit,
    );

    let mut dashboard = Dashboard::new(manager, autocomplete)
        .with_startup_detection(config.location.detect_on_startup);

    println!("wxboard: three-day forecasts for your places (type help)");
    dashboard.startup().await;

    let input = tokio::spawn(terminal::read_input(tx, rows));
    dashboard.run(rx).await;
    input.abort();

    tracing::info!("wxboard stopped");
    Ok(())
}

/// Print the short explanation for a failed startup and hand the error back
/// for the exit status.
fn startup_error(err: anyhow::Error) -> AppError {
    let err = AppError::classify(err);
    eprintln!("{}", err.user_message());
    err
}
