use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the saved place list
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upstream API endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Forecast request and display settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Suggestion dropdown behaviour
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,

    /// Device position lookup
    #[serde(default)]
    pub location: LocationConfig,

    /// Backoff for forecast and geocoding requests
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wxboard")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    /// Per-request timeout applied by every HTTP client
    pub request_timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            reverse_geocoding_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit symbol used when rendering a temperature. `Auto` renders as Celsius.
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Auto | TemperatureUnit::Celsius => "°C",
        }
    }

    pub fn is_fahrenheit(&self) -> bool {
        matches!(self, TemperatureUnit::Fahrenheit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of days requested from the forecast API
    pub days: u32,

    /// Language passed to geocoding search
    pub language: String,

    pub temperature_unit: TemperatureUnit,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: 3,
            language: "en".to_string(),
            temperature_unit: TemperatureUnit::Auto,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    /// Quiet period after the last keystroke before suggestions are fetched
    pub debounce_ms: u64,

    /// Maximum number of suggestions requested per query
    pub suggestion_limit: u32,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            suggestion_limit: 6,
        }
    }
}

impl AutocompleteConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// When false every position request is treated as denied
    pub enabled: bool,

    /// Try to detect the current position silently at startup
    pub detect_on_startup: bool,

    pub timeout_secs: u64,

    /// IP geolocation endpoint (ipapi.co response format)
    pub ip_lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_on_startup: true,
            timeout_secs: 10,
            ip_lookup_url: "https://ipapi.co/json/".to_string(),
        }
    }
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key under which the place list is stored
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: "places".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            providers: ProvidersConfig::default(),
            forecast: ForecastConfig::default(),
            autocomplete: AutocompleteConfig::default(),
            location: LocationConfig::default(),
            retry: RetrySettings::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!("No config at {}, writing defaults", config_path.display());
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()))
                .context("Configuration validation failed");
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.providers.forecast_url, "providers.forecast_url", &mut result);
        self.validate_url(&self.providers.geocoding_url, "providers.geocoding_url", &mut result);
        self.validate_url(
            &self.providers.reverse_geocoding_url,
            "providers.reverse_geocoding_url",
            &mut result,
        );
        self.validate_url(&self.location.ip_lookup_url, "location.ip_lookup_url", &mut result);

        if self.providers.request_timeout_secs == 0 {
            result.add_error(
                "providers.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        // Open-Meteo serves at most 16 days
        if self.forecast.days == 0 || self.forecast.days > 16 {
            result.add_error("forecast.days", "Forecast days must be between 1 and 16");
        } else if self.forecast.days < 3 {
            result.add_warning(
                "forecast.days",
                "Fewer than 3 days requested; some day labels will stay empty",
            );
        }

        if self.forecast.language.trim().is_empty() {
            result.add_error("forecast.language", "Language must not be empty");
        }

        if self.autocomplete.suggestion_limit == 0 {
            result.add_error(
                "autocomplete.suggestion_limit",
                "Suggestion limit must be greater than 0",
            );
        } else if self.autocomplete.suggestion_limit > 100 {
            result.add_warning(
                "autocomplete.suggestion_limit",
                "Suggestion limit is unusually large (>100)",
            );
        }

        if self.autocomplete.debounce_ms == 0 {
            result.add_warning(
                "autocomplete.debounce_ms",
                "Debounce disabled; every keystroke issues a request",
            );
        }

        if self.location.timeout_secs == 0 {
            result.add_error("location.timeout_secs", "Location timeout must be greater than 0");
        }

        if !self.location.enabled && self.location.detect_on_startup {
            result.add_warning(
                "location.detect_on_startup",
                "Startup detection has no effect while location is disabled",
            );
        }

        if self.storage.key.trim().is_empty() {
            result.add_error("storage.key", "Storage key must not be empty");
        } else if self
            .storage
            .key
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        {
            result.add_error(
                "storage.key",
                "Storage key may only contain letters, digits, '-' and '_'",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("platform config directory".to_string()))
            .context("Failed to get config directory")?
            .join("wxboard");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.providers.forecast_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "providers.forecast_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.providers.geocoding_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_forecast_days_out_of_range() {
        let mut config = Config::default();
        config.forecast.days = 0;
        assert!(!config.validate().is_valid());

        config.forecast.days = 17;
        assert!(!config.validate().is_valid());

        config.forecast.days = 2;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "forecast.days"));
    }

    #[test]
    fn test_zero_suggestion_limit() {
        let mut config = Config::default();
        config.autocomplete.suggestion_limit = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "autocomplete.suggestion_limit"));
    }

    #[test]
    fn test_storage_key_rejects_path_separators() {
        let mut config = Config::default();
        config.storage.key = "../places".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "storage.key"));
    }

    #[test]
    fn test_disabled_location_with_startup_detection_is_warning() {
        let mut config = Config::default();
        config.location.enabled = false;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "location.detect_on_startup"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_temperature_unit_symbol() {
        assert_eq!(TemperatureUnit::Auto.symbol(), "°C");
        assert_eq!(TemperatureUnit::Celsius.symbol(), "°C");
        assert_eq!(TemperatureUnit::Fahrenheit.symbol(), "°F");
    }

    #[test]
    fn test_load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let second = Config::load_from(&path).unwrap();
        assert_eq!(first.forecast.days, second.forecast.days);
        assert_eq!(first.providers.forecast_url, second.providers.forecast_url);
    }

    #[test]
    fn test_partial_file_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[autocomplete]\ndebounce_ms = 50\nsuggestion_limit = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.autocomplete.debounce_ms, 50);
        assert_eq!(config.autocomplete.suggestion_limit, 3);
        assert_eq!(config.forecast.days, 3);
        assert_eq!(config.storage.key, "places");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
