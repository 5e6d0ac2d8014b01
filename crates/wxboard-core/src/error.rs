//! Centralized error types for the dashboard.
//!
//! Every operation boundary converts its failure into one of these types and
//! shows `user_message()` inline. Nothing here is meant to crash a session.

use thiserror::Error;

/// Failure that stops the dashboard from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Recover the typed cause from an error chain built with `.context()`.
    pub fn classify(err: anyhow::Error) -> Self {
        match err.downcast::<ConfigError>() {
            Ok(config) => AppError::Config(config),
            Err(other) => AppError::Other(other),
        }
    }

    /// Returns a user-friendly message suitable for inline display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Failures of the place list operations (add, locate, forecast load).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaceError {
    #[error("Empty place query")]
    EmptyQuery,

    #[error("No place matches \"{0}\"")]
    NotFound(String),

    #[error("Place already tracked: {0}")]
    Duplicate(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

impl PlaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaceError::EmptyQuery => "Enter a city name",
            PlaceError::NotFound(_) => "City not found",
            PlaceError::Duplicate(_) => "City is already in the list",
            PlaceError::NetworkFailure(_) => "Could not reach the weather service",
            PlaceError::PermissionDenied => "Location access was denied",
            PlaceError::PositionUnavailable(_) => "Current location is unavailable",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Local persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Stored data is corrupt: {0}")]
    Corruption(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "Saved places could not be accessed.",
            StorageError::WriteFailed(_) => "Saved places could not be updated.",
            StorageError::Corruption(_) => "Saved places were unreadable and have been reset.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
