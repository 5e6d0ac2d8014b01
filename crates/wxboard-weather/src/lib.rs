//! Weather and geocoding clients for wxboard
//!
//! Provides daily forecasts via the Open-Meteo API, place search and
//! reverse geocoding, and current position lookup.

pub mod types;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod retry;

pub use types::*;
pub use geocode::GeocodingClient;
pub use location::{IpLocator, Locator};
pub use provider::ForecastProvider;
pub use retry::RetryConfig;
