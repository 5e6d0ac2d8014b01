//! Current position lookup.
//!
//! A `Locator` is chosen once at startup. Every lookup is bounded by the
//! caller's timeout; a lookup that outlives it reports `Timeout`.

use crate::types::{Location, LocationError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

/// Position from IP geolocation (ipapi.co response format)
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Arc<Client>,
    url: String,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Result<Self, LocationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LocationError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            url: url.into(),
        })
    }

    async fn locate(&self) -> Result<Location, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        // ipapi.co answers 403 when lookups from this address are refused
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::ServiceUnavailable(format!("status {}", status)));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::ServiceUnavailable(e.to_string()))?;

        match (data.latitude, data.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Location {
                latitude,
                longitude,
                city_name: data.city.filter(|c| !c.is_empty()),
            }),
            _ => Err(LocationError::ServiceUnavailable(
                "lookup returned no coordinates".to_string(),
            )),
        }
    }
}

/// Source of the device position.
#[derive(Debug, Clone)]
pub enum Locator {
    /// IP-based lookup over HTTP
    Ip(IpLocator),

    /// A fixed position, e.g. configured by the user
    Fixed(Location),

    /// Position access turned off; every request is denied
    Disabled,
}

impl Locator {
    pub fn ip(url: impl Into<String>) -> Result<Self, LocationError> {
        Ok(Self::Ip(IpLocator::new(url)?))
    }

    /// Request the current position, waiting at most `timeout`.
    pub async fn current_location(&self, timeout: Duration) -> Result<Location, LocationError> {
        let lookup = async {
            match self {
                Self::Ip(locator) => locator.locate().await,
                Self::Fixed(location) => Ok(location.clone()),
                Self::Disabled => Err(LocationError::PermissionDenied),
            }
        };

        match tokio::time::timeout(timeout, lookup).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Position request exceeded {:?}", timeout);
                Err(LocationError::Timeout)
            }
        }
    }
}
