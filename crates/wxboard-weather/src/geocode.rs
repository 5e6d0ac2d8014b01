//! Place search and reverse geocoding.
//!
//! Search uses the Open-Meteo geocoding API. Reverse lookups use Nominatim
//! (OpenStreetMap) and are best-effort: every failure becomes `None`.

use crate::retry::{with_retry, RetryConfig};
use crate::types::{Location, ReversePlace, Suggestion, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("wxboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

impl From<SearchResult> for Suggestion {
    fn from(r: SearchResult) -> Self {
        Suggestion {
            name: r.name,
            admin1: r.admin1,
            country: r.country,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    fn into_place(self) -> Option<ReversePlace> {
        // Prefer city > town > village > municipality for the primary name
        let name = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.county)
            .or_else(|| self.state.clone())
            .or_else(|| self.country.clone())?;

        Some(ReversePlace {
            name,
            admin1: self.state,
            country: self.country,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Arc<Client>,
    search_url: String,
    reverse_url: String,
    language: String,
    retry: RetryConfig,
}

impl GeocodingClient {
    pub fn new(
        search_url: impl Into<String>,
        reverse_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            search_url: search_url.into(),
            reverse_url: reverse_url.into(),
            language: "en".to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Language used for search result names
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Search places by free text. Results keep the provider's ranking;
    /// an unmatched query yields an empty list.
    pub async fn search(&self, query: &str, count: u32) -> Result<Vec<Suggestion>, WeatherError> {
        let params = [
            ("name", query.to_string()),
            ("count", count.to_string()),
            ("language", self.language.clone()),
            ("format", "json".to_string()),
        ];

        let response = with_retry(&self.retry, || {
            self.client.get(&self.search_url).query(&params).send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Geocoding search returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!("Geocoding {:?} matched {} places", query, parsed.results.len());
        Ok(parsed.results.into_iter().map(Suggestion::from).collect())
    }

    /// Reverse geocode a coordinate pair.
    /// Returns `None` on any failure; callers fall back to a generic label.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<ReversePlace> {
        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("zoom", "10".to_string()),
        ];

        let response = match self.client.get(&self.reverse_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let place = body.address?.into_place()?;
        tracing::info!("Reverse geocoded to: {}", place.label());
        Some(place)
    }

    /// Human label for a position: the source's own city name when present,
    /// otherwise a reverse lookup.
    pub async fn label_for(&self, location: &Location) -> Option<String> {
        if let Some(city) = location.city_name.as_ref().filter(|c| !c.is_empty()) {
            return Some(city.clone());
        }

        self.reverse(location.latitude, location.longitude)
            .await
            .map(|place| place.label())
    }
}
