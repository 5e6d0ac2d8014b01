//! Daily forecast client for the Open-Meteo forecast API.

use crate::retry::{with_retry, RetryConfig};
use crate::types::{DailyForecast, WeatherError};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
}

impl DailyData {
    fn into_days(self) -> Result<Vec<DailyForecast>, WeatherError> {
        let len = self.time.len();
        if self.temperature_2m_min.len() != len
            || self.temperature_2m_max.len() != len
            || self.weathercode.len() != len
        {
            return Err(WeatherError::Parse(format!(
                "daily arrays differ in length (time={}, min={}, max={}, code={})",
                len,
                self.temperature_2m_min.len(),
                self.temperature_2m_max.len(),
                self.weathercode.len()
            )));
        }

        self.time
            .into_iter()
            .zip(self.temperature_2m_min)
            .zip(self.temperature_2m_max)
            .zip(self.weathercode)
            .map(|(((time, min), max), code)| {
                let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d")
                    .map_err(|e| WeatherError::Parse(format!("bad date {:?}: {}", time, e)))?;
                let (min, max) = match (min, max) {
                    (Some(min), Some(max)) => (min, max),
                    _ => {
                        return Err(WeatherError::Parse(format!(
                            "missing temperature for {}",
                            date
                        )))
                    }
                };
                Ok(DailyForecast {
                    date,
                    min,
                    max,
                    weather_code: code,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ForecastProvider {
    client: Arc<Client>,
    base_url: String,
    days: u32,
    fahrenheit: bool,
    retry: RetryConfig,
}

impl ForecastProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            days: 3,
            fahrenheit: false,
            retry: RetryConfig::default(),
        })
    }

    /// Number of days requested per fetch
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Request temperatures in Fahrenheit instead of Celsius
    pub fn with_fahrenheit(mut self, fahrenheit: bool) -> Self {
        self.fahrenheit = fahrenheit;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the daily forecast for a coordinate pair, one entry per day.
    pub async fn fetch_daily(&self, latitude: f64, longitude: f64) -> Result<Vec<DailyForecast>, WeatherError> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", self.days.to_string()),
        ];
        if self.fahrenheit {
            params.push(("temperature_unit", "fahrenheit".to_string()));
        }

        tracing::debug!("Fetching forecast for {}, {}", latitude, longitude);

        let response = with_retry(&self.retry, || {
            self.client.get(&self.base_url).query(&params).send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        parsed
            .daily
            .ok_or_else(|| WeatherError::Parse("response has no daily block".to_string()))?
            .into_days()
    }
}
