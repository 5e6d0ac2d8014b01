use serde::{Deserialize, Serialize};
use wxboard_weather::Suggestion;

/// Two places closer than this in both latitude and longitude (degrees)
/// are the same place.
pub const COORD_TOLERANCE: f64 = 1e-6;

/// Label used for the geo place when no human-readable name is available.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// A tracked location: either the device's live position or a city the user
/// added. Field names match the persisted JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub is_geo: bool,
}

impl Place {
    /// A manually added city resolved from a search candidate.
    pub fn from_suggestion(suggestion: &Suggestion) -> Self {
        Self {
            id: new_id(),
            name: suggestion.name.clone(),
            display_name: suggestion.display_name(),
            lat: Some(suggestion.latitude),
            lon: Some(suggestion.longitude),
            is_geo: false,
        }
    }

    /// The device-position place.
    pub fn geo(latitude: f64, longitude: f64, label: &str) -> Self {
        Self {
            id: new_id(),
            name: short_name(label),
            display_name: label.to_string(),
            lat: Some(latitude),
            lon: Some(longitude),
            is_geo: true,
        }
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    /// True when both places have coordinates within `COORD_TOLERANCE` on
    /// both axes. Places without coordinates never match.
    pub fn same_coords(&self, lat: f64, lon: f64) -> bool {
        match self.coords() {
            Some((a, b)) => (a - lat).abs() < COORD_TOLERANCE && (b - lon).abs() < COORD_TOLERANCE,
            None => false,
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// First component of a "City, Region, Country" label.
pub(crate) fn short_name(label: &str) -> String {
    label
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(label)
        .to_string()
}
