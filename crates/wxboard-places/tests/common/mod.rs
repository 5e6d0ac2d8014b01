//! Shared fixtures for the place list integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxboard_places::{
    CardState, Place, PlaceListManager, PlaceStore, PlaceView, StorageBackend,
};
use wxboard_weather::{ForecastProvider, GeocodingClient, Locator, RetryConfig, Suggestion};

pub const TIMEOUT: Duration = Duration::from_secs(5);
pub const KEY: &str = "places";

/// Everything a view was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Added(String, usize),
    Updated(String),
    Removed(String),
    Card(String, CardState),
    Header(Option<String>),
    FormError(Option<String>),
    Suggestions(Vec<String>),
    Input(String),
}

#[derive(Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Final state of each card transition for `id`, in order.
    pub fn cards_for(&self, id: &str) -> Vec<CardState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Card(card, state) if card == id => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn last_card(&self, id: &str) -> Option<CardState> {
        self.cards_for(id).pop()
    }

    pub fn last_header(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::Header(h) => Some(h),
            _ => None,
        })
    }

    pub fn last_form_error(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::FormError(m) => Some(m),
            _ => None,
        })
    }

    pub fn last_suggestions(&self) -> Option<Vec<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::Suggestions(s) => Some(s),
            _ => None,
        })
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl PlaceView for RecordingView {
    fn place_added(&mut self, place: &Place, index: usize) {
        self.push(Event::Added(place.id.clone(), index));
    }

    fn place_updated(&mut self, place: &Place) {
        self.push(Event::Updated(place.id.clone()));
    }

    fn place_removed(&mut self, id: &str) {
        self.push(Event::Removed(id.to_string()));
    }

    fn card_state(&mut self, id: &str, state: &CardState) {
        self.push(Event::Card(id.to_string(), state.clone()));
    }

    fn location_header(&mut self, label: Option<&str>) {
        self.push(Event::Header(label.map(str::to_string)));
    }

    fn form_error(&mut self, message: Option<&str>) {
        self.push(Event::FormError(message.map(str::to_string)));
    }

    fn suggestions(&mut self, items: &[Suggestion]) {
        self.push(Event::Suggestions(
            items.iter().map(Suggestion::display_name).collect(),
        ));
    }

    fn input_text(&mut self, text: &str) {
        self.push(Event::Input(text.to_string()));
    }
}

pub fn geocoder(server: &MockServer) -> GeocodingClient {
    GeocodingClient::new(
        format!("{}/v1/search", server.uri()),
        format!("{}/reverse", server.uri()),
        TIMEOUT,
    )
    .unwrap()
    .with_retry(RetryConfig::none())
}

pub fn forecaster(server: &MockServer) -> ForecastProvider {
    ForecastProvider::new(format!("{}/v1/forecast", server.uri()), TIMEOUT)
        .unwrap()
        .with_retry(RetryConfig::none())
}

pub fn manager(
    server: &MockServer,
    backend: &StorageBackend,
    locator: Locator,
) -> (PlaceListManager, RecordingView) {
    let view = RecordingView::default();
    let manager = PlaceListManager::new(
        PlaceStore::new(backend.clone(), KEY),
        geocoder(server),
        forecaster(server),
        locator,
        Box::new(view.clone()),
    );
    (manager, view)
}

pub fn saved(backend: &StorageBackend) -> Vec<Place> {
    PlaceStore::new(backend.clone(), KEY).load()
}

pub fn search_result(name: &str, country: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "results": [
            {"name": name, "country": country, "latitude": lat, "longitude": lon}
        ]
    })
}

pub fn suggestion(name: &str, country: &str, lat: f64, lon: f64) -> Suggestion {
    Suggestion {
        name: name.to_string(),
        admin1: None,
        country: Some(country.to_string()),
        latitude: lat,
        longitude: lon,
    }
}

pub async fn mount_search(server: &MockServer, query: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// The three-day forecast used throughout: −2.4/1.9 clear, −1.1/2.2 rain,
/// 0.3/3.0 overcast.
pub fn scenario_forecast() -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.41,
        "daily": {
            "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
            "temperature_2m_min": [-2.4, -1.1, 0.3],
            "temperature_2m_max": [1.9, 2.2, 3.0],
            "weathercode": [0, 61, 3]
        }
    })
}

pub async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scenario_forecast()))
        .mount(server)
        .await;
}

pub fn rendered_text(state: &CardState) -> Vec<String> {
    match state {
        CardState::Rendered(lines) => lines.iter().map(ToString::to_string).collect(),
        other => panic!("card not rendered: {:?}", other),
    }
}

pub fn scenario_lines() -> Vec<String> {
    vec![
        "Today: −2°C — 2°C, Clear".to_string(),
        "Tomorrow: −1°C — 2°C, Rain".to_string(),
        "Day after tomorrow: 0°C — 3°C, Overcast".to_string(),
    ]
}
