//! Integration tests for the forecast, geocoding and position clients
//! against wiremock servers.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxboard_weather::{
    ForecastProvider, GeocodingClient, Location, LocationError, Locator, RetryConfig,
    WeatherError,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn geocoder(server: &MockServer) -> GeocodingClient {
    GeocodingClient::new(
        format!("{}/v1/search", server.uri()),
        format!("{}/reverse", server.uri()),
        TIMEOUT,
    )
    .unwrap()
    .with_retry(RetryConfig::none())
}

fn forecaster(server: &MockServer) -> ForecastProvider {
    ForecastProvider::new(format!("{}/v1/forecast", server.uri()), TIMEOUT)
        .unwrap()
        .with_retry(RetryConfig::none())
}

#[tokio::test]
async fn test_search_maps_results_in_rank_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Springfield"))
        .and(query_param("count", "6"))
        .and(query_param("language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"id": 1, "name": "Springfield", "latitude": 39.8, "longitude": -89.64,
                 "admin1": "Illinois", "country": "United States"},
                {"id": 2, "name": "Springfield", "latitude": 37.21, "longitude": -93.29,
                 "admin1": "Missouri", "country": "United States"}
            ],
            "generationtime_ms": 0.5
        })))
        .mount(&server)
        .await;

    let client = geocoder(&server).with_language("de");
    let results = client.search("Springfield", 6).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].display_name(), "Springfield, Illinois, United States");
    assert_eq!(results[1].admin1.as_deref(), Some("Missouri"));
}

#[tokio::test]
async fn test_search_without_results_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generationtime_ms": 0.2})),
        )
        .mount(&server)
        .await;

    let results = geocoder(&server).search("Qwxzv", 1).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true, "reason": "Parameter count must be between 1 and 100."
        })))
        .mount(&server)
        .await;

    let result = geocoder(&server).search("Berlin", 0).await;
    assert!(matches!(result, Err(WeatherError::Status(400))));
}

#[tokio::test]
async fn test_search_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Oslo", "latitude": 59.91, "longitude": 10.75, "country": "Norway"}]
        })))
        .mount(&server)
        .await;

    let client = geocoder(&server).with_retry(RetryConfig::new(2, 1, 5));
    let results = client.search("Oslo", 1).await.unwrap();
    assert_eq!(results[0].name, "Oslo");
}

#[tokio::test]
async fn test_reverse_geocode_label() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Seattle, King County, Washington, United States",
            "address": {"city": "Seattle", "county": "King County",
                        "state": "Washington", "country": "United States"}
        })))
        .mount(&server)
        .await;

    let client = geocoder(&server);
    let label = client.label_for(&Location::new(47.6062, -122.3321)).await;
    assert_eq!(label.as_deref(), Some("Seattle, Washington, United States"));
}

#[tokio::test]
async fn test_reverse_geocode_failure_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(geocoder(&server).reverse(1.0, 2.0).await.is_none());
}

#[tokio::test]
async fn test_forecast_request_parameters_and_parse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.405"))
        .and(query_param("forecast_days", "3"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 52.52,
            "longitude": 13.419998,
            "daily": {
                "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
                "temperature_2m_min": [27.7, 30.0, 32.5],
                "temperature_2m_max": [35.4, 36.0, 37.4],
                "weathercode": [0, 61, 3]
            }
        })))
        .mount(&server)
        .await;

    let provider = forecaster(&server).with_days(3).with_fahrenheit(true);
    let days = provider.fetch_daily(52.52, 13.405).await.unwrap();

    assert_eq!(days.len(), 3);
    assert_eq!(days[2].weather_code, Some(3));
    assert_eq!(days[0].max, 35.4);
}

#[tokio::test]
async fn test_forecast_missing_daily_block() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"latitude": 1.0})))
        .mount(&server)
        .await;

    let result = forecaster(&server).fetch_daily(1.0, 2.0).await;
    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_forecast_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = forecaster(&server).fetch_daily(1.0, 2.0).await;
    assert!(matches!(result, Err(WeatherError::Status(404))));
}

#[tokio::test]
async fn test_ip_locator_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7", "city": "Lisbon", "latitude": 38.72, "longitude": -9.14
        })))
        .mount(&server)
        .await;

    let locator = Locator::ip(format!("{}/json/", server.uri())).unwrap();
    let loc = locator.current_location(TIMEOUT).await.unwrap();
    assert_eq!(loc.latitude, 38.72);
    assert_eq!(loc.city_name.as_deref(), Some("Lisbon"));
}

#[tokio::test]
async fn test_ip_locator_forbidden_is_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let locator = Locator::ip(server.uri()).unwrap();
    let result = locator.current_location(TIMEOUT).await;
    assert!(matches!(result, Err(LocationError::PermissionDenied)));
}

#[tokio::test]
async fn test_ip_locator_missing_coordinates_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": true})))
        .mount(&server)
        .await;

    let locator = Locator::ip(server.uri()).unwrap();
    let result = locator.current_location(TIMEOUT).await;
    assert!(matches!(result, Err(LocationError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_ip_locator_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"latitude": 1.0, "longitude": 2.0}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let locator = Locator::ip(server.uri()).unwrap();
    let result = locator.current_location(Duration::from_millis(100)).await;
    assert!(matches!(result, Err(LocationError::Timeout)));
}
