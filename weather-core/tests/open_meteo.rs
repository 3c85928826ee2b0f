//! Open-Meteo provider against a mock HTTP server.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use weather_core::{
    GeoLocation, GeoResolver, LookupError, OpenMeteoConfig, OpenMeteoProvider, WeatherFetcher,
    WeatherService,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider_for(server: &MockServer) -> OpenMeteoProvider {
    let config = OpenMeteoConfig {
        geocoding_url: format!("{}/v1/search", server.uri()),
        forecast_url: format!("{}/v1/forecast", server.uri()),
        ..Default::default()
    };
    OpenMeteoProvider::new(reqwest::Client::new(), config)
}

fn moscow() -> GeoLocation {
    GeoLocation {
        latitude: 55.75222,
        longitude: 37.61556,
        name: "Москва".into(),
    }
}

fn geocoding_body() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "id": 524901,
                "name": "Москва",
                "latitude": 55.75222,
                "longitude": 37.61556,
                "country_code": "RU",
                "population": 10381222
            },
            {
                "id": 4401618,
                "name": "Москва",
                "latitude": 46.73239,
                "longitude": -117.00017,
                "country_code": "US"
            }
        ],
        "generationtime_ms": 0.7
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 55.75,
        "longitude": 37.625,
        "current_units": {
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "m/s",
            "apparent_temperature": "°C"
        },
        "current": {
            "time": "2024-05-01T12:00",
            "interval": 900,
            "temperature_2m": 20.46,
            "relative_humidity_2m": 55,
            "wind_speed_10m": 3.12,
            "apparent_temperature": 19.0
        }
    })
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn resolve_sends_expected_query_and_picks_first_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "москва"))
        .and(query_param("count", "10"))
        .and(query_param("language", "ru"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .expect(1)
        .mount(&server)
        .await;

    let location = provider_for(&server)
        .resolve("москва", &CancellationToken::new())
        .await
        .expect("resolved");

    assert_eq!(location, moscow());
}

#[tokio::test]
async fn resolve_url_encodes_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "san josé & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .resolve("san josé & co", &CancellationToken::new())
        .await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn resolve_empty_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [] })),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("nowhere", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, LookupError::NotFound(ref name) if name == "nowhere"),
        "{err:?}"
    );
}

#[tokio::test]
async fn resolve_absent_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "generationtime_ms": 0.3 })),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("nowhere", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn resolve_http_error_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("moscow", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, LookupError::Network(ref msg) if msg.contains("500")),
        "{err:?}"
    );
}

#[tokio::test]
async fn resolve_malformed_json_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("moscow", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn resolve_wrong_shape_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [{ "name": "Москва" }] })),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("moscow", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn resolve_blank_name_is_invalid_input_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .resolve("   ", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::InvalidInput), "{err:?}");
}

#[tokio::test]
async fn resolve_honors_cancellation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(geocoding_body())
                .set_delay(std::time::Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let provider = provider_for(&server);
    let pending = provider.resolve("moscow", &cancel);
    cancel.cancel();

    let err = tokio::time::timeout(std::time::Duration::from_secs(5), pending)
        .await
        .expect("cancellation should abort promptly")
        .unwrap_err();
    assert!(matches!(err, LookupError::Cancelled), "{err:?}");
}

// ============================================================================
// Forecast
// ============================================================================

#[tokio::test]
async fn fetch_sends_expected_query_and_returns_values_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "55.75222"))
        .and(query_param("longitude", "37.61556"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,wind_speed_10m,apparent_temperature",
        ))
        .and(query_param("wind_speed_unit", "ms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let weather = provider_for(&server)
        .fetch(&moscow(), &CancellationToken::new())
        .await
        .expect("fetched");

    assert_eq!(weather.temperature, 20.46);
    assert_eq!(weather.relative_humidity, 55);
    assert_eq!(weather.wind_speed, 3.12);
    assert_eq!(weather.apparent_temperature, 19.0);
}

#[tokio::test]
async fn fetch_formats_negative_coordinates_invariantly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5"))
        .and(query_param("longitude", "-0.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let london = GeoLocation {
        latitude: 51.5,
        longitude: -0.12,
        name: "Лондон".into(),
    };
    let result = provider_for(&server)
        .fetch(&london, &CancellationToken::new())
        .await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn fetch_missing_humidity_is_incomplete_data() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "current": {
            "temperature_2m": 20.46,
            "wind_speed_10m": 3.12,
            "apparent_temperature": 19.0
        }
    });

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch(&moscow(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::IncompleteData), "{err:?}");
}

#[tokio::test]
async fn fetch_http_error_is_network_error() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "error": true,
        "reason": "Latitude must be in range of -90 to 90°."
    });

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(body))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .fetch(&moscow(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let config = OpenMeteoConfig {
        forecast_url: "http://127.0.0.1:9/v1/forecast".into(),
        ..Default::default()
    };
    let provider = OpenMeteoProvider::new(reqwest::Client::new(), config);

    let err = provider
        .fetch(&moscow(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Network(_)), "{err:?}");
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn service_chains_geocoding_and_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "москва"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "55.75222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let provider = Arc::new(provider_for(&server));
    let service = WeatherService::new(provider.clone(), provider);

    let report = service
        .report("Москва", &CancellationToken::new())
        .await
        .expect("report");

    assert!(report.starts_with("🌆 *Москва*"));
    assert!(report.contains("20\\.5°C"));
    assert!(report.contains("55%"));
}
