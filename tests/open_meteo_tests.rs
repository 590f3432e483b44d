//! OpenMeteoClient against a mock upstream.

use tempgate::config::WeatherConfig;
use tempgate::weather::{ForecastSource, OpenMeteoClient, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body(hours: i64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.41,
        "hourly_units": { "time": "unixtime", "temperature_2m": "°C" },
        "hourly": {
            "time": (0..hours).map(|h| 1_717_200_000 + h * 3600).collect::<Vec<_>>(),
            "temperature_2m": (0..hours).map(|h| 10.0 + h as f64).collect::<Vec<_>>(),
        }
    })
}

fn client_for(server: &MockServer, cache_ttl_secs: u64) -> OpenMeteoClient {
    OpenMeteoClient::new(&WeatherConfig {
        base_url: format!("{}/v1/forecast", server.uri()),
        timeout_secs: 5,
        cache_ttl_secs,
        max_attempts: 3,
        backoff_ms: 1,
    })
    .unwrap()
}

#[tokio::test]
async fn sends_expected_query_and_decodes_hourly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.5"))
        .and(query_param("longitude", "13.4"))
        .and(query_param("hourly", "temperature_2m"))
        .and(query_param("timezone", "UTC"))
        .and(query_param("timeformat", "unixtime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(24)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let series = client.hourly_temperature(52.5, 13.4).await.unwrap();

    assert_eq!(series.time.len(), 24);
    assert_eq!(series.temperature_2m[0], Some(10.0));
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(3)))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let series = client.hourly_temperature(1.0, 2.0).await.unwrap();

    assert_eq!(series.time.len(), 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.hourly_temperature(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, WeatherError::Status { status, .. } if status.as_u16() == 500));
}

#[tokio::test]
async fn client_errors_are_not_retried_and_keep_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.hourly_temperature(1.0, 2.0).await.unwrap_err();

    match err {
        WeatherError::Status { status, reason } => {
            assert_eq!(status.as_u16(), 400);
            assert!(reason.contains("Latitude"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_hourly_block_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "latitude": 1.0 })))
        .mount(&server)
        .await;

    let client = client_for(&server, 3600);
    let err = client.hourly_temperature(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, WeatherError::NoData));
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.hourly_temperature(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, WeatherError::Decode(_)));
}

#[tokio::test]
async fn repeated_lookups_are_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, 3600);
    let first = client.hourly_temperature(10.0, 20.0).await.unwrap();
    let second = client.hourly_temperature(10.0, 20.0).await.unwrap();
    assert_eq!(first, second);

    // different coordinates miss the cache
    client.hourly_temperature(11.0, 20.0).await.unwrap();

    assert_eq!(client.cache().len(), 2);
}
