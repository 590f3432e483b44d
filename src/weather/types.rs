use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Hourly block of an Open-Meteo forecast requested with `timeformat=unixtime`.
///
/// `time` and `temperature_2m` are parallel arrays; the upstream reports hours
/// without data as `null`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<i64>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub hourly: Option<HourlySeries>,
}

/// Error body returned by Open-Meteo on 4xx, e.g. `{"error":true,"reason":"..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamErrorBody {
    pub reason: Option<String>,
}

/// One hourly temperature reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRecord {
    pub timestamp: OffsetDateTime,
    pub temperature_2m: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {status}: {reason}")]
    Status {
        status: reqwest::StatusCode,
        reason: String,
    },
    #[error("could not decode upstream response: {0}")]
    Decode(String),
    #[error("temperature data not available in upstream response")]
    NoData,
}
