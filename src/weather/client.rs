use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::{debug, info};

use super::{
    cache::ResponseCache,
    retry::{with_retry, RetryPolicy},
    types::{ForecastResponse, HourlySeries, UpstreamErrorBody, WeatherError},
};
use crate::config::WeatherConfig;

const HOURLY_VARIABLE: &str = "temperature_2m";
const USER_AGENT: &str = concat!("tempgate/", env!("CARGO_PKG_VERSION"));

/// Source of hourly temperature forecasts for a coordinate.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn hourly_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<HourlySeries, WeatherError>;
}

/// Open-Meteo client with retry and a response cache, built once per process.
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl OpenMeteoClient {
    pub fn new(cfg: &WeatherConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid forecast url {}", cfg.base_url))?;
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("build forecast http client")?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::from_config(cfg),
            cache: ResponseCache::new(cfg.cache_ttl()),
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &latitude.to_string())
            .append_pair("longitude", &longitude.to_string())
            .append_pair("hourly", HOURLY_VARIABLE)
            .append_pair("timezone", "UTC")
            .append_pair("timeformat", "unixtime");
        url
    }

    async fn fetch(&self, url: &Url) -> Result<Bytes, WeatherError> {
        let response = with_retry(&self.retry, || self.client.get(url.clone()).send()).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<UpstreamErrorBody>(&body)
                .ok()
                .and_then(|b| b.reason)
                .unwrap_or(body);
            return Err(WeatherError::Status { status, reason });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn hourly_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<HourlySeries, WeatherError> {
        let url = self.forecast_url(latitude, longitude);
        let key = url.to_string();

        let (body, cached) = match self.cache.get(&key) {
            Some(body) => {
                debug!(%latitude, %longitude, "forecast cache hit");
                (body, true)
            }
            None => (self.fetch(&url).await?, false),
        };

        let parsed: ForecastResponse =
            serde_json::from_slice(&body).map_err(|e| WeatherError::Decode(e.to_string()))?;
        let hourly = parsed.hourly.ok_or(WeatherError::NoData)?;
        if hourly.time.is_empty() || hourly.temperature_2m.is_empty() {
            return Err(WeatherError::NoData);
        }

        if !cached {
            info!(%latitude, %longitude, hours = hourly.time.len(), "forecast fetched");
            self.cache.insert(key, body);
        }
        Ok(hourly)
    }
}
