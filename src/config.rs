use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Upstream forecast API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".into(),
            timeout_secs: 10,
            cache_ttl_secs: 60 * 60,
            max_attempts: 5,
            backoff_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub weather: WeatherConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tempgate".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tempgate-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 15),
        };

        let defaults = WeatherConfig::default();
        let weather = WeatherConfig {
            base_url: std::env::var("OPEN_METEO_URL").unwrap_or(defaults.base_url),
            timeout_secs: env_or("WEATHER_TIMEOUT_SECS", defaults.timeout_secs),
            cache_ttl_secs: env_or("WEATHER_CACHE_TTL_SECS", defaults.cache_ttl_secs),
            max_attempts: env_or("WEATHER_MAX_ATTEMPTS", defaults.max_attempts).max(1),
            backoff_ms: env_or("WEATHER_BACKOFF_MS", defaults.backoff_ms),
        };

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            jwt,
            weather,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
