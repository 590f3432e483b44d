//! Protected proxy over the Open-Meteo hourly forecast.

mod cache;
mod client;
pub mod format;
pub mod handlers;
pub mod retry;
mod types;

use crate::state::AppState;
use axum::Router;

pub use cache::ResponseCache;
pub use client::{ForecastSource, OpenMeteoClient};
pub use types::{ForecastRecord, HourlySeries, WeatherError};

pub fn router() -> Router<AppState> {
    handlers::weather_routes()
}
