use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::format::{latest_records, to_csv, to_rows, wants_csv, CSV_FILENAME, MAX_RECORDS};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

const MISSING_COORDS: &str = "Parâmetros latitude e longitude são obrigatórios";
const INVALID_COORDS: &str = "Parâmetros latitude e longitude devem ser números válidos";
const OUT_OF_RANGE_COORDS: &str = "Parâmetros latitude e longitude fora do intervalo válido";

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/consultar", get(consultar))
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl ForecastQuery {
    /// Parses and range-checks the coordinates.
    pub fn coordinates(&self) -> Result<(f64, f64), ApiError> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let (Some(lat), Some(lon)) = (present(&self.latitude), present(&self.longitude)) else {
            return Err(ApiError::InvalidInput(MISSING_COORDS.into()));
        };

        let parse = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
        let (Some(lat), Some(lon)) = (parse(lat.as_str()), parse(lon.as_str())) else {
            return Err(ApiError::InvalidInput(INVALID_COORDS.into()));
        };

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::InvalidInput(OUT_OF_RANGE_COORDS.into()));
        }
        Ok((lat, lon))
    }
}

#[instrument(skip_all)]
pub async fn consultar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        warn!(error = %e, "unreadable forecast query");
        ApiError::bad_request()
    })?;

    let (latitude, longitude) = query.coordinates().map_err(|e| {
        warn!(%user_id, latitude = ?query.latitude, longitude = ?query.longitude, "rejected coordinates");
        e
    })?;
    info!(%user_id, latitude, longitude, "temperature lookup");

    let series = state
        .forecast
        .hourly_temperature(latitude, longitude)
        .await?;
    let rows = to_rows(latest_records(&series, MAX_RECORDS)?)?;

    if wants_csv(&headers) {
        info!(%user_id, rows = rows.len(), "returning csv");
        let disposition = format!("attachment; filename=\"{}\"", CSV_FILENAME);
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            to_csv(&rows),
        )
            .into_response());
    }

    info!(%user_id, rows = rows.len(), "returning json");
    Ok(Json(rows).into_response())
}
