use std::fmt::Write;

use axum::http::{header::ACCEPT, HeaderMap};
use serde::Serialize;
use time::{macros::format_description, OffsetDateTime};

use super::types::{ForecastRecord, HourlySeries, WeatherError};

pub const MAX_RECORDS: usize = 10;
pub const CSV_HEADER: &str = "date,temperature_2m";
pub const CSV_FILENAME: &str = "temperatura.csv";

/// Wire shape of a forecast record, shared by the JSON and CSV renderings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastRow {
    pub date: String,
    pub temperature_2m: f64,
}

impl TryFrom<ForecastRecord> for ForecastRow {
    type Error = WeatherError;

    fn try_from(record: ForecastRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            date: format_utc(record.timestamp)?,
            temperature_2m: record.temperature_2m,
        })
    }
}

fn format_utc(ts: OffsetDateTime) -> Result<String, WeatherError> {
    ts.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
    ))
    .map_err(|e| WeatherError::Decode(e.to_string()))
}

/// Keeps the `limit` most recent readings in ascending time order.
///
/// Hours without a temperature are skipped and duplicate timestamps collapse
/// to their first reading.
pub fn latest_records(
    series: &HourlySeries,
    limit: usize,
) -> Result<Vec<ForecastRecord>, WeatherError> {
    let mut pairs: Vec<(i64, f64)> = series
        .time
        .iter()
        .zip(&series.temperature_2m)
        .filter_map(|(&t, temp)| temp.filter(|v| v.is_finite()).map(|v| (t, v)))
        .collect();

    if pairs.is_empty() {
        return Err(WeatherError::NoData);
    }

    pairs.sort_by_key(|&(t, _)| t);
    pairs.dedup_by_key(|&mut (t, _)| t);

    let start = pairs.len().saturating_sub(limit);
    pairs[start..]
        .iter()
        .map(|&(t, temperature_2m)| {
            OffsetDateTime::from_unix_timestamp(t)
                .map(|timestamp| ForecastRecord {
                    timestamp,
                    temperature_2m,
                })
                .map_err(|e| WeatherError::Decode(e.to_string()))
        })
        .collect()
}

pub fn to_rows(records: Vec<ForecastRecord>) -> Result<Vec<ForecastRow>, WeatherError> {
    records.into_iter().map(ForecastRow::try_from).collect()
}

pub fn to_csv(rows: &[ForecastRow]) -> String {
    let mut csv = String::with_capacity(32 * (rows.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for row in rows {
        let _ = writeln!(csv, "{},{}", row.date, row.temperature_2m);
    }
    csv
}

/// True when any `Accept` value mentions `text/csv`.
pub fn wants_csv(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("text/csv"))
}
