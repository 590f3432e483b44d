use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::weather::WeatherError;

pub const BAD_REQUEST_MSG: &str = "Bad Request";
pub const NOT_FOUND_MSG: &str = "Not Found";
pub const INTERNAL_ERROR_MSG: &str = "Internal Server Error";
pub const UPSTREAM_ERROR_MSG: &str = "Erro ao buscar dados de temperatura";

/// Failure surfaced to HTTP clients as a `{"msg": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    fn msg(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            error: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Generic 400 for requests that could not be read at all.
    pub fn bad_request() -> Self {
        ApiError::InvalidInput(BAD_REQUEST_MSG.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidInput(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg) => ErrorBody::msg(msg),
            ApiError::Upstream(detail) => {
                tracing::error!(error = %detail, "upstream forecast request failed");
                ErrorBody {
                    msg: UPSTREAM_ERROR_MSG.into(),
                    error: Some(detail),
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                ErrorBody::msg(INTERNAL_ERROR_MSG)
            }
            ApiError::NotFound => ErrorBody::msg(NOT_FOUND_MSG),
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = ApiError::from(anyhow::anyhow!("pool timed out"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn bad_request_renders_generic_body() {
        use http_body_util::BodyExt;

        let resp = ApiError::bad_request().into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"msg":"Bad Request"}"#);
    }

    #[test]
    fn error_body_omits_empty_detail() {
        let json = serde_json::to_string(&ErrorBody::msg("Not Found")).unwrap();
        assert_eq!(json, r#"{"msg":"Not Found"}"#);

        let json = serde_json::to_value(ErrorBody {
            msg: UPSTREAM_ERROR_MSG.into(),
            error: Some("status 503".into()),
        })
        .unwrap();
        assert_eq!(json["error"], "status 503");
    }
}
