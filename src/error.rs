use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    // reset_at: ms since epoch
    #[error("Rate limit exceeded. Try again after {}", format_reset_time(.reset_at))]
    QuotaExceeded { reset_at: i64 },
}

impl RateLimitError {
    pub fn reset_at(&self) -> i64 {
        match self {
            RateLimitError::QuotaExceeded { reset_at } => *reset_at,
        }
    }
}

pub fn format_reset_time(ms: &i64) -> String {
    match DateTime::from_timestamp_millis(*ms) {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => format!("{ms}ms"),
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini API key is not configured. Set GEMINI_API_KEY.")]
    MissingApiKey,

    #[error("Invalid analysis parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    #[error("Gemini API error: {0}")]
    Upstream(String),

    #[error("Invalid response format from Gemini API")]
    InvalidResponseFormat,

    #[error("Invalid JSON response from Gemini API: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Analysis queue unavailable: {0}")]
    Queue(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            AnalysisError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AnalysisError::Upstream(_)
            | AnalysisError::InvalidResponseFormat
            | AnalysisError::InvalidJson(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::Queue(_) | AnalysisError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_at: Option<i64>,
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reset_at = match &self {
            AnalysisError::RateLimited(e) => Some(e.reset_at()),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Analysis failed");
        } else {
            tracing::info!(error = %self, "Analysis rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            reset_at,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_carries_reset_time() {
        let err = RateLimitError::QuotaExceeded {
            reset_at: 86_400_000,
        };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded. Try again after 1970-01-02T00:00:00Z"
        );
    }

    #[test]
    fn quota_stays_distinct_from_generic_failures() {
        let err: AnalysisError = RateLimitError::QuotaExceeded { reset_at: 0 }.into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.to_string().starts_with("Rate limit exceeded"));

        assert_eq!(
            AnalysisError::InvalidResponseFormat.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AnalysisError::MissingApiKey.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
