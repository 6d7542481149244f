use std::error::Error as StdError;

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Failures reported to callers as `{"error": "..."}` with HTTP 200.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),
    #[error("API request failed with status {0}")]
    UpstreamStatus(u16),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Builds a transport error message including the whole source chain.
    pub fn network(err: &reqwest::Error) -> Self {
        GatewayError::Network(describe(err))
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::MissingCoordinates => "missing_parameter",
            GatewayError::InvalidQuery(_) => "invalid_parameter",
            GatewayError::UpstreamStatus(_) => "upstream_status",
            GatewayError::Network(_) => "network",
            GatewayError::Unexpected(_) => "unexpected",
        }
    }

    pub fn payload(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        Json(self.payload()).into_response()
    }
}

fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
