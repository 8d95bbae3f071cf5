use std::fmt::Display;

use serde::de::Error;

/// Vendor error envelope: `{"error": {"message": "...", ...}}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug)]
pub enum GatewayError {
    RequestError(reqwest::Error),
    GatewayResponse(ErrorResponse),
    GatewayDeserialization(serde_json::Error),
    /// Contract violation caught before any network call
    InvalidRequest(&'static str),
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::GatewayDeserialization(serde_json::Error::custom(
                "failed to decode response body",
            ));
        }
        Self::RequestError(value)
    }
}

impl From<ErrorResponse> for GatewayError {
    fn from(value: ErrorResponse) -> Self {
        Self::GatewayResponse(value)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::GatewayDeserialization(value)
    }
}

impl std::error::Error for GatewayError {}

impl Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::RequestError(e) => write!(f, "http request error: {e}"),
            GatewayError::GatewayResponse(error_response) => match &error_response.error.code {
                Some(code) => {
                    write!(f, "backend response [{code}]: {}", error_response.error.message)
                }
                None => write!(f, "backend response: {}", error_response.error.message),
            },
            GatewayError::GatewayDeserialization(e) => {
                write!(f, "backend response deserialization: {e}")
            }
            GatewayError::InvalidRequest(reason) => write!(f, "invalid request: {reason}"),
        }
    }
}
