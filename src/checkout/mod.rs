use std::fmt::Display;

use serde::Serialize;

use crate::stripe::{GatewayError, mask};

pub mod api;
pub mod deeplink;
pub mod interaction_log;
pub mod orchestrator;
pub mod presentation;
pub mod wallet;

pub type Result<T> = std::result::Result<T, CheckoutErrorResponse>;

/// Failure taxonomy of the checkout flow. Each step fails immediately with
/// its own class; the orchestrator never recovers or retries.
#[derive(Debug)]
pub enum CheckoutError {
    Backend(GatewayError),
    Presentation(presentation::PresentationError),
    Confirmation(presentation::ConfirmationError),
    /// A checkout session is already in flight on this orchestrator.
    Busy,
}

impl From<GatewayError> for CheckoutError {
    fn from(value: GatewayError) -> Self {
        Self::Backend(value)
    }
}

impl From<presentation::PresentationError> for CheckoutError {
    fn from(value: presentation::PresentationError) -> Self {
        Self::Presentation(value)
    }
}

impl From<presentation::ConfirmationError> for CheckoutError {
    fn from(value: presentation::ConfirmationError) -> Self {
        Self::Confirmation(value)
    }
}

impl std::error::Error for CheckoutError {}

impl Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::Backend(e) => write!(f, "backend: {e}"),
            CheckoutError::Presentation(e) => write!(f, "presentation: {e}"),
            CheckoutError::Confirmation(e) => write!(f, "confirmation: {e}"),
            CheckoutError::Busy => f.write_str("checkout already in progress"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutErrorResponse {
    result: bool,
    error: String,
    logs: Vec<interaction_log::InteractionLog>,
}

impl std::error::Error for CheckoutErrorResponse {}

impl Display for CheckoutErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

impl CheckoutErrorResponse {
    pub fn new(text: String, logs: Vec<interaction_log::InteractionLog>) -> Self {
        Self {
            result: false,
            error: text,
            logs,
        }
    }
}

impl axum::response::IntoResponse for CheckoutErrorResponse {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!(data = %mask::secure_serializable(&self), "Checkout API error response payload");
        (reqwest::StatusCode::OK, axum::Json(self)).into_response()
    }
}
