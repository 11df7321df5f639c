//! Error types for model invocation.

use std::time::Duration;

use thiserror::Error;

/// Failures of one model invocation. Never carries prompt or completion text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvokeError {
    #[error("unknown model '{selector}' (available: {available})")]
    UnknownModel { selector: String, available: String },

    #[error("authentication failed: {message}")]
    BackendAuth { message: String },

    #[error("backend unavailable at {endpoint}: {message}")]
    BackendUnavailable {
        endpoint: String,
        status: Option<u16>,
        rate_limited: bool,
        message: String,
    },

    #[error("backend at {endpoint} did not answer within {timeout:?}")]
    BackendTimeout { endpoint: String, timeout: Duration },

    #[error("unexpected response from {endpoint}: {message}")]
    MalformedBackendResponse { endpoint: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl InvokeError {
    /// Short message suitable for a terminal or UI.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::UnknownModel { .. } => "The selected model is not configured.",
            Self::BackendAuth { .. } => {
                "Authentication failed. Check the serving-endpoint token."
            }
            Self::BackendUnavailable {
                rate_limited: true, ..
            } => "Rate limit exceeded. Please try again later.",
            Self::BackendUnavailable {
                status: Some(404), ..
            } => "Endpoint not found. Verify the endpoint URL.",
            Self::BackendUnavailable { .. } => {
                "Could not reach the model backend. Check the connection and endpoint URL."
            }
            Self::BackendTimeout { .. } => {
                "The model is taking too long to respond. Please try again."
            }
            Self::MalformedBackendResponse { .. } => "The model backend returned an unexpected response.",
            Self::Client(_) => "An unexpected error occurred.",
        }
    }

    /// Timeouts and unavailability may succeed on a later attempt; the
    /// invoker itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable { .. } | Self::BackendTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InvokeError>;
