//! Blocking HTTP backend for serving endpoints.

use std::time::Duration;

use hdm_model::RawModelText;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::config::BackendSettings;
use crate::error::{InvokeError, Result};

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    #[serde(skip_serializing_if = "str::is_empty")]
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_tokens: u32,
    temperature: f32,
}

/// Response shapes returned by serving endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompletionBody {
    Choices { choices: Vec<Choice> },
    Predictions { predictions: Vec<Prediction> },
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Prediction {
    Text(String),
    Generated { generated_text: String },
}

impl CompletionBody {
    fn into_text(self) -> Option<String> {
        match self {
            CompletionBody::Choices { choices } => {
                let choice = choices.into_iter().next()?;
                choice.message.map(|m| m.content).or(choice.text)
            }
            CompletionBody::Predictions { predictions } => {
                match predictions.into_iter().next()? {
                    Prediction::Text(text) => Some(text),
                    Prediction::Generated { generated_text } => Some(generated_text),
                }
            }
        }
    }
}

/// Extract completion text from a response body.
pub(crate) fn completion_text(body: &str, endpoint: &str) -> Result<String> {
    let malformed = |message: String| InvokeError::MalformedBackendResponse {
        endpoint: endpoint.to_string(),
        message,
    };
    let parsed: CompletionBody = serde_json::from_str(body)
        .map_err(|_| malformed("body is not a recognised completion response".to_string()))?;
    let text = parsed
        .into_text()
        .ok_or_else(|| malformed("response contains no completion".to_string()))?;
    if text.trim().is_empty() {
        return Err(malformed("completion text is empty".to_string()));
    }
    Ok(text)
}

/// Map a non-success status to the invocation error taxonomy.
pub(crate) fn status_error(status: StatusCode, endpoint: &str, timeout: Duration) -> InvokeError {
    let endpoint = endpoint.to_string();
    match status.as_u16() {
        401 | 403 => InvokeError::BackendAuth {
            message: format!("HTTP {status}; check the serving-endpoint token"),
        },
        404 => InvokeError::BackendUnavailable {
            endpoint,
            status: Some(404),
            rate_limited: false,
            message: "endpoint not found".to_string(),
        },
        429 => InvokeError::BackendUnavailable {
            endpoint,
            status: Some(429),
            rate_limited: true,
            message: "rate limit exceeded".to_string(),
        },
        408 | 504 => InvokeError::BackendTimeout { endpoint, timeout },
        code => InvokeError::BackendUnavailable {
            endpoint,
            status: Some(code),
            rate_limited: false,
            message: format!("HTTP {status}"),
        },
    }
}

/// Posts completion requests with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let request_timeout = settings.request_timeout();
        let mut builder = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(request_timeout);
        if !settings.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| InvokeError::Client(e.to_string()))?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    fn transport_error(&self, err: &reqwest::Error, endpoint: &str) -> InvokeError {
        if err.is_timeout() {
            InvokeError::BackendTimeout {
                endpoint: endpoint.to_string(),
                timeout: self.request_timeout,
            }
        } else {
            let message = if err.is_connect() {
                "connection failed".to_string()
            } else {
                err.to_string()
            };
            InvokeError::BackendUnavailable {
                endpoint: endpoint.to_string(),
                status: None,
                rate_limited: false,
                message,
            }
        }
    }
}

impl CompletionBackend for HttpBackend {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<RawModelText> {
        let endpoint = request.endpoint.endpoint.as_str();
        let payload = CompletionPayload {
            inputs: request.prompt,
            parameters: GenerationParameters {
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            },
            model: &request.endpoint.model_id,
        };

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(request.credential.expose())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("hdm/", env!("CARGO_PKG_VERSION")))
            .json(&payload)
            .send()
            .map_err(|e| self.transport_error(&e, endpoint))?;

        let status = response.status();
        debug!(status = status.as_u16(), "backend responded");
        if !status.is_success() {
            return Err(status_error(status, endpoint, self.request_timeout));
        }

        let body = response
            .text()
            .map_err(|e| self.transport_error(&e, endpoint))?;
        completion_text(&body, endpoint).map(RawModelText::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://example.invalid/invocations";

    #[test]
    fn reads_each_response_shape() {
        let chat = r#"{"choices":[{"message":{"role":"assistant","content":"chat"}}]}"#;
        let text = r#"{"choices":[{"text":"plain"}]}"#;
        let predictions = r#"{"predictions":["predicted"]}"#;
        let generated = r#"{"predictions":[{"generated_text":"generated"}]}"#;
        assert_eq!(completion_text(chat, ENDPOINT).unwrap(), "chat");
        assert_eq!(completion_text(text, ENDPOINT).unwrap(), "plain");
        assert_eq!(completion_text(predictions, ENDPOINT).unwrap(), "predicted");
        assert_eq!(completion_text(generated, ENDPOINT).unwrap(), "generated");
    }

    #[test]
    fn rejects_unknown_or_empty_bodies() {
        for body in [
            r#"{"result":"x"}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
            "not json",
        ] {
            assert!(matches!(
                completion_text(body, ENDPOINT),
                Err(InvokeError::MalformedBackendResponse { .. })
            ));
        }
    }

    #[test]
    fn maps_statuses() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ENDPOINT, timeout),
            InvokeError::BackendAuth { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, ENDPOINT, timeout),
            InvokeError::BackendAuth { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ENDPOINT, timeout),
            InvokeError::BackendUnavailable {
                status: Some(404),
                ..
            }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ENDPOINT, timeout),
            InvokeError::BackendUnavailable {
                rate_limited: true,
                ..
            }
        ));
        assert!(matches!(
            status_error(StatusCode::GATEWAY_TIMEOUT, ENDPOINT, timeout),
            InvokeError::BackendTimeout { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, ENDPOINT, timeout),
            InvokeError::BackendUnavailable {
                status: Some(503),
                ..
            }
        ));
    }
}
