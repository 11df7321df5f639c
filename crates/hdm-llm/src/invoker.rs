//! Selector resolution, credential checks and the invocation entry point.

use std::time::{Duration, Instant};

use hdm_model::{ModelSelector, PromptText, RawModelText};
use tracing::{info, info_span, warn};

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::config::{Credential, InvokerConfig, ModelEndpoint, TEST_CONNECTION_MAX_TOKENS};
use crate::error::{InvokeError, Result};
use crate::http::HttpBackend;

const CONNECTION_TEST_PROMPT: &str =
    "Hello, please respond with 'Connection successful' if you can read this message.";

/// Outcome of a successful round trip to one model.
#[derive(Debug)]
pub struct ConnectionCheck {
    pub model: ModelSelector,
    pub endpoint: String,
    pub elapsed: Duration,
    pub response: RawModelText,
}

/// Sends prompts to the endpoint configured for a model selector.
///
/// Holds no per-call state; one invoker can serve concurrent requests.
#[derive(Debug)]
pub struct ModelInvoker<B = HttpBackend> {
    config: InvokerConfig,
    backend: B,
}

impl ModelInvoker<HttpBackend> {
    /// Build an invoker with the blocking HTTP backend.
    pub fn from_config(config: InvokerConfig) -> Result<Self> {
        let backend = HttpBackend::new(&config.backend)?;
        Ok(Self::with_backend(config, backend))
    }
}

impl<B: CompletionBackend> ModelInvoker<B> {
    pub fn with_backend(config: InvokerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    pub fn selectors(&self) -> Vec<ModelSelector> {
        self.config.selectors().map(ModelSelector::new).collect()
    }

    /// Resolve the selector and credential without contacting the backend.
    pub fn resolve(&self, model: &ModelSelector) -> Result<(&ModelEndpoint, Credential)> {
        let endpoint =
            self.config
                .model(model.as_str())
                .ok_or_else(|| InvokeError::UnknownModel {
                    selector: model.to_string(),
                    available: self.config.selectors().collect::<Vec<_>>().join(", "),
                })?;
        let credential = self
            .config
            .backend
            .credential()
            .filter(|c| !c.is_placeholder())
            .ok_or_else(|| InvokeError::BackendAuth {
                message: format!(
                    "no serving-endpoint token configured; set {} or backend.token",
                    self.config.backend.token_env
                ),
            })?;
        Ok((endpoint, credential))
    }

    /// Send one prompt and return the complete model output.
    pub fn invoke(&self, prompt: &PromptText, model: &ModelSelector) -> Result<RawModelText> {
        self.invoke_with(prompt.as_str(), model, self.config.backend.max_tokens)
    }

    /// Send a fixed short prompt to check reachability and credentials.
    pub fn test_connection(&self, model: &ModelSelector) -> Result<ConnectionCheck> {
        let started = Instant::now();
        let response = self.invoke_with(CONNECTION_TEST_PROMPT, model, TEST_CONNECTION_MAX_TOKENS)?;
        let endpoint = self
            .config
            .model(model.as_str())
            .map(|e| e.endpoint.clone())
            .unwrap_or_default();
        Ok(ConnectionCheck {
            model: model.clone(),
            endpoint,
            elapsed: started.elapsed(),
            response,
        })
    }

    fn invoke_with(
        &self,
        prompt: &str,
        model: &ModelSelector,
        max_tokens: u32,
    ) -> Result<RawModelText> {
        let span = info_span!("invoke", model = %model);
        let _guard = span.enter();

        let (endpoint, credential) = self.resolve(model)?;
        let request = CompletionRequest {
            endpoint,
            credential: &credential,
            prompt,
            max_tokens,
            temperature: self.config.backend.temperature,
        };

        let started = Instant::now();
        let outcome = self.backend.complete(&request);
        let duration_ms = millis(started.elapsed());
        match outcome {
            Ok(text) => {
                info!(
                    prompt_chars = prompt.chars().count(),
                    response_chars = text.char_len(),
                    duration_ms,
                    "model responded"
                );
                Ok(text)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    duration_ms,
                    "model invocation failed"
                );
                Err(err)
            }
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
