//! Backend and model configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use hdm_model::sensitive::wipe_string;
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable holding the serving-endpoint token by default.
pub const DEFAULT_TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Value shipped in configuration templates; never a usable token.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_DATABRICKS_TOKEN_HERE";

pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Completion budget used by connection tests.
pub const TEST_CONNECTION_MAX_TOKENS: u32 = 100;

const DATABRICKS_WORKSPACE: &str = "https://dbc-3735add4-1cb6.cloud.databricks.com";

/// Bearer token for the serving endpoint. Redacted in debug output and
/// wiped on drop.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Blank or still the template placeholder.
    pub fn is_placeholder(&self) -> bool {
        let token = self.0.trim();
        token.is_empty() || token == PLACEHOLDER_TOKEN
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        wipe_string(&mut self.0);
    }
}

/// Where one model selector is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEndpoint {
    pub endpoint: String,
    /// Model identifier sent with each request; omitted when empty.
    #[serde(default)]
    pub model_id: String,
}

impl ModelEndpoint {
    fn serving(name: &str) -> Self {
        Self {
            endpoint: format!("{DATABRICKS_WORKSPACE}/serving-endpoints/{name}/invocations"),
            model_id: name.to_string(),
        }
    }
}

/// Transport and generation settings shared by all models.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Environment variable read when `token` is not set.
    pub token_env: String,
    pub token: Option<Credential>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Honour `HTTPS_PROXY` and friends.
    pub use_system_proxy: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            token: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            use_system_proxy: true,
        }
    }
}

impl BackendSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Inline token if configured, otherwise the `token_env` variable.
    pub fn credential(&self) -> Option<Credential> {
        self.token
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok().map(Credential::new))
    }
}

/// Everything the invoker needs: shared backend settings and the selector
/// to endpoint table.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokerConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    /// Configured entries replace or extend the two default models.
    #[serde(default = "default_models", deserialize_with = "merge_models")]
    pub models: BTreeMap<String, ModelEndpoint>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            models: default_models(),
        }
    }
}

impl InvokerConfig {
    /// Default models, replaced or extended by `configured`.
    pub fn new(backend: BackendSettings, configured: BTreeMap<String, ModelEndpoint>) -> Self {
        Self {
            backend,
            models: with_default_models(configured),
        }
    }

    pub fn model(&self, selector: &str) -> Option<&ModelEndpoint> {
        self.models.get(selector.trim())
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// The two supported models.
pub fn default_models() -> BTreeMap<String, ModelEndpoint> {
    BTreeMap::from([
        (
            "claude-sonnet-4".to_string(),
            ModelEndpoint::serving("databricks-claude-sonnet-4"),
        ),
        (
            "llama-3-70b".to_string(),
            ModelEndpoint::serving("databricks-meta-llama-3-3-70b-instruct"),
        ),
    ])
}

fn merge_models<'de, D>(deserializer: D) -> Result<BTreeMap<String, ModelEndpoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = BTreeMap::<String, ModelEndpoint>::deserialize(deserializer)?;
    Ok(with_default_models(configured))
}

fn with_default_models(
    configured: BTreeMap<String, ModelEndpoint>,
) -> BTreeMap<String, ModelEndpoint> {
    let mut models = default_models();
    models.extend(configured);
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_models() {
        let config = InvokerConfig::default();
        let selectors: Vec<&str> = config.selectors().collect();
        assert_eq!(selectors, vec!["claude-sonnet-4", "llama-3-70b"]);
        assert_eq!(
            config.model("llama-3-70b").unwrap().endpoint,
            "https://dbc-3735add4-1cb6.cloud.databricks.com/serving-endpoints/\
             databricks-meta-llama-3-3-70b-instruct/invocations"
        );
        assert_eq!(config.backend.max_tokens, 4000);
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn placeholder_tokens_are_detected() {
        assert!(Credential::new(PLACEHOLDER_TOKEN).is_placeholder());
        assert!(Credential::new("  ").is_placeholder());
        assert!(!Credential::new("dapi123").is_placeholder());
        assert_eq!(format!("{:?}", Credential::new("dapi123")), "Credential(***)");
    }
}
