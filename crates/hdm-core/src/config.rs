//! Application configuration (`hdm.toml`).
//!
//! ```toml
//! [backend]
//! token_env = "DATABRICKS_TOKEN"
//! request_timeout_secs = 120
//!
//! [models.claude-sonnet-4]
//! endpoint = "https://.../serving-endpoints/databricks-claude-sonnet-4/invocations"
//! model_id = "databricks-claude-sonnet-4"
//!
//! [prompt]
//! max_chars = 120000
//!
//! [layouts]
//! dir = "layouts"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hdm_llm::{BackendSettings, InvokerConfig, ModelEndpoint};
use hdm_map::DEFAULT_MAX_CHARS;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "HDM_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "hdm.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub max_chars: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Overrides `HDM_LAYOUTS_DIR` and the built-in location.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendSettings,
    /// Extra or replacement entries for the built-in model table.
    pub models: BTreeMap<String, ModelEndpoint>,
    pub prompt: PromptSettings,
    pub layouts: LayoutSettings,
}

impl AppConfig {
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config file.
    ///
    /// Resolution order:
    /// 1. `explicit` (a `--config` flag)
    /// 2. `HDM_CONFIG` environment variable
    /// 3. `hdm.toml` in the working directory, if present
    /// 4. built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn invoker_config(&self) -> InvokerConfig {
        InvokerConfig::new(self.backend.clone(), self.models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("", Path::new("hdm.toml")).unwrap();
        assert_eq!(config.prompt.max_chars, DEFAULT_MAX_CHARS);
        assert!(config.layouts.dir.is_none());
        let invoker = config.invoker_config();
        assert_eq!(
            invoker.selectors().collect::<Vec<_>>(),
            vec!["claude-sonnet-4", "llama-3-70b"]
        );
    }

    #[test]
    fn sections_override_defaults() {
        let source = r#"
[backend]
token_env = "HDM_TEST_TOKEN"
request_timeout_secs = 15
temperature = 0.0

[models.llama-3-70b]
endpoint = "http://localhost:8080/invocations"

[prompt]
max_chars = 5000

[layouts]
dir = "/srv/layouts"
"#;
        let config = AppConfig::from_toml_str(source, Path::new("hdm.toml")).unwrap();
        assert_eq!(config.backend.token_env, "HDM_TEST_TOKEN");
        assert_eq!(config.backend.request_timeout_secs, 15);
        assert_eq!(config.backend.max_tokens, 4000);
        assert_eq!(config.prompt.max_chars, 5000);
        assert_eq!(config.layouts.dir, Some(PathBuf::from("/srv/layouts")));

        let invoker = config.invoker_config();
        let llama = invoker.model("llama-3-70b").unwrap();
        assert_eq!(llama.endpoint, "http://localhost:8080/invocations");
        assert!(llama.model_id.is_empty());
        assert!(invoker.model("claude-sonnet-4").is_some());
    }

    #[test]
    fn example_config_parses() {
        let source = include_str!("../../../hdm.example.toml");
        let config = AppConfig::from_toml_str(source, Path::new("hdm.example.toml")).unwrap();
        assert!(config.backend.token.is_none());
        assert_eq!(config.invoker_config().models, hdm_llm::default_models());
    }

    #[test]
    fn bad_toml_names_the_file() {
        let err = AppConfig::from_toml_str("[prompt\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
