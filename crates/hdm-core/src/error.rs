//! Stage-tagged errors for the mapping service.

use std::fmt;
use std::path::PathBuf;

use hdm_ingest::ExtractError;
use hdm_layouts::LayoutError;
use hdm_llm::InvokeError;
use hdm_map::{ComposeError, ParseError};
use thiserror::Error;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Layout,
    Extraction,
    Composition,
    Invocation,
    Parsing,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Layout => "layout",
            Stage::Extraction => "extraction",
            Stage::Composition => "composition",
            Stage::Invocation => "invocation",
            Stage::Parsing => "parsing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping request failure. The wrapped error keeps its own kind.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("extraction: {0}")]
    Extraction(#[from] ExtractError),

    #[error("composition: {0}")]
    Composition(#[from] ComposeError),

    #[error("invocation: {0}")]
    Invocation(#[from] InvokeError),

    #[error("parsing: {0}")]
    Parsing(#[from] ParseError),
}

impl MappingError {
    pub fn stage(&self) -> Stage {
        match self {
            MappingError::Layout(_) => Stage::Layout,
            MappingError::Extraction(_) => Stage::Extraction,
            MappingError::Composition(_) => Stage::Composition,
            MappingError::Invocation(_) => Stage::Invocation,
            MappingError::Parsing(_) => Stage::Parsing,
        }
    }

    /// True only for backend timeouts and unavailability.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MappingError::Invocation(err) if err.is_retryable())
    }
}

/// Failures loading the application configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
