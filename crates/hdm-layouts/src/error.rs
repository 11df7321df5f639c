#![deny(unsafe_code)]

use std::path::PathBuf;

use hdm_model::{LayoutId, ModelError};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown layout: {name} (expected one of: {expected})")]
    UnknownLayout { name: String, expected: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("layout missing from manifest: {layout}")]
    MissingLayout { layout: LayoutId },

    #[error("layout listed twice in manifest: {layout}")]
    DuplicateLayout { layout: LayoutId },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("layout {layout} has {actual} fields, documented count is {expected}")]
    FieldCountMismatch {
        layout: LayoutId,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl LayoutError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownLayout {
            name: name.trim().to_string(),
            expected: LayoutId::ALL
                .iter()
                .map(LayoutId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
