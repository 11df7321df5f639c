//! Mapping service for healthcare data dictionaries.
//!
//! [`MappingService`] ties together the layout catalog, dictionary extraction,
//! prompt composition, model invocation and response parsing. Every failure
//! comes back as a [`MappingError`] tagged with the [`Stage`] it happened in.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod service;

pub use config::{AppConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, LayoutSettings, PromptSettings};
pub use error::{ConfigError, MappingError, Stage};
pub use service::{MappingResponse, MappingService, PreparedPrompt};
