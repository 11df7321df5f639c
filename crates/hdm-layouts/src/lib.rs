//! Target layout reference data.
//!
//! Layout definitions live as CSV files under `layouts/`, pinned by SHA-256
//! in `layouts/manifest.toml`. [`LayoutCatalog::load`] verifies the pins
//! before parsing so a tampered or truncated layout never reaches a prompt.

#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod paths;

pub use catalog::{DEFAULT_PREVIEW_LIMIT, LayoutCatalog};
pub use error::LayoutError;
pub use loader::parse_layout_csv;
pub use paths::{LAYOUTS_ENV_VAR, default_layouts_root};
