//! Data dictionary ingestion.
//!
//! A [`DictionaryDocument`](hdm_model::DictionaryDocument) is dispatched on its
//! declared format to the tabular (CSV/TSV) or document (PDF) strategy and
//! comes back as [`ExtractedDictionaryText`](hdm_model::ExtractedDictionaryText).

pub mod document;
pub mod error;
pub mod extractor;
pub mod headers;
pub mod tabular;

pub use document::{assemble_pages, extract_document};
pub use error::{ExtractError, Result};
pub use extractor::DictionaryExtractor;
pub use headers::{HeaderMap, HeaderRole, normalize_header};
pub use tabular::extract_tabular;
