use hdm_model::{DictionaryDocument, DictionaryFormat, ExtractedDictionaryText};
use tracing::{debug, info, info_span, warn};

use crate::document::extract_document;
use crate::error::{ExtractError, Result};
use crate::tabular::extract_tabular;

/// Converts an uploaded dictionary into normalized, record-preserving text.
///
/// Extraction is lossless: every usable row or page line is kept. Budgeting
/// the text for a prompt happens later, in the composer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryExtractor;

impl DictionaryExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from `document`, consuming it.
    ///
    /// The document (and its bytes) is dropped before this returns, on both
    /// the success and the error path.
    pub fn extract(&self, document: DictionaryDocument) -> Result<ExtractedDictionaryText> {
        let Some(format) = document.format() else {
            return Err(ExtractError::UnsupportedFormat {
                file_name: document.file_name().to_string(),
                extension: document.extension().to_string(),
            });
        };
        let span = info_span!(
            "extract",
            format = ?format,
            bytes = document.len()
        );
        let _guard = span.enter();

        let file_name = document.file_name().to_string();
        let (sections, warnings) = match format {
            DictionaryFormat::Csv | DictionaryFormat::Tsv => {
                let delimiter = format.delimiter().unwrap_or(b',');
                let output = extract_tabular(document.bytes(), delimiter).map_err(|e| {
                    ExtractError::Tabular {
                        file_name: file_name.clone(),
                        message: e.to_string(),
                    }
                })?;
                (output.sections, output.warnings)
            }
            DictionaryFormat::Pdf => {
                let output = extract_document(document.bytes()).map_err(|message| {
                    ExtractError::Document {
                        file_name: file_name.clone(),
                        message,
                    }
                })?;
                (output.sections, output.warnings)
            }
        };
        drop(document);

        for warning in &warnings {
            warn!(location = %warning.location, "dictionary entry skipped");
        }
        let text = ExtractedDictionaryText::new(format.kind(), sections, warnings);
        if text.is_blank() {
            return Err(ExtractError::EmptyDictionary { file_name });
        }

        debug!(sections = text.sections().len(), "dictionary sections built");
        info!(
            kind = %text.kind(),
            entries = text.entry_count(),
            warnings = text.warnings().len(),
            "dictionary extracted"
        );
        Ok(text)
    }
}
