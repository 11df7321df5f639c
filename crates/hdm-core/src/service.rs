//! One mapping request, end to end.
//!
//! The service runs the stages in strict order: layout lookup, extraction,
//! composition, invocation, parsing. Transient request content (document
//! bytes, dictionary text, prompt, raw completion) is owned by the call and
//! dropped, and therefore wiped, as soon as the next stage no longer needs it,
//! on success and on every error path alike.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use hdm_ingest::DictionaryExtractor;
use hdm_layouts::LayoutCatalog;
use hdm_llm::{CompletionBackend, HttpBackend, ModelInvoker};
use hdm_map::{CompositionReport, MappingResponseParser, PromptComposer};
use hdm_model::{
    DictionaryDocument, ExtractionWarning, Layout, LayoutSummary, MappingArtifact,
    MappingRequest, ModelSelector, PromptText, SourceTables,
};
use serde::Serialize;
use tracing::{info, info_span};

use crate::config::AppConfig;
use crate::error::MappingError;

/// A composed prompt, ready to send.
#[derive(Debug)]
pub struct PreparedPrompt<'a> {
    pub layout: &'a Layout,
    pub prompt: PromptText,
    pub report: CompositionReport,
    pub warnings: Vec<ExtractionWarning>,
}

/// The artifact together with a summary of the request that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct MappingResponse {
    pub layout: LayoutSummary,
    pub source_tables: SourceTables,
    pub model: ModelSelector,
    pub dictionary_entries: usize,
    pub entries_in_prompt: usize,
    pub prompt_chars: usize,
    pub warnings: Vec<ExtractionWarning>,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub artifact: MappingArtifact,
}

/// Orchestrates catalog, extractor, composer, invoker and parser.
///
/// Holds only immutable state. The catalog is shared through an `Arc`; one
/// service can handle concurrent requests from several threads.
#[derive(Debug)]
pub struct MappingService<B = HttpBackend> {
    catalog: Arc<LayoutCatalog>,
    extractor: DictionaryExtractor,
    composer: PromptComposer,
    invoker: ModelInvoker<B>,
    parser: MappingResponseParser,
}

impl MappingService<HttpBackend> {
    /// Load the catalog and build the HTTP invoker from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, MappingError> {
        let catalog = match &config.layouts.dir {
            Some(dir) => LayoutCatalog::load(dir)?,
            None => LayoutCatalog::load_default()?,
        };
        let invoker = ModelInvoker::from_config(config.invoker_config())?;
        Ok(Self::new(
            Arc::new(catalog),
            PromptComposer::new(config.prompt.max_chars),
            invoker,
        ))
    }
}

impl<B: CompletionBackend> MappingService<B> {
    pub fn new(
        catalog: Arc<LayoutCatalog>,
        composer: PromptComposer,
        invoker: ModelInvoker<B>,
    ) -> Self {
        Self {
            catalog,
            extractor: DictionaryExtractor::new(),
            composer,
            invoker,
            parser: MappingResponseParser::new(),
        }
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    pub fn invoker(&self) -> &ModelInvoker<B> {
        &self.invoker
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Look up the layout, extract the dictionary and compose the prompt.
    ///
    /// Does not contact the backend.
    pub fn prepare(
        &self,
        layout: &str,
        document: DictionaryDocument,
        source_tables: &SourceTables,
        model: &ModelSelector,
    ) -> Result<PreparedPrompt<'_>, MappingError> {
        let layout = self.catalog.get_layout(layout)?;
        let dictionary = self.extractor.extract(document)?;
        let request = MappingRequest::new(layout, &dictionary, source_tables, model);
        let composed = self.composer.compose_detailed(&request)?;
        let warnings = dictionary.warnings().to_vec();
        Ok(PreparedPrompt {
            layout,
            prompt: composed.prompt,
            report: composed.report,
            warnings,
        })
    }

    /// Run the full request cycle.
    pub fn run(
        &self,
        layout: &str,
        document: DictionaryDocument,
        source_tables: &SourceTables,
        model: &ModelSelector,
    ) -> Result<MappingResponse, MappingError> {
        let started = Instant::now();
        let span = info_span!(
            "mapping",
            layout = %layout,
            model = %model,
            tables = source_tables.len()
        );
        let _guard = span.enter();

        let PreparedPrompt {
            layout,
            prompt,
            report,
            warnings,
        } = self.prepare(layout, document, source_tables, model)?;

        let raw = self.invoker.invoke(&prompt, model)?;
        drop(prompt);
        let artifact = self.parser.parse(&raw, layout)?;
        drop(raw);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            mappings = artifact.field_mappings.len(),
            unknown_targets = artifact.unknown_target_fields.len(),
            sql_statements = artifact.sql_statements.len(),
            quality_checks = artifact.quality_checks.len(),
            elapsed_ms,
            "mapping generated"
        );

        Ok(MappingResponse {
            layout: layout.summary(),
            source_tables: source_tables.clone(),
            model: model.clone(),
            dictionary_entries: report.entries_total,
            entries_in_prompt: report.entries_kept,
            prompt_chars: report.prompt_chars,
            warnings,
            generated_at: Utc::now(),
            elapsed_ms,
            artifact,
        })
    }

    /// Run the full request cycle and return only the artifact.
    pub fn generate_mapping(
        &self,
        layout: &str,
        document: DictionaryDocument,
        source_tables: &SourceTables,
        model: &ModelSelector,
    ) -> Result<MappingArtifact, MappingError> {
        self.run(layout, document, source_tables, model)
            .map(|response| response.artifact)
    }
}
