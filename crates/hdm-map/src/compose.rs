//! Deterministic prompt composition.

use hdm_model::{
    DictionarySection, ExtractedDictionaryText, Layout, MappingRequest, PromptText, SectionLabel,
    SourceTables,
};
use tracing::{debug, info_span};

use crate::error::ComposeError;
use crate::markers::Section;

/// Default prompt budget in characters.
pub const DEFAULT_MAX_CHARS: usize = 120_000;

/// How much of the dictionary made it into a composed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionReport {
    pub prompt_chars: usize,
    pub entries_total: usize,
    pub entries_kept: usize,
}

impl CompositionReport {
    pub fn entries_omitted(&self) -> usize {
        self.entries_total - self.entries_kept
    }

    pub fn truncated(&self) -> bool {
        self.entries_kept < self.entries_total
    }
}

#[derive(Debug)]
pub struct ComposedPrompt {
    pub prompt: PromptText,
    pub report: CompositionReport,
}

/// Builds the single instruction prompt for a mapping request.
///
/// Output is a pure function of the request and `max_chars`. The prompt never
/// exceeds `max_chars` characters; when the dictionary does not fit, whole
/// sections are kept first (sections of requested tables ahead of the rest),
/// then whole lines of the next section, and a note records what was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptComposer {
    max_chars: usize,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl PromptComposer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn compose(&self, request: &MappingRequest<'_>) -> Result<PromptText, ComposeError> {
        self.compose_detailed(request).map(|composed| composed.prompt)
    }

    pub fn compose_detailed(
        &self,
        request: &MappingRequest<'_>,
    ) -> Result<ComposedPrompt, ComposeError> {
        let span = info_span!(
            "compose",
            layout = %request.layout.id(),
            tables = request.source_tables.len(),
            model = %request.model,
            max_chars = self.max_chars
        );
        let _guard = span.enter();

        if request.source_tables.is_empty() {
            return Err(ComposeError::NoSourceTables);
        }
        let entries_total = request.dictionary.entry_count();
        if entries_total == 0 {
            return Err(ComposeError::EmptyDictionary);
        }

        let head = render_head(request.layout, request.source_tables);
        let tail = render_tail();
        let fixed = char_len(&head) + char_len(&tail);

        let full = request.dictionary.render();
        let (dictionary, entries_kept) = if fixed + char_len(&full) <= self.max_chars {
            (full, entries_total)
        } else {
            let budget = self.max_chars.saturating_sub(fixed);
            fit_dictionary(request.dictionary, request.source_tables, budget).ok_or_else(|| {
                ComposeError::BudgetTooSmall {
                    max_chars: self.max_chars,
                    required: fixed
                        + minimal_dictionary_chars(request.dictionary, request.source_tables),
                }
            })?
        };

        let mut text = String::with_capacity(head.len() + dictionary.len() + tail.len());
        text.push_str(&head);
        text.push_str(&dictionary);
        text.push_str(&tail);

        let report = CompositionReport {
            prompt_chars: char_len(&text),
            entries_total,
            entries_kept,
        };
        debug!(
            prompt_chars = report.prompt_chars,
            entries_kept,
            entries_omitted = report.entries_omitted(),
            "prompt composed"
        );
        Ok(ComposedPrompt {
            prompt: PromptText::new(text),
            report,
        })
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn render_head(layout: &Layout, tables: &SourceTables) -> String {
    let mut out = String::new();
    out.push_str(
        "You are a US healthcare data modeler and data analyst. Map the source tables \
         described in the data dictionary onto the target output layout.\n\n",
    );
    out.push_str(&format!(
        "TARGET LAYOUT: {} ({} fields)\n",
        layout.name(),
        layout.len()
    ));
    for field in layout.fields() {
        out.push_str(&format!("- {} ({})", field.name, field.data_type));
        if !field.description.is_empty() {
            out.push_str(": ");
            out.push_str(&field.description);
        }
        out.push('\n');
    }
    out.push_str("\nSOURCE TABLES:\n");
    out.push_str(&tables.to_string());
    out.push_str("\n\nDATA DICTIONARY:\n");
    out
}

fn render_tail() -> String {
    let [mappings, sql, checks, notes] = Section::ALL.map(|section| section.marker());
    format!(
        "\nREQUIREMENTS:\n\
         1. Map every target field that can be derived from the source tables. Use only \
         target field names from the layout above.\n\
         2. Express transformations in SQL: CAST for type conversions, JOIN between source \
         tables, TRIM for string cleanup, CASE/WHEN for conditional logic, COALESCE for \
         nulls, string concatenation and date formatting where needed.\n\
         3. Follow US healthcare data conventions (HL7, FHIR, X12 code sets).\n\
         4. Refer to source columns as table.column.\n\
         \n\
         OUTPUT FORMAT:\n\
         Reply with exactly these four section markers, each alone on its own line, in this \
         order, with nothing before the first marker:\n\
         {mappings}\n{sql}\n{checks}\n{notes}\n\
         \n\
         Under {mappings} write one line per target field, with no header row:\n\
         TARGET_FIELD | SOURCE_EXPRESSION | NOTES\n\
         Each target field appears at most once.\n\
         Under {sql} write the transformation SQL, ending every statement with a semicolon.\n\
         Under {checks} write one line per data quality check:\n\
         DESCRIPTION | RULE\n\
         Under {notes} write free-text notes on assumptions made.\n\
         A section may be empty, but its marker is required.\n"
    )
}

fn truncation_note(omitted: usize, total: usize) -> String {
    format!("[dictionary truncated: {omitted} of {total} entries omitted to fit the prompt]\n")
}

/// Order sections so those describing requested tables come first, in
/// request order. Untabled sections (pages) rank by the first requested table
/// they mention.
fn prioritized<'a>(
    dictionary: &'a ExtractedDictionaryText,
    tables: &SourceTables,
) -> Vec<&'a DictionarySection> {
    let mut ordered: Vec<(usize, &DictionarySection)> = dictionary
        .sections()
        .iter()
        .map(|section| (section_priority(section, tables), section))
        .collect();
    ordered.sort_by_key(|(priority, _)| *priority);
    ordered.into_iter().map(|(_, section)| section).collect()
}

fn section_priority(section: &DictionarySection, tables: &SourceTables) -> usize {
    match &section.label {
        SectionLabel::Table(name) => tables.position(name).unwrap_or(usize::MAX),
        SectionLabel::Page(_) | SectionLabel::Ungrouped => tables
            .iter()
            .position(|table| {
                let needle = table.to_ascii_lowercase();
                section
                    .lines
                    .iter()
                    .any(|line| line.to_ascii_lowercase().contains(&needle))
            })
            .unwrap_or(usize::MAX),
    }
}

fn heading_line(section: &DictionarySection) -> String {
    section
        .label
        .heading()
        .map(|heading| format!("{heading}\n"))
        .unwrap_or_default()
}

/// Fit as much of the dictionary as possible into `budget` characters,
/// including the truncation note. `None` when not even one line fits.
fn fit_dictionary(
    dictionary: &ExtractedDictionaryText,
    tables: &SourceTables,
    budget: usize,
) -> Option<(String, usize)> {
    let total = dictionary.entry_count();
    let available = budget.checked_sub(char_len(&truncation_note(total, total)))?;

    let mut out = String::new();
    let mut used = 0;
    let mut kept = 0;
    for section in prioritized(dictionary, tables) {
        let separator = usize::from(!out.is_empty());
        let rendered = section.render();
        let size = char_len(&rendered);
        if used + separator + size <= available {
            if separator == 1 {
                out.push('\n');
            }
            out.push_str(&rendered);
            used += separator + size;
            kept += section.lines.len();
            continue;
        }

        // Keep whole records of the first section that does not fit, then stop.
        let heading = heading_line(section);
        let mut partial = String::new();
        let mut partial_used = separator + char_len(&heading);
        for line in &section.lines {
            let size = char_len(line) + 1;
            if used + partial_used + size > available {
                break;
            }
            partial.push_str(line);
            partial.push('\n');
            partial_used += size;
            kept += 1;
        }
        if !partial.is_empty() {
            if separator == 1 {
                out.push('\n');
            }
            out.push_str(&heading);
            out.push_str(&partial);
        }
        break;
    }

    if kept == 0 {
        return None;
    }
    if kept < total {
        out.push_str(&truncation_note(total - kept, total));
    }
    Some((out, kept))
}

fn minimal_dictionary_chars(dictionary: &ExtractedDictionaryText, tables: &SourceTables) -> usize {
    let total = dictionary.entry_count();
    let first = prioritized(dictionary, tables)
        .first()
        .map(|section| {
            let line = section.lines.first().map_or(0, |l| char_len(l) + 1);
            char_len(&heading_line(section)) + line
        })
        .unwrap_or_default();
    first + char_len(&truncation_note(total, total))
}
