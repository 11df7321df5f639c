use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::sensitive::{wipe_bytes, wipe_string};

/// The two families of dictionary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Tabular,
    Document,
}

impl FormatKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Tabular => "tabular",
            FormatKind::Document => "document",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete file formats accepted as a data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryFormat {
    Csv,
    Tsv,
    Pdf,
}

impl DictionaryFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(DictionaryFormat::Csv),
            "tsv" | "tab" => Some(DictionaryFormat::Tsv),
            "pdf" => Some(DictionaryFormat::Pdf),
            _ => None,
        }
    }

    pub const fn kind(&self) -> FormatKind {
        match self {
            DictionaryFormat::Csv | DictionaryFormat::Tsv => FormatKind::Tabular,
            DictionaryFormat::Pdf => FormatKind::Document,
        }
    }

    /// Field delimiter for tabular formats.
    pub const fn delimiter(&self) -> Option<u8> {
        match self {
            DictionaryFormat::Csv => Some(b','),
            DictionaryFormat::Tsv => Some(b'\t'),
            DictionaryFormat::Pdf => None,
        }
    }
}

/// An uploaded dictionary file, owned by exactly one request.
///
/// The bytes are zeroed when the document is dropped.
pub struct DictionaryDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl DictionaryDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a dictionary from disk. The file name drives format detection.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Extension of the declared file name, without the dot.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }

    /// Declared format, `None` when the extension is not supported.
    pub fn format(&self) -> Option<DictionaryFormat> {
        DictionaryFormat::from_extension(self.extension())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DictionaryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryDocument")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Drop for DictionaryDocument {
    fn drop(&mut self) {
        wipe_bytes(&mut self.bytes);
    }
}

/// What a block of extracted dictionary text describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    /// All rows of one source table.
    Table(String),
    /// Text of one document page (1-based).
    Page(u32),
    /// Rows that carry no table name.
    Ungrouped,
}

impl SectionLabel {
    /// Heading line used when rendering, `None` for ungrouped rows.
    pub fn heading(&self) -> Option<String> {
        match self {
            SectionLabel::Table(name) => Some(format!("### table {name}")),
            SectionLabel::Page(number) => Some(format!("### page {number}")),
            SectionLabel::Ungrouped => None,
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        match self {
            SectionLabel::Table(name) => Some(name),
            _ => None,
        }
    }
}

/// One record-preserving block of extracted text: a table or a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySection {
    pub label: SectionLabel,
    pub lines: Vec<String>,
}

impl DictionarySection {
    pub fn new(label: SectionLabel) -> Self {
        Self {
            label,
            lines: Vec::new(),
        }
    }

    /// Rendered text of the section: optional heading followed by its lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(heading) = self.label.heading() {
            out.push_str(&heading);
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// A non-fatal problem met during extraction (skipped row or page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub location: String,
    pub message: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Normalized dictionary text, owned by one request and wiped on drop.
pub struct ExtractedDictionaryText {
    kind: FormatKind,
    sections: Vec<DictionarySection>,
    warnings: Vec<ExtractionWarning>,
}

impl ExtractedDictionaryText {
    /// Empty sections are dropped; section order is preserved.
    pub fn new(
        kind: FormatKind,
        sections: Vec<DictionarySection>,
        warnings: Vec<ExtractionWarning>,
    ) -> Self {
        let sections = sections
            .into_iter()
            .filter(|section| !section.lines.is_empty())
            .collect();
        Self {
            kind,
            sections,
            warnings,
        }
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    pub fn sections(&self) -> &[DictionarySection] {
        &self.sections
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Number of dictionary lines (rows or page lines) across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|section| section.lines.len()).sum()
    }

    /// True when no section carries a non-blank line.
    pub fn is_blank(&self) -> bool {
        self.sections
            .iter()
            .flat_map(|section| section.lines.iter())
            .all(|line| line.trim().is_empty())
    }

    /// Full text: sections separated by a blank line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(DictionarySection::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for ExtractedDictionaryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedDictionaryText")
            .field("kind", &self.kind)
            .field("sections", &self.sections.len())
            .field("entries", &self.entry_count())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

impl Drop for ExtractedDictionaryText {
    fn drop(&mut self) {
        for section in &mut self.sections {
            for line in &mut section.lines {
                wipe_string(line);
            }
        }
    }
}
