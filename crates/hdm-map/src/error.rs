//! Error types for prompt composition and response parsing.

use hdm_model::UnknownTargetField;
use thiserror::Error;

use crate::markers::Section;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("no source tables were given")]
    NoSourceTables,

    #[error("dictionary text is empty")]
    EmptyDictionary,

    /// The fixed parts of the prompt plus one dictionary line exceed the budget.
    #[error("prompt budget of {max_chars} characters is too small (need at least {required})")]
    BudgetTooSmall { max_chars: usize, required: usize },
}

/// Structural violations of the marker grammar or of a section body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("response is empty")]
    Empty,

    #[error("line {line}: text before the first section marker")]
    TextBeforeFirstSection { line: usize },

    #[error("line {line}: unrecognised marker '{marker}'")]
    UnknownMarker { line: usize, marker: String },

    #[error("line {line}: section {section} appears more than once")]
    DuplicateSection { section: Section, line: usize },

    #[error("line {line}: section {found} appears before {expected}")]
    OutOfOrder {
        found: Section,
        expected: Section,
        line: usize,
    },

    #[error("missing section {0}")]
    MissingSection(Section),

    #[error("line {line}: {section} row has no ' | ' separator")]
    MissingSeparator { section: Section, line: usize },

    #[error("line {line}: {section} row has an empty first column")]
    EmptyColumn { section: Section, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] Malformed),

    #[error("duplicate mappings for target fields: {}", .targets.join(", "))]
    DuplicateTargetFields { targets: Vec<String> },

    #[error(
        "no valid field mappings; unknown target fields: {}",
        .fields.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    UnknownTargetFields { fields: Vec<UnknownTargetField> },

    #[error("response contains no field mappings")]
    NoFieldMappings,
}
