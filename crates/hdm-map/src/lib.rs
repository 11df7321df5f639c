//! Prompt composition and response parsing for layout mapping.
//!
//! The composer tells the model to answer in four marker-delimited sections
//! (see [`markers`]); the parser accepts nothing else.

pub mod compose;
pub mod error;
pub mod markers;
pub mod parse;

pub use compose::{ComposedPrompt, CompositionReport, DEFAULT_MAX_CHARS, PromptComposer};
pub use error::{ComposeError, Malformed, ParseError};
pub use markers::{GRAMMAR_VERSION, LineKind, Section, classify_line};
pub use parse::{MappingResponseParser, split_sql_statements};
