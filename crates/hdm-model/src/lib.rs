pub mod artifact;
pub mod dictionary;
pub mod error;
pub mod layout;
pub mod request;
pub mod sensitive;

pub use artifact::{DataQualityCheck, FieldMapping, MappingArtifact, UnknownTargetField};
pub use dictionary::{
    DictionaryDocument, DictionaryFormat, DictionarySection, ExtractedDictionaryText,
    ExtractionWarning, FormatKind, SectionLabel,
};
pub use error::{ModelError, Result};
pub use layout::{FieldSpec, FieldType, Layout, LayoutId, LayoutPreview, LayoutSummary};
pub use request::{MappingRequest, ModelSelector, PromptText, RawModelText, SourceTables};
