use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown layout: {0}")]
    UnknownLayout(String),
    #[error("unknown field type '{value}' for field {field}")]
    UnknownFieldType { field: String, value: String },
    #[error("duplicate field {field} in layout {layout}")]
    DuplicateField { layout: String, field: String },
    #[error("empty field name in layout {layout}")]
    EmptyFieldName { layout: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
