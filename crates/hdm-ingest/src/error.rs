use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported dictionary format '{extension}' for {file_name} (expected csv, tsv or pdf)")]
    UnsupportedFormat { file_name: String, extension: String },

    #[error("dictionary {file_name} contains no usable text")]
    EmptyDictionary { file_name: String },

    #[error("failed to read tabular dictionary {file_name}: {message}")]
    Tabular { file_name: String, message: String },

    #[error("failed to open document {file_name}: {message}")]
    Document { file_name: String, message: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
