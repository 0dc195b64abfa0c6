//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while loading or writing a DOCX package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error in {part}: {message}")]
    XmlParse { part: String, message: String },

    /// Invalid DOCX structure
    #[error("Invalid DOCX structure: {0}")]
    InvalidStructure(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl DocxError {
    /// Build an XML error attributed to a package part
    pub fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        DocxError::XmlParse {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
