//! Error types for template expansion

use thiserror::Error;

/// Boxed error from a document model or the filesystem
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while expanding a template
#[derive(Debug, Error)]
pub enum ExpanderError {
    /// A caller-supplied argument is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A rule pattern does not compile
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    /// The template was valid at construction but is not usable now
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Loading, parsing or writing a package failed
    #[error("I/O failure on {target}: {source}")]
    IoFailure {
        target: String,
        #[source]
        source: BoxError,
    },

    /// A rule file is not valid JSON or has the wrong shape
    #[error("Rule file error: {0}")]
    RuleFormat(#[from] serde_json::Error),
}

/// Coarse classification of [`ExpanderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    PreconditionViolation,
    IoFailure,
}

impl ExpanderError {
    pub(crate) fn io(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ExpanderError::IoFailure {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExpanderError::InvalidArgument(_) | ExpanderError::InvalidPattern { .. } => ErrorKind::InvalidArgument,
            ExpanderError::PreconditionViolation(_) => ErrorKind::PreconditionViolation,
            ExpanderError::IoFailure { .. } | ExpanderError::RuleFormat(_) => ErrorKind::IoFailure,
        }
    }
}

/// Result type for template expansion
pub type Result<T> = std::result::Result<T, ExpanderError>;
