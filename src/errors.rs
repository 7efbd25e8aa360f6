use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading and parsing a statement file
#[derive(Error, Debug)]
pub enum StatementParseError {
    /// Generic parse failure (detail in the message)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// File format is not supported
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Failure reading the file content from disk
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// The builder was called without content or a file path
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    // ── Format specific errors ──────────────────────────────────────────────────

    /// Invalid or malformed QFX/OFX date
    #[error("Invalid QFX/OFX date format")]
    QfxDateInvalidFormat,
}

/// Convenience alias for parser results
pub type StatementResult<T> = Result<T, StatementParseError>;

/// Errors raised by one conversion, or by the invocation as a whole
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Invalid combination of command line options
    #[error("{0}")]
    Usage(String),

    /// Reserved: the UTF-8 → Latin-1 fallback cannot fail today
    #[error("Unable to decode {path}")]
    Encoding { path: PathBuf },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] StatementParseError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Write {
            path: path.into(),
            source,
        }
    }
}
