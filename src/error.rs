//! Error types for the restitch library.

use std::io;
use thiserror::Error;

/// Result type alias for restitch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document reconstruction.
///
/// Heuristic non-matches (no continuation parent, no numbered section in the
/// lookahead window, too few key-value records) are not errors: those stages
/// return their input unchanged. Only payload parsing, persistence, and
/// document assembly are fallible.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The extraction service response is not well-formed structured data,
    /// even after one bounded repair pass.
    #[error("Malformed extraction payload: {0}")]
    Payload(String),

    /// Error reading or writing persisted page content.
    #[error("Page store error: {0}")]
    Store(String),

    /// Error assembling rendered output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The extraction collaborator reported a failure for a page.
    #[error("Extraction failed for page {0}: {1}")]
    Extraction(u32, String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Payload("unexpected token".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed extraction payload: unexpected token"
        );

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Payload(_)));
    }
}
