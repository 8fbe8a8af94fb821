//! XML error types.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading or writing an XML document.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Failed to access XML file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: String, found: String },
}

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;
