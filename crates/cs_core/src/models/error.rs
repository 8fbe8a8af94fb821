//! Errors raised by model accessors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Validation and persistence errors from model wrappers.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A value is not one of the enumerated choices.
    #[error("Invalid {what} '{value}' (expected one of: {})", .allowed.join(", "))]
    InvalidOption {
        what: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    /// A numeric value is outside its accepted range.
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: String },

    /// A combustion option does not belong to the selected model.
    #[error("Option '{option}' is not available for gas combustion model '{model}'")]
    OptionMismatch { model: String, option: String },

    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("Species '{0}' already exists")]
    DuplicateSpecies(String),

    #[error("Boundary zone '{0}' already exists")]
    DuplicateZone(String),

    /// The accessor does not apply to the current model selection.
    #[error("{0}")]
    NotApplicable(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ModelError {
    /// Create an out of range error.
    pub fn out_of_range(what: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange {
            what,
            value: value.to_string(),
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
