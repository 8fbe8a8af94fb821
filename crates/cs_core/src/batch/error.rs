use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::run_conf::RunConfError;

use super::job::Computer;

/// Errors that prevent a run from being launched.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("The current case must be saved before batch running.")]
    NotSaved,

    #[error("You have to select a mesh.")]
    NoMesh,

    #[error("Batch submission is not supported for computer '{0}'")]
    Unsupported(Computer),

    #[error("Invalid {what} '{value}'")]
    InvalidParameter { what: &'static str, value: String },

    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    RunConf(#[from] RunConfError),
}

impl BatchError {
    pub(crate) fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            what,
            value: value.into(),
        }
    }
}

pub type BatchResult<T> = Result<T, BatchError>;
