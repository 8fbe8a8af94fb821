use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::case::CaseError;
use crate::run_conf::RunConfError;

/// Errors raised while scaffolding a study.
#[derive(Error, Debug)]
pub enum StudyError {
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    #[error("Missing package file or directory {0}")]
    MissingTemplate(PathBuf),

    #[error("{0}")]
    Installation(String),

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    ExternalTool {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    RunConf(#[from] RunConfError),

    #[error(transparent)]
    Case(#[from] CaseError),
}

impl StudyError {
    pub(crate) fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type StudyResult<T> = Result<T, StudyError>;
