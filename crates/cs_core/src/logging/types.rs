//! Logging types.

use serde::{Deserialize, Serialize};

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing level.
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// How chatty command-line tools are.
///
/// Ordered: `Quiet < Normal < Verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    #[default]
    Normal,
    /// Progress details and summaries.
    Verbose,
}

impl Verbosity {
    /// Derive from `-q` / `-v` flags. `-q` wins.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Verbosity::Quiet => LogLevel::Warn,
            Verbosity::Normal => LogLevel::Info,
            Verbosity::Verbose => LogLevel::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true).log_level(), LogLevel::Debug);
        assert_eq!(Verbosity::default().log_level(), LogLevel::Info);
        assert!(Verbosity::Quiet < Verbosity::Verbose);
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
    }
}
