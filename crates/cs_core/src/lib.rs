//! CS Core - case configuration and study scaffolding for Code_Saturne
//!
//! This crate holds all case-editing and scaffolding logic with zero UI
//! dependencies. The `cs` command-line tool is a thin layer on top of it.

mod atomic;
pub mod batch;
pub mod case;
pub mod config;
pub mod logging;
pub mod models;
pub mod run_conf;
pub mod study;
pub mod xml;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
