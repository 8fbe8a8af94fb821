//! Subcommand implementations.

pub mod create;
pub mod gas;
pub mod run;
pub mod thermochemistry;
pub mod tuning;

pub use create::CreateArgs;
pub use gas::GasArgs;
pub use run::RunArgs;
pub use thermochemistry::ThermochemistryArgs;
pub use tuning::TuningArgs;

use cs_core::models::{parse_on_off, ModelResult};

/// Parse an `on`/`off` flag value.
pub(crate) fn parse_status(value: &str) -> ModelResult<bool> {
    parse_on_off("status", value)
}
