//! Logging setup.
//!
//! Library code emits `tracing` events; binaries install a subscriber once
//! with [`init_tracing`]. `RUST_LOG` takes precedence over the level passed
//! in.

mod types;

pub use types::{LogLevel, Verbosity};

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// - Respects the `RUST_LOG` environment variable
/// - Falls back to the provided default level
/// - Writes to stderr so command output on stdout stays clean
///
/// Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(default_filter(default_level).into())
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn default_filter(level: LogLevel) -> LevelFilter {
    LevelFilter::from_level(level.to_tracing_level())
}
