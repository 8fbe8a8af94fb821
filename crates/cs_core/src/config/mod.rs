//! Configuration of the case toolkit.
//!
//! Settings describe where the installed package keeps its data (reference
//! files, user source templates), optional coupled-code installations, and
//! the default log level. They are stored as TOML with one table per
//! [`ConfigSection`].
//!
//! # Example
//!
//! ```no_run
//! use cs_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(ConfigManager::default_path().unwrap());
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().install.syrthes = "/opt/syrthes4".to_string();
//! config.update_section(ConfigSection::Install).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, InstallSettings, LoggingSettings, PackageSettings, Settings};
