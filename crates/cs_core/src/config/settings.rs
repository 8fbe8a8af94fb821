//! Settings struct with TOML-based sections.
//!
//! Sections map to TOML tables and can be updated independently.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Package identity and installed data locations.
    #[serde(default)]
    pub package: PackageSettings,

    /// Optional third-party installations and batch system.
    #[serde(default)]
    pub install: InstallSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Package identity and installed data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Command name, also used for the local launcher script.
    #[serde(default = "default_name")]
    pub name: String,

    /// Solver name written in coupled run configurations.
    #[serde(default = "default_code_name")]
    pub code_name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Name of the GUI launcher (never copied between cases).
    #[serde(default = "default_gui_name")]
    pub gui_name: String,

    /// Package data directory holding `data/`, `user/`, `user_examples/`.
    /// Empty when not installed.
    #[serde(default)]
    pub data_dir: String,

    /// Shared data directory that may contain `neptune_cfd/`.
    #[serde(default)]
    pub shared_data_dir: String,

    /// Directory prepended to `PATH` by launcher scripts.
    #[serde(default)]
    pub bin_dir: String,
}

fn default_name() -> String {
    "code_saturne".to_string()
}

fn default_code_name() -> String {
    "Code_Saturne".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_gui_name() -> String {
    "SaturneGUI".to_string()
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            code_name: default_code_name(),
            version: default_version(),
            gui_name: default_gui_name(),
            data_dir: String::new(),
            shared_data_dir: String::new(),
            bin_dir: String::new(),
        }
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

impl PackageSettings {
    pub fn data_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.data_dir)
    }

    pub fn shared_data_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.shared_data_dir)
    }

    pub fn bin_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.bin_dir)
    }
}

/// Optional installations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallSettings {
    /// Cathare installation (library root).
    #[serde(default)]
    pub cathare: String,

    /// SYRTHES installation root.
    #[serde(default)]
    pub syrthes: String,

    /// Batch system template name (`PBS`, `LSF`, ...). Empty for workstations.
    #[serde(default)]
    pub batch: String,

    /// Resource section name used in `run.cfg`.
    #[serde(default)]
    pub resource_name: String,
}

impl InstallSettings {
    pub fn cathare(&self) -> Option<PathBuf> {
        non_empty_path(&self.cathare)
    }

    pub fn syrthes(&self) -> Option<PathBuf> {
        non_empty_path(&self.syrthes)
    }

    /// `run.cfg` section for this machine: the configured resource name,
    /// else the batch system name, else `job_defaults`.
    pub fn resource_name(&self) -> String {
        if !self.resource_name.trim().is_empty() {
            return self.resource_name.trim().to_string();
        }
        let batch = self.batch.trim();
        if !batch.is_empty() {
            return batch.to_lowercase();
        }
        "job_defaults".to_string()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level used when neither `RUST_LOG` nor a CLI flag overrides it.
    #[serde(default)]
    pub level: LogLevel,
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Package,
    Install,
    Logging,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Package => "package",
            ConfigSection::Install => "install",
            ConfigSection::Logging => "logging",
        }
    }

    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Package,
            ConfigSection::Install,
            ConfigSection::Logging,
        ]
    }
}
