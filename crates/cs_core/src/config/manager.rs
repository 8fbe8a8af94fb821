//! Config manager for loading, saving, and atomic updates.
//!
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates that leave other tables untouched
//! - Unknown tables are dropped on `load_or_create`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use crate::atomic::atomic_write;

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot determine a configuration directory for this user")]
    NoConfigDir,
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the toolkit configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Create a manager for the given file. Nothing is read until `load*`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Per-user default location (`<config dir>/code_saturne/settings.toml`).
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "code_saturne", "code_saturne").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("settings.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes stay in memory until `save()` or `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file. Errors if the file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", self.config_path.display());
        Ok(())
    }

    /// Load config if the file exists, otherwise keep defaults.
    /// Never writes.
    pub fn load_or_default(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            self.load()
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            self.settings = Settings::default();
            Ok(())
        }
    }

    /// Load config from file, creating it with defaults if missing.
    ///
    /// A file with unknown tables or missing keys is rewritten.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::info!("Normalizing config file {}", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Parse content and report whether it differs from its normalized form.
    fn parse_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;
        let settings: Settings = toml::from_str(content)?;

        let has_unknown = doc.iter().any(|(key, _)| {
            !ConfigSection::all()
                .iter()
                .any(|section| section.table_name() == key)
        });

        let normalized = self.generate_config_with_comments_for(&settings)?;
        let reparsed: DocumentMut = normalized.parse()?;
        let was_modified = has_unknown || !same_values(&doc, &reparsed);

        Ok((settings, was_modified))
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments_for(&self.settings)?;
        atomic_write(&self.config_path, &content)?;
        Ok(())
    }

    /// Rewrite one section on disk, keeping the rest of the file as is.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_toml = self.section_toml(&self.settings, section)?;
        let section_doc: DocumentMut = section_toml.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        atomic_write(&self.config_path, &doc.to_string())?;
        tracing::debug!("Updated [{}] in {}", section.table_name(), self.config_path.display());
        Ok(())
    }

    fn section_toml(&self, settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
        Ok(match section {
            ConfigSection::Package => toml::to_string_pretty(&settings.package)?,
            ConfigSection::Install => toml::to_string_pretty(&settings.install)?,
            ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
        })
    }

    fn generate_config_with_comments_for(&self, settings: &Settings) -> ConfigResult<String> {
        let mut output = String::new();
        output.push_str("# code_saturne case toolkit configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n",
        );

        for &section in ConfigSection::all() {
            let comment = match section {
                ConfigSection::Package => "# Package identity and installed data",
                ConfigSection::Install => "# Optional coupled codes and batch system",
                ConfigSection::Logging => "# Logging configuration",
            };
            output.push('\n');
            output.push_str(comment);
            output.push('\n');
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(settings, section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }
}

/// Compare two documents table by table, ignoring formatting and comments.
fn same_values(a: &DocumentMut, b: &DocumentMut) -> bool {
    let keys = |doc: &DocumentMut| -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for (table, item) in doc.iter() {
            if let Some(table_like) = item.as_table_like() {
                for (key, value) in table_like.iter() {
                    let value = value
                        .as_value()
                        .map(|v| v.to_string().trim().to_string())
                        .unwrap_or_default();
                    entries.push((format!("{table}.{key}"), value));
                }
            }
        }
        entries.sort();
        entries
    };
    keys(a) == keys(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[package]"));
        assert!(content.contains("[install]"));
        assert!(content.contains("[logging]"));
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        fs::write(&config_path, "[install]\ncathare = \"/opt/cathare\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().install.cathare, "/opt/cathare");
        // Missing tables were filled in on disk.
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn load_or_create_drops_unknown_tables() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let mut content = fs::read_to_string(&config_path).unwrap();
        content.push_str("\n[paths]\noutput_folder = \"x\"\n");
        fs::write(&config_path, content).unwrap();

        manager.load_or_create().unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("[paths]"));
    }

    #[test]
    fn load_or_default_does_not_write() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_default().unwrap();
        assert!(!config_path.exists());
        assert_eq!(manager.settings().package.name, "code_saturne");
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().install.syrthes = "/opt/syrthes".to_string();
        manager.settings_mut().package.bin_dir = "/not/saved".to_string();
        manager.update_section(ConfigSection::Install).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("syrthes = \"/opt/syrthes\""));
        assert!(!content.contains("/not/saved"));
        assert!(content.contains("# Package identity and installed data"));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(!config_path.with_extension("toml.tmp").exists());
    }
}
