//! `run.cfg` run configuration files.
//!
//! INI-style: `[section]` headers, `key = value` (or `key: value`) entries,
//! `#`/`;` comment lines, and indented continuation lines that extend the
//! previous value with a newline. Section and key order are preserved.
//!
//! ```
//! use cs_core::run_conf::RunConf;
//!
//! let mut conf = RunConf::parse("[setup]\nparam = setup.xml\n").unwrap();
//! conf.set("run", "n_procs", "4");
//! assert_eq!(conf.get("run", "n_procs"), Some("4"));
//! assert_eq!(conf.to_string(), "[setup]\nparam = setup.xml\n\n[run]\nn_procs = 4\n");
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use crate::atomic::atomic_write;
use thiserror::Error;

/// Literal written for unset values.
pub const NONE_LITERAL: &str = "None";

#[derive(Error, Debug)]
pub enum RunConfError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("run.cfg line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type RunConfResult<T> = Result<T, RunConfError>;

type Section = IndexMap<String, String>;

/// Parsed `run.cfg` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConf {
    sections: IndexMap<String, Section>,
}

impl RunConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration written into a freshly created case.
    pub fn case_default(param: &str) -> Self {
        let mut conf = Self::new();
        conf.set("setup", "param", param);
        conf.set("run", "n_procs", "1");
        conf
    }

    pub fn parse(content: &str) -> RunConfResult<Self> {
        let mut conf = Self::new();
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with(|c: char| c.is_whitespace());
            if indented {
                if let (Some(section), Some(key)) = (&current, &last_key) {
                    if let Some(value) = conf
                        .sections
                        .get_mut(section)
                        .and_then(|entries| entries.get_mut(key))
                    {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(RunConfError::Parse {
                        line,
                        message: "empty section name".to_string(),
                    });
                }
                conf.sections.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                last_key = None;
                continue;
            }

            let Some(split) = trimmed.find(|c| c == '=' || c == ':') else {
                return Err(RunConfError::Parse {
                    line,
                    message: format!("expected 'key = value', found '{trimmed}'"),
                });
            };
            let key = trimmed[..split].trim();
            let value = trimmed[split + 1..].trim();
            if key.is_empty() {
                return Err(RunConfError::Parse {
                    line,
                    message: "missing key".to_string(),
                });
            }
            let Some(section) = &current else {
                return Err(RunConfError::Parse {
                    line,
                    message: format!("key '{key}' outside of a section"),
                });
            };

            conf.set(section, key, value);
            last_key = Some(key.to_string());
        }

        Ok(conf)
    }

    /// Read a file.
    pub fn load(path: impl AsRef<Path>) -> RunConfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RunConfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let conf = Self::parse(&content)?;
        tracing::debug!("Loaded {}", path.display());
        Ok(conf)
    }

    /// Read a file, or start empty when it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> RunConfResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write atomically (temp file, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> RunConfResult<()> {
        let path = path.as_ref();
        atomic_write(path, &self.to_string()).map_err(|source| RunConfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Saved {}", path.display());
        Ok(())
    }

    /// Value of `key` in `section`. The `None` literal reads as unset.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(key)
            .map(String::as_str)
            .filter(|value| *value != NONE_LITERAL)
    }

    /// Set a value, creating the section if needed. Existing keys keep their
    /// position.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Set a value, writing `None` when absent.
    pub fn set_opt(&mut self, section: &str, key: &str, value: Option<&str>) {
        self.set(section, key, value.unwrap_or(NONE_LITERAL));
    }

    /// Remove a key. Empty sections are kept.
    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        self.sections.get_mut(section)?.shift_remove(key)
    }

    pub fn remove_section(&mut self, section: &str) -> bool {
        self.sections.shift_remove(section).is_some()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names, in file order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Keys of a section, in file order.
    pub fn keys(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(section)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for RunConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, entries)) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{name}]")?;
            for (key, value) in entries {
                let mut lines = value.trim_end_matches('\n').lines();
                writeln!(f, "{key} = {}", lines.next().unwrap_or(""))?;
                for line in lines {
                    writeln!(f, "    {line}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# generated
[setup]
param = setup.xml
coupled_domains = FLUID:SOLID

[job_defaults]
compute_prologue = export v25_3=/opt/cathare
    export LD_PATH_LIBRARY=$v25_3/lib/:$LD_LIBRARY_PATH

[run]
n_procs: 8
";

    #[test]
    fn parse_keeps_order_and_continuations() {
        let conf = RunConf::parse(SAMPLE).unwrap();
        assert_eq!(
            conf.sections().collect::<Vec<_>>(),
            vec!["setup", "job_defaults", "run"]
        );
        assert_eq!(conf.keys("setup"), vec!["param", "coupled_domains"]);
        assert_eq!(
            conf.get("job_defaults", "compute_prologue"),
            Some("export v25_3=/opt/cathare\nexport LD_PATH_LIBRARY=$v25_3/lib/:$LD_LIBRARY_PATH")
        );
        assert_eq!(conf.get("run", "n_procs"), Some("8"));
    }

    #[test]
    fn reserialized_file_parses_identically() {
        let conf = RunConf::parse(SAMPLE).unwrap();
        let again = RunConf::parse(&conf.to_string()).unwrap();
        assert_eq!(conf, again);
    }

    #[test]
    fn none_literal() {
        let mut conf = RunConf::new();
        conf.set_opt("FLUID", "n_procs_weight", None);
        assert_eq!(conf.get("FLUID", "n_procs_weight"), None);
        assert!(conf.to_string().contains("n_procs_weight = None"));
    }

    #[test]
    fn set_existing_key_keeps_position() {
        let mut conf = RunConf::case_default("setup.xml");
        conf.set("setup", "param", "other.xml");
        conf.set("run", "n_procs", "2");
        assert_eq!(
            conf.to_string(),
            "[setup]\nparam = other.xml\n\n[run]\nn_procs = 2\n"
        );
        assert_eq!(conf.remove("run", "n_procs").as_deref(), Some("2"));
        assert!(conf.has_section("run"));
        assert!(conf.remove_section("run"));
    }

    #[test]
    fn parse_errors_report_line() {
        let err = RunConf::parse("param = x\n").unwrap_err();
        assert!(matches!(err, RunConfError::Parse { line: 1, .. }));

        let err = RunConf::parse("[setup]\n\nnot a pair\n").unwrap_err();
        assert!(matches!(err, RunConfError::Parse { line: 3, .. }));
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("DATA").join("run.cfg");
        assert_eq!(RunConf::load_or_default(&path).unwrap(), RunConf::new());

        RunConf::case_default("setup.xml").save(&path).unwrap();
        assert!(!path.with_extension("cfg.tmp").exists());
        let loaded = RunConf::load(&path).unwrap();
        assert_eq!(loaded.get("setup", "param"), Some("setup.xml"));
    }
}
