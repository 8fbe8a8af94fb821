//! Atomic file replacement shared by the case, config and run.cfg writers.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling path receiving the content before the rename (`<name>.tmp`).
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write content to a file atomically (temp file in the same directory, then rename).
///
/// Missing parent directories are created.
pub(crate) fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp = temp_path(path);
    {
        let mut file = fs::File::create(&temp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("DATA/run.cfg")),
            PathBuf::from("DATA/run.cfg.tmp")
        );
        assert_eq!(temp_path(Path::new("setup")), PathBuf::from("setup.tmp"));
    }

    #[test]
    fn replaces_content_and_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("setup.xml");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }
}
