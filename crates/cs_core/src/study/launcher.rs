//! Local launcher script and execute permissions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PackageSettings;

use super::error::{StudyError, StudyResult};

/// Launcher script text for a package.
pub fn launcher_script(package: &PackageSettings) -> String {
    let mut script = String::from("#!/bin/sh\n\n");
    script.push_str("# Ensure the correct command is found:\n");
    if let Some(bin_dir) = package.bin_dir() {
        script.push_str(&format!("export PATH=\"{}\":$PATH\n", bin_dir.display()));
    }
    script.push_str(
        r#"
# Insert default command
cs_cmd=""
if test $# = 1; then
  if test -f $1; then
    cs_cmd=gui
  fi
elif test $# = 0; then
  cs_cmd=gui
fi

# Run command
"#,
    );
    script.push_str(&format!("\\{} $cs_cmd \"$@\"\n", package.name));
    script
}

/// Write `<dir>/<package name>` and make it executable.
pub fn write_launcher(dir: &Path, package: &PackageSettings) -> StudyResult<PathBuf> {
    let path = dir.join(&package.name);
    fs::write(&path, launcher_script(package))
        .map_err(|e| StudyError::io(format!("writing {}", path.display()), e))?;
    set_executable(&path)
        .map_err(|e| StudyError::io(format!("setting permissions of {}", path.display()), e))?;
    tracing::debug!("Wrote launcher {}", path.display());
    Ok(path)
}

/// `chmod +x` for the owner, plus group and others when they can read.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut mode = fs::metadata(path)?.permissions().mode() | 0o100;
    if mode & 0o040 != 0 {
        mode |= 0o010;
    }
    if mode & 0o004 != 0 {
        mode |= 0o001;
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Clear every execute bit of a file, or of the regular files directly
/// inside a directory.
pub fn unset_executable(path: &Path) -> io::Result<()> {
    if path.is_file() {
        return clear_execute_bits(path);
    }
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                clear_execute_bits(&entry.path())?;
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn clear_execute_bits(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode() & !0o111;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn clear_execute_bits(_path: &Path) -> io::Result<()> {
    Ok(())
}
