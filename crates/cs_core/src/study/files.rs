//! File copies used when filling a case. Copied files never keep execute
//! bits.

use std::fs;
use std::path::Path;

use super::error::{StudyError, StudyResult};
use super::launcher::unset_executable;

pub(super) fn make_dir(path: &Path) -> StudyResult<()> {
    if path.exists() {
        return Err(StudyError::AlreadyExists(path.to_path_buf()));
    }
    fs::create_dir(path).map_err(|e| StudyError::io(format!("creating {}", path.display()), e))
}

/// Create a directory unless it is already there.
pub(super) fn ensure_dir(path: &Path) -> StudyResult<()> {
    fs::create_dir_all(path)
        .map_err(|e| StudyError::io(format!("creating {}", path.display()), e))
}

/// Copy one file to `dest` (a file path).
pub(super) fn copy_file(src: &Path, dest: &Path) -> StudyResult<()> {
    fs::copy(src, dest).map_err(|e| {
        StudyError::io(
            format!("copying {} to {}", src.display(), dest.display()),
            e,
        )
    })?;
    unset_executable(dest)
        .map_err(|e| StudyError::io(format!("setting permissions of {}", dest.display()), e))
}

/// Copy a whole directory tree.
pub(super) fn copy_tree(src: &Path, dest: &Path) -> StudyResult<()> {
    if !src.is_dir() {
        return Err(StudyError::MissingTemplate(src.to_path_buf()));
    }
    ensure_dir(dest)?;
    for entry in read_dir(src)? {
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copy_tree(&path, &target)?;
        } else if path.is_file() {
            copy_file(&path, &target)?;
        }
    }
    Ok(())
}

/// Copy the regular files directly inside `src` into `dest`, skipping
/// names in `skip`. Returns the number of copied files.
pub(super) fn copy_regular_files(src: &Path, dest: &Path, skip: &[&str]) -> StudyResult<usize> {
    let mut copied = 0;
    for entry in read_dir(src)? {
        let path = entry.path();
        let name = entry.file_name();
        if !path.is_file() || skip.iter().any(|s| name.as_os_str() == *s) {
            continue;
        }
        copy_file(&path, &dest.join(&name))?;
        copied += 1;
    }
    Ok(copied)
}

/// Directory entries sorted by name, for reproducible copies.
fn read_dir(dir: &Path) -> StudyResult<Vec<fs::DirEntry>> {
    let reading = |e| StudyError::io(format!("reading {}", dir.display()), e);
    let mut entries = fs::read_dir(dir)
        .map_err(reading)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(reading)?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn make_dir_refuses_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CASE1");
        make_dir(&path).unwrap();
        assert!(matches!(make_dir(&path), Err(StudyError::AlreadyExists(_))));
    }

    #[test]
    fn copy_tree_recurses() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("user");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.c"), "a").unwrap();
        fs::write(src.join("sub").join("b.f90"), "b").unwrap();

        let dest = dir.path().join("REFERENCE");
        copy_tree(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("sub").join("b.f90")).unwrap(), "b");

        assert!(matches!(
            copy_tree(&dir.path().join("missing"), &dest),
            Err(StudyError::MissingTemplate(_))
        ));
    }

    #[test]
    fn regular_files_skip_names() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("DATA");
        fs::create_dir_all(src.join("REFERENCE")).unwrap();
        fs::write(src.join("setup.xml"), "<x/>").unwrap();
        fs::write(src.join("code_saturne"), "#!/bin/sh").unwrap();

        let dest = dir.path().join("OUT");
        fs::create_dir(&dest).unwrap();
        let copied = copy_regular_files(&src, &dest, &["code_saturne"]).unwrap();
        assert_eq!(copied, 1);
        assert!(dest.join("setup.xml").is_file());
        assert!(!dest.join("REFERENCE").exists());
    }
}
