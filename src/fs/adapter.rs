use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsErrorKind};

/// Result of a note store operation.
pub type FsResult<T> = std::result::Result<T, FsError>;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Check that `name` is a single, non-empty path component.
pub fn validate_name(name: &str) -> FsResult<()> {
    if name.trim().is_empty() {
        return Err(FsError::invalid_path("name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid_path(format!("'{}' is not a valid name", name)));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(FsError::invalid_path(format!(
            "'{}' must not contain path separators",
            name
        )));
    }
    Ok(())
}

/// List the immediate entries of a directory, in the order the OS returns them.
///
/// Symlinks are reported by their own type and never followed, so a link to a
/// directory is listed with `is_directory == false`.
pub fn list_directory(path: &Path) -> FsResult<Vec<DirEntry>> {
    let meta = fs::metadata(path).map_err(|e| FsError::io(e, path))?;
    if !meta.is_dir() {
        return Err(FsError::invalid_path(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| FsError::io(e, path))? {
        let entry = entry.map_err(|e| FsError::io(e, path))?;
        let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            is_directory,
        });
    }
    Ok(entries)
}

/// Read a whole note as UTF-8 text.
pub fn read_file(path: &Path) -> FsResult<String> {
    let meta = fs::metadata(path).map_err(|e| FsError::io(e, path))?;
    if meta.is_dir() {
        return Err(FsError::new(
            FsErrorKind::NotAFile,
            path.display().to_string(),
        ));
    }
    fs::read_to_string(path).map_err(|e| FsError::io(e, path))
}

/// Create or fully overwrite a file with `text`.
pub fn write_file(path: &Path, text: &str) -> FsResult<()> {
    if path.file_name().is_none() || path.is_dir() {
        return Err(FsError::invalid_path(format!(
            "{} cannot be written as a file",
            path.display()
        )));
    }
    fs::write(path, text).map_err(|e| match e.kind() {
        // The parent directory is missing.
        io::ErrorKind::NotFound => FsError::invalid_path(format!("{}: {}", path.display(), e)),
        _ => FsError::io(e, path),
    })
}

/// Create a new, empty file named `name` inside `parent`. Fails if it exists.
pub fn create_file(parent: &Path, name: &str) -> FsResult<PathBuf> {
    validate_name(name)?;
    let path = parent.join(name);
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| FsError::io(e, &path))?;
    Ok(path)
}

/// Delete a single file.
pub fn delete_file(path: &Path) -> FsResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| FsError::io(e, path))?;
    if meta.is_dir() {
        return Err(FsError::new(
            FsErrorKind::NotAFile,
            format!("{} is a directory", path.display()),
        ));
    }
    fs::remove_file(path).map_err(|e| FsError::io(e, path))
}

/// Rename a file or directory in place, keeping it in the same parent.
///
/// The destination is checked first: an occupied sibling fails with
/// `AlreadyExists` and nothing moves. Renaming to the current name is a no-op.
pub fn rename_file(old_path: &Path, new_name: &str) -> FsResult<PathBuf> {
    validate_name(new_name)?;
    fs::symlink_metadata(old_path).map_err(|e| FsError::io(e, old_path))?;

    let parent = old_path
        .parent()
        .ok_or_else(|| FsError::invalid_path(format!("{} has no parent", old_path.display())))?;
    let new_path = parent.join(new_name);

    if new_path == old_path {
        return Ok(new_path);
    }
    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(FsError::already_exists(&new_path));
    }

    fs::rename(old_path, &new_path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => FsError::new(
            FsErrorKind::ConflictUnchecked,
            format!("{} appeared during rename", new_path.display()),
        ),
        _ => FsError::io(e, old_path),
    })?;
    Ok(new_path)
}

/// Create a new directory named `name` inside `parent`.
pub fn create_directory(parent: &Path, name: &str) -> FsResult<PathBuf> {
    validate_name(name)?;
    let path = parent.join(name);
    fs::create_dir(&path).map_err(|e| FsError::io(e, &path))?;
    Ok(path)
}

/// Recursively and irreversibly delete a directory and everything below it.
pub fn delete_directory_recursive(path: &Path) -> FsResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| FsError::io(e, path))?;
    if !meta.is_dir() {
        return Err(FsError::invalid_path(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    fs::remove_dir_all(path).map_err(|e| FsError::io(e, path))
}

/// Resolve a name collision by appending `-1`, `-2`, etc. to the file stem.
///
/// Returns a path that does not exist yet in the destination directory.
pub fn resolve_collision(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }

    let parent = dest.parent().unwrap_or(Path::new("."));
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = dest.extension().map(|e| e.to_string_lossy().to_string());

    (1..)
        .map(|i| match &ext {
            Some(e) => parent.join(format!("{}-{}.{}", stem, i, e)),
            None => parent.join(format!("{}-{}", stem, i)),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dest.to_path_buf())
}
