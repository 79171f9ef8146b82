//! Utilities for copying files and directory trees.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(())
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file_with_dirs(src: &Path, dst: &Path) -> Result<u64> {
    if !src.is_file() {
        bail!("Source file not found: {}", src.display());
    }
    if let Some(parent) = dst.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))
}

/// Copy a directory tree verbatim. Returns the number of files copied.
///
/// Existing files at the destination are overwritten; extra files are left alone.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        bail!("Source directory not found: {}", src.display());
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            ensure_dir_exists(&target)?;
        } else if entry.file_type().is_file() {
            copy_file_with_dirs(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
