//! Build caching - hash-based rebuild detection.
//!
//! Uses SHA256 hashes to detect actual content changes, not just mtimes.
//! Each artifact keeps the hash of its inputs in a hidden `.hash` file
//! inside the output directory.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Compute SHA256 hash of multiple files concatenated.
/// Returns None if any file doesn't exist or can't be read.
pub fn hash_files(paths: &[&Path]) -> Option<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        if !path.is_file() {
            return None;
        }
        match fs::read(path) {
            Ok(content) => hasher.update(&content),
            Err(e) => {
                warn!(path = %path.display(), "failed to read for hashing: {e} (cache will be invalidated)");
                return None;
            }
        }
    }
    Some(format!("{:x}", hasher.finalize()))
}

/// Compute SHA256 hash over every file under `dir`, including relative names.
///
/// Entries are visited in sorted order so the hash is stable across runs.
pub fn hash_dir(dir: &Path) -> Option<String> {
    if !dir.is_dir() {
        return None;
    }
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), "failed to walk for hashing: {e}");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        hasher.update(rel.to_string_lossy().as_bytes());
        match fs::read(entry.path()) {
            Ok(content) => hasher.update(&content),
            Err(e) => {
                warn!(path = %entry.path().display(), "failed to read for hashing: {e}");
                return None;
            }
        }
    }
    Some(format!("{:x}", hasher.finalize()))
}

/// Location of the hash file for a named artifact.
pub fn hash_file_for(dist_dir: &Path, artifact: &str) -> PathBuf {
    dist_dir.join(format!(".{artifact}-inputs.hash"))
}

/// Read cached hash from a .hash file.
pub fn read_cached_hash(hash_file: &Path) -> Option<String> {
    if !hash_file.exists() {
        return None;
    }
    match fs::read_to_string(hash_file) {
        Ok(s) => Some(s.trim().to_string()),
        Err(e) => {
            warn!(path = %hash_file.display(), "failed to read cache hash file: {e} (will rebuild)");
            None
        }
    }
}

/// Write hash to a .hash file.
pub fn write_cached_hash(hash_file: &Path, hash: &str) -> Result<()> {
    if let Some(parent) = hash_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(hash_file, hash)?;
    Ok(())
}

/// Check if target needs rebuild based on source hash.
///
/// Returns true if the target doesn't exist, no hash is recorded yet,
/// or the recorded hash differs.
pub fn needs_rebuild(source_hash: &str, hash_file: &Path, target: &Path) -> bool {
    if !target.exists() {
        return true;
    }
    match read_cached_hash(hash_file) {
        Some(cached) => cached != source_hash,
        None => true,
    }
}
