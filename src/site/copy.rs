//! Static asset copying.

use std::path::Path;

use anyhow::{Context, Result};

use super::data::CopyEntry;
use crate::common::{copy_dir_recursive, copy_file_with_dirs};

/// Copy every entry from `site_dir` into `dist_dir`. Returns files copied.
pub fn copy_assets(entries: &[CopyEntry], site_dir: &Path, dist_dir: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in entries {
        let src = site_dir.join(&entry.from);
        let dst = dist_dir.join(entry.destination());
        if src.is_dir() {
            copied += copy_dir_recursive(&src, &dst)?;
        } else {
            copy_file_with_dirs(&src, &dst)
                .with_context(|| format!("Failed to copy asset '{}'", entry.from))?;
            copied += 1;
        }
    }
    println!("Copied: assets ({copied} files)");
    Ok(copied)
}
