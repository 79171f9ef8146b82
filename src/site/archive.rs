//! Extension source archives.
//!
//! Each declared source directory is packed into a ZIP with entries relative
//! to the directory root (the layout browser stores expect). Archives are
//! independent files, so they are packed concurrently.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for all archives.
pub const COMPRESSION_LEVEL: i64 = 9;

/// A directory to pack and where to write it.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub output: PathBuf,
    pub entries: usize,
    pub bytes: u64,
}

fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Pack `source_dir` into `out_file`.
pub fn create_zip(source_dir: &Path, out_file: &Path) -> Result<ArchiveReport> {
    if !source_dir.is_dir() {
        bail!("Archive source directory not found: {}", source_dir.display());
    }
    if let Some(parent) = out_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = File::create(out_file)
        .with_context(|| format!("Failed to create {}", out_file.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut entries = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source_dir.display()))?;
        let name = entry_name(entry.path().strip_prefix(source_dir)?);
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path())
                .with_context(|| format!("Failed to open {}", entry.path().display()))?;
            io::copy(&mut input, &mut zip)
                .with_context(|| format!("Failed to compress {}", entry.path().display()))?;
            entries += 1;
        }
    }
    zip.finish()
        .with_context(|| format!("Failed to finalize {}", out_file.display()))?;

    let bytes = fs::metadata(out_file)?.len();
    debug!(output = %out_file.display(), entries, bytes, "archive written");
    Ok(ArchiveReport {
        output: out_file.to_path_buf(),
        entries,
        bytes,
    })
}

/// Pack every job, concurrently. Fails if any archive fails.
pub fn create_all(jobs: Vec<ArchiveJob>) -> Result<Vec<ArchiveReport>> {
    if jobs.is_empty() {
        return Ok(Vec::new());
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(jobs.len().min(4))
        .build()
        .context("Failed to start archive runtime")?;

    runtime.block_on(async move {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| tokio::task::spawn_blocking(move || create_zip(&job.source, &job.output)))
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            reports.push(handle.await.context("Archive task panicked")??);
        }
        Ok::<_, anyhow::Error>(reports)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn source(dir: &Path) -> PathBuf {
        let src = dir.join("chrome-extension");
        fs::create_dir_all(src.join("icons")).unwrap();
        fs::write(src.join("manifest.json"), r#"{"manifest_version": 3}"#).unwrap();
        fs::write(src.join("content.js"), "// content").unwrap();
        fs::write(src.join("icons/icon128.png"), [0x89, b'P', b'N', b'G']).unwrap();
        src
    }

    #[test]
    fn test_entries_relative_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path());
        let out = dir.path().join("dist/chrome-extension.zip");

        let report = create_zip(&src, &out).unwrap();
        assert_eq!(report.entries, 3);
        assert!(report.bytes > 0);

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, ["content.js", "icons/", "icons/icon128.png", "manifest.json"]);

        let mut manifest = String::new();
        archive
            .by_name("manifest.json")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        assert_eq!(manifest, r#"{"manifest_version": 3}"#);
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_zip(&dir.path().join("firefox-addon"), &dir.path().join("out.zip")).unwrap_err();
        assert!(err.to_string().contains("firefox-addon"));
    }

    #[test]
    fn test_create_all_packs_each_job() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path());
        let jobs = vec![
            ArchiveJob {
                source: src.clone(),
                output: dir.path().join("dist/a.zip"),
            },
            ArchiveJob {
                source: src,
                output: dir.path().join("dist/b.zip"),
            },
        ];
        let reports = create_all(jobs).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.output.exists() && r.bytes > 0));
    }
}
