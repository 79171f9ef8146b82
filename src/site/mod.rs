//! Static site builder.
//!
//! One-shot pipeline: render a page per language (plus instruction
//! sub-pages), copy static assets, and pack the extension sources. Every
//! step works on disjoint files; any failure aborts the build.

pub mod archive;
pub mod copy;
pub mod data;
pub mod og;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::cache;
use crate::config::Config;
use crate::timing::Timer;

pub use archive::{ArchiveJob, ArchiveReport};
pub use data::SiteData;
pub use render::Templates;

/// Hash artifact name for the rendered pages.
const PAGES_ARTIFACT: &str = "pages";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Pages,
    Assets,
    Archives,
}

impl BuildStep {
    pub const ALL: [BuildStep; 3] = [BuildStep::Pages, BuildStep::Assets, BuildStep::Archives];
}

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub assets_copied: usize,
    pub archives: Vec<ArchiveReport>,
    /// Artifacts skipped because their inputs were unchanged.
    pub skipped: Vec<String>,
}

pub struct SiteBuilder<'a> {
    config: &'a Config,
    data: SiteData,
    force: bool,
}

impl<'a> SiteBuilder<'a> {
    /// Load the data file named by the configuration.
    pub fn load(config: &'a Config, force: bool) -> Result<Self> {
        let data = SiteData::load(&config.data_file)?;
        Ok(Self::with_data(config, data, force))
    }

    fn with_data(config: &'a Config, data: SiteData, force: bool) -> Self {
        Self {
            config,
            data,
            force,
        }
    }

    fn dist(&self) -> &Path {
        &self.config.dist_dir
    }

    /// Every page the pages step writes.
    pub fn page_outputs(&self) -> Vec<PathBuf> {
        let mut outputs = Vec::new();
        for language in &self.data.languages {
            outputs.push(self.dist().join(&language.file));
            if let Some(instructions) = self
                .data
                .i18n
                .get(&language.code)
                .and_then(|t| t.instructions.as_ref())
            {
                outputs.push(self.dist().join(&instructions.file));
            }
        }
        outputs
    }

    fn pages_hash(&self) -> Option<String> {
        let mut inputs: Vec<&Path> = vec![&self.config.data_file, &self.config.template];
        if self.config.safari_template.is_file() {
            inputs.push(&self.config.safari_template);
        }
        cache::hash_files(&inputs)
    }

    pub fn pages_need_rebuild(&self) -> bool {
        if self.force {
            return true;
        }
        let Some(hash) = self.pages_hash() else {
            return true;
        };
        let hash_file = cache::hash_file_for(self.dist(), PAGES_ARTIFACT);
        self.page_outputs()
            .iter()
            .any(|out| cache::needs_rebuild(&hash, &hash_file, out))
    }

    fn archive_jobs(&self) -> Vec<(String, ArchiveJob)> {
        self.data
            .build
            .archives
            .iter()
            .map(|entry| {
                (
                    entry.artifact_name(),
                    ArchiveJob {
                        source: self.config.site_dir.join(&entry.source),
                        output: self.dist().join(entry.output_name()),
                    },
                )
            })
            .collect()
    }

    fn archive_needs_rebuild(&self, artifact: &str, job: &ArchiveJob) -> bool {
        if self.force {
            return true;
        }
        match cache::hash_dir(&job.source) {
            Some(hash) => cache::needs_rebuild(&hash, &cache::hash_file_for(self.dist(), artifact), &job.output),
            None => true,
        }
    }

    pub fn build_pages(&self, report: &mut BuildReport) -> Result<()> {
        if !self.pages_need_rebuild() {
            println!("[SKIP] Pages unchanged");
            report.skipped.push(PAGES_ARTIFACT.to_string());
            return Ok(());
        }
        let t = Timer::start("Pages");
        let templates = Templates::load(&self.config.template, &self.config.safari_template, &self.data)?;
        report.pages = render::render_all(&self.data, &templates, self.dist())?;
        if let Some(hash) = self.pages_hash() {
            cache::write_cached_hash(&cache::hash_file_for(self.dist(), PAGES_ARTIFACT), &hash)?;
        }
        t.finish();
        Ok(())
    }

    pub fn copy_assets(&self, report: &mut BuildReport) -> Result<()> {
        let t = Timer::start("Assets");
        report.assets_copied = copy::copy_assets(&self.data.build.copy, &self.config.site_dir, self.dist())?;
        t.finish();
        Ok(())
    }

    pub fn build_archives(&self, report: &mut BuildReport) -> Result<()> {
        let t = Timer::start("Archives");
        let mut pending = Vec::new();
        for (artifact, job) in self.archive_jobs() {
            if self.archive_needs_rebuild(&artifact, &job) {
                pending.push((artifact, job));
            } else {
                println!("[SKIP] {} unchanged", render::display_path(self.dist(), &job.output));
                report.skipped.push(artifact);
            }
        }

        let jobs = pending.iter().map(|(_, job)| job.clone()).collect();
        let reports = archive::create_all(jobs)?;
        for ((artifact, job), built) in pending.iter().zip(&reports) {
            println!(
                "Built: {} ({} bytes)",
                render::display_path(self.dist(), &built.output),
                built.bytes
            );
            if let Some(hash) = cache::hash_dir(&job.source) {
                cache::write_cached_hash(&cache::hash_file_for(self.dist(), artifact), &hash)?;
            }
        }
        report.archives.extend(reports);
        t.finish();
        Ok(())
    }

    /// Generate Open Graph cards into the site directory.
    pub fn generate_og(&self) -> Result<Vec<PathBuf>> {
        let t = Timer::start("Open Graph images");
        let written = og::generate_all(&self.data, &self.config.site_dir)?;
        t.finish();
        Ok(written)
    }

    /// Run the given steps in order.
    pub fn build(&self, steps: &[BuildStep]) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for step in steps {
            match step {
                BuildStep::Pages => self.build_pages(&mut report)?,
                BuildStep::Assets => self.copy_assets(&mut report)?,
                BuildStep::Archives => self.build_archives(&mut report)?,
            }
        }
        info!(
            pages = report.pages.len(),
            assets = report.assets_copied,
            archives = report.archives.len(),
            skipped = report.skipped.len(),
            "build finished"
        );
        Ok(report)
    }

    /// Artifacts and whether each needs rebuilding.
    pub fn status(&self) -> Vec<(String, bool)> {
        let mut status = vec![(PAGES_ARTIFACT.to_string(), self.pages_need_rebuild())];
        for (artifact, job) in self.archive_jobs() {
            let needs = self.archive_needs_rebuild(&artifact, &job);
            status.push((artifact, needs));
        }
        status
    }
}
