//! Site input checks (data file, templates, copied and archived sources,
//! injection declarations).

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::Config;
use crate::patcher::injection;
use crate::site::og::{OFFICIAL_FLAG_IMAGE, WRONG_FLAG_IMAGE};
use crate::site::SiteData;

use super::types::{Category, CheckResult};

const MANIFEST: &str = "manifest.json";
const USERSCRIPT_SUFFIX: &str = ".user.js";

fn check_file(name: &str, path: &Path) -> CheckResult {
    if path.is_file() {
        Category::Templates.pass(name)
    } else {
        Category::Templates.fail(name, format!("Missing {}", path.display()))
    }
}

/// Parse the data file. Returns the parsed data when it is usable.
pub fn check_data_file(config: &Config) -> (CheckResult, Option<SiteData>) {
    let name = "data file";
    if !config.data_file.is_file() {
        return (
            Category::Data.fail(name, format!("Missing {}", config.data_file.display())),
            None,
        );
    }
    match SiteData::load(&config.data_file) {
        Ok(data) => {
            let details = format!(
                "{} languages, {} platforms",
                data.languages.len(),
                data.platforms.len()
            );
            (Category::Data.pass(name).noting(details), Some(data))
        }
        Err(e) => (Category::Data.fail(name, format!("{:#}", e)), None),
    }
}

/// Every language needs an i18n record with a translation for every platform.
pub fn check_translations(data: &SiteData) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for language in &data.languages {
        let name = format!("i18n.{}", language.code);
        let Some(t) = data.i18n.get(&language.code) else {
            results.push(Category::Translations.fail(name, "No i18n record"));
            continue;
        };
        let missing: Vec<_> = data
            .platforms
            .iter()
            .map(|(key, _)| key.as_str())
            .filter(|key| !t.platforms.contains_key(*key))
            .collect();
        if missing.is_empty() {
            results.push(Category::Translations.pass(name));
        } else {
            results.push(Category::Translations.fail(
                name,
                format!("Missing platform translations: {}", missing.join(", ")),
            ));
        }
    }
    results
}

pub fn check_templates(config: &Config, data: &SiteData) -> Vec<CheckResult> {
    let mut results = vec![check_file("page template", &config.template)];
    if data.i18n.values().any(|t| t.instructions.is_some()) {
        results.push(check_file("instructions template", &config.safari_template));
    }
    results
}

pub fn check_sources(config: &Config, data: &SiteData) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for entry in &data.build.copy {
        let src = config.site_dir.join(&entry.from);
        let name = format!("asset {}", entry.from);
        if src.exists() {
            results.push(Category::Sources.pass(name));
        } else {
            results.push(Category::Sources.fail(name, format!("Missing {}", src.display())));
        }
    }
    for entry in &data.build.archives {
        let src = config.site_dir.join(&entry.source);
        let name = format!("archive source {}/", entry.source);
        if src.is_dir() {
            results.push(Category::Sources.pass(name));
        } else {
            results.push(Category::Sources.fail(name, format!("Missing directory {}", src.display())));
        }
    }
    results
}

fn injection_result(name: String, violations: Vec<String>) -> CheckResult {
    if violations.is_empty() {
        Category::Injection.pass(name)
    } else {
        Category::Injection.fail(name, violations.join("; "))
    }
}

fn check_manifest(path: &Path, name: String) -> CheckResult {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return Category::Injection.fail(name, format!("Cannot read: {}", e)),
    };
    match serde_json::from_str(&content) {
        Ok(manifest) => injection_result(name, injection::manifest_violations(&manifest)),
        Err(e) => Category::Injection.fail(name, format!("Invalid JSON: {}", e)),
    }
}

/// Every packed extension must declare the content script's match patterns
/// and document-start timing; every shipped userscript must declare the same
/// in its metadata block.
pub fn check_injection(config: &Config, data: &SiteData) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for entry in &data.build.archives {
        let src = config.site_dir.join(&entry.source);
        if src.is_dir() {
            let name = format!("{}/{}", entry.source.trim_end_matches('/'), MANIFEST);
            results.push(check_manifest(&src.join(MANIFEST), name));
        }
    }

    for entry in &data.build.copy {
        let src = config.site_dir.join(&entry.from);
        for file in WalkDir::new(&src).sort_by_file_name().into_iter().flatten() {
            let is_userscript = file.file_type().is_file()
                && file.file_name().to_string_lossy().ends_with(USERSCRIPT_SUFFIX);
            if !is_userscript {
                continue;
            }
            let name = file
                .path()
                .strip_prefix(&config.site_dir)
                .unwrap_or(file.path())
                .display()
                .to_string();
            let result = match fs::read_to_string(file.path()) {
                Ok(source) => injection_result(name, injection::userscript_violations(&source)),
                Err(e) => Category::Injection.fail(name, format!("Cannot read: {}", e)),
            };
            results.push(result);
        }
    }
    results
}

/// Open Graph art is only needed by `build og`, so missing art is a warning.
pub fn check_og_art(config: &Config, data: &SiteData) -> Vec<CheckResult> {
    if !data.i18n.values().any(|t| t.og.is_some()) {
        return Vec::new();
    }
    [WRONG_FLAG_IMAGE, OFFICIAL_FLAG_IMAGE]
        .iter()
        .map(|file| {
            let path = config.site_dir.join(file);
            let name = format!("og art {}", file);
            if path.is_file() {
                Category::OgArt.pass(name)
            } else {
                Category::OgArt.warn(name, "Missing (needed by 'restoir build og')")
            }
        })
        .collect()
}
