//! Page rendering.
//!
//! Each language page is the main template rendered over that language's
//! i18n record plus a few computed keys (language switcher, shared asset
//! locators, platform JSON). Languages with instructions also get a sub-page
//! rendered from the instructions template.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::data::{SiteData, Translation, INSTRUCTIONS_PLATFORM};
use crate::common::write_file_with_dirs;

/// Separator between language switcher links.
const SWITCHER_SEPARATOR: &str = "\n      ";

static SECTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*[#^]\s*([^\s}]+)\s*\}\}").expect("valid section tag regex"));

/// A compiled template and the keys it opens as sections.
struct Page {
    template: mustache::Template,
    sections: HashSet<String>,
}

impl Page {
    fn compile(source: &str) -> Result<Self, mustache::Error> {
        let sections = SECTION_TAG
            .captures_iter(source)
            .flat_map(|c| c[1].split('.').map(str::to_string).collect::<Vec<_>>())
            .collect();
        Ok(Self {
            template: mustache::compile_str(source)?,
            sections,
        })
    }

    fn render(&self, view: &Value) -> Result<String> {
        let view = normalize(view, &self.sections, false);
        let mut out = Vec::new();
        self.template.render(&mut out, &view).map_err(|e| anyhow!("{e}"))?;
        Ok(String::from_utf8(out)?)
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Rewrite a view so sections and interpolation follow the usual Mustache
/// truthiness: `""`, `0`, `false` and `null` skip a section and open its
/// inverse; booleans interpolate as `true`/`false`.
fn normalize(value: &Value, sections: &HashSet<String>, section: bool) -> Value {
    match value {
        v if section && is_falsy(v) => Value::Null,
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(|v| normalize(v, sections, false)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v, sections, sections.contains(k))))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Compiled page templates.
pub struct Templates {
    page: Page,
    instructions: Option<Page>,
}

fn compile(path: &Path) -> Result<Page> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    Page::compile(&source).map_err(|e| anyhow!("Failed to compile template {}: {e}", path.display()))
}

impl Templates {
    /// Load templates. The instructions template is only required when
    /// some language defines an instructions page.
    pub fn load(page: &Path, instructions: &Path, data: &SiteData) -> Result<Self> {
        let needs_instructions = data.i18n.values().any(|t| t.instructions.is_some());
        Ok(Self {
            page: compile(page)?,
            instructions: if needs_instructions {
                Some(compile(instructions)?)
            } else {
                None
            },
        })
    }

    pub fn from_strings(page: &str, instructions: Option<&str>) -> Result<Self> {
        Ok(Self {
            page: Page::compile(page).map_err(|e| anyhow!("Failed to compile page template: {e}"))?,
            instructions: instructions
                .map(Page::compile)
                .transpose()
                .map_err(|e| anyhow!("Failed to compile instructions template: {e}"))?,
        })
    }
}

/// Navigation links, the current language marked active.
pub fn lang_switcher(data: &SiteData, current: &str) -> String {
    data.languages
        .iter()
        .map(|l| {
            let active = if l.code == current { r#" class="active""# } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, l.file, active, l.label)
        })
        .collect::<Vec<_>>()
        .join(SWITCHER_SEPARATOR)
}

/// Store link for the instructions platform: the local page when the
/// language has one, otherwise the store.
pub fn instructions_url(data: &SiteData, t: &Translation) -> String {
    match &t.instructions {
        Some(instructions) => format!("/{}", instructions.file),
        None => data
            .platform(INSTRUCTIONS_PLATFORM)
            .map(|p| p.store_url.clone())
            .unwrap_or_default(),
    }
}

/// Pretty-printed platform table for client-side scripts.
pub fn platforms_json(data: &SiteData, code: &str) -> Result<String> {
    let t = data.translation(code)?;
    let mut platforms = Map::new();
    for (key, platform) in &data.platforms {
        let text = t
            .platforms
            .get(key)
            .with_context(|| format!("Missing i18n.{code}.platforms.{key}"))?;
        let store_url = if key == INSTRUCTIONS_PLATFORM {
            instructions_url(data, t)
        } else {
            platform.store_url.clone()
        };
        platforms.insert(
            key.clone(),
            json!({
                "name": text.name,
                "icon": platform.icon,
                "description": text.description,
                "storeUrl": store_url,
                "storeName": text.store_name,
            }),
        );
    }
    Ok(serde_json::to_string_pretty(&Value::Object(platforms))?)
}

/// Template view for a language page.
pub fn page_view(data: &SiteData, code: &str) -> Result<Value> {
    let t = data.translation(code)?;
    let mut view = t.record.clone();
    let assets = &data.assets;
    let computed = [
        ("langSwitcher", lang_switcher(data, code)),
        ("realFlag", assets.real_flag.clone()),
        ("paganFlag", assets.pagan_flag.clone()),
        ("tweetUrl", assets.tweet_url.clone()),
        ("githubUrl", assets.github_url.clone()),
        ("siteUrl", assets.site_url.clone()),
        ("ogImage", assets.og_image.clone()),
        ("platformsJson", platforms_json(data, code)?),
    ];
    for (key, value) in computed {
        view.insert(key.to_string(), Value::String(value));
    }
    Ok(Value::Object(view))
}

/// Template view for an instructions page, if the language has one.
pub fn instructions_view(t: &Translation) -> Option<Value> {
    let instructions = t.instructions.as_ref()?;
    let mut view = instructions.record.clone();
    for key in ["lang", "dir", "fontFamily", "heading"] {
        view.insert(
            key.to_string(),
            t.record.get(key).cloned().unwrap_or(Value::Null),
        );
    }
    Some(Value::Object(view))
}

impl Templates {
    pub fn render_page(&self, data: &SiteData, code: &str) -> Result<String> {
        let view = page_view(data, code)?;
        self.page.render(&view).with_context(|| format!("Failed to render page for '{code}'"))
    }

    pub fn render_instructions(&self, t: &Translation) -> Result<Option<String>> {
        let Some(view) = instructions_view(t) else {
            return Ok(None);
        };
        let template = self
            .instructions
            .as_ref()
            .context("Instructions template not loaded")?;
        template
            .render(&view)
            .map(Some)
            .context("Failed to render instructions page")
    }
}

/// Render every language page (and instruction sub-pages) into `dist_dir`.
pub fn render_all(data: &SiteData, templates: &Templates, dist_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for language in &data.languages {
        let t = data.translation(&language.code)?;

        let html = templates.render_page(data, &language.code)?;
        let out = dist_dir.join(&language.file);
        write_file_with_dirs(&out, html)?;
        println!("Built: {}", display_path(dist_dir, &out));
        written.push(out);

        if let Some(html) = templates.render_instructions(t)? {
            let file = t.instructions.as_ref().map(|i| i.file.as_str()).unwrap_or_default();
            let out = dist_dir.join(file);
            write_file_with_dirs(&out, html)?;
            println!("Built: {}", display_path(dist_dir, &out));
            written.push(out);
        }
        debug!(language = %language.code, "rendered language");
    }
    Ok(written)
}

/// `dist/<file>` style path for progress lines.
pub(crate) fn display_path(dist_dir: &Path, path: &Path) -> String {
    let dist_name = dist_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dist_dir.display().to_string());
    match path.strip_prefix(dist_dir) {
        Ok(rel) => format!("{}/{}", dist_name, rel.display()),
        Err(_) => path.display().to_string(),
    }
}
