//! Site data file model.
//!
//! `data.json` drives the whole site: the language list, platform metadata,
//! shared asset locators and one free-form i18n record per language. The
//! i18n record is kept verbatim because every field in it is available to
//! the page template; the handful of fields the builder itself needs are
//! also parsed into typed form.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Platform whose store link may be replaced by a local instructions page.
pub const INSTRUCTIONS_PLATFORM: &str = "safari";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub file: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub store_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assets {
    pub real_flag: String,
    pub pagan_flag: String,
    pub tweet_url: String,
    pub github_url: String,
    pub site_url: String,
    pub og_image: String,
}

/// Localized platform strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformText {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub store_name: String,
}

/// Localized strings for the Open Graph card.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgText {
    pub title: String,
    pub subtitle: String,
    pub wrong_flag: String,
    pub official_flag: String,
    pub tagline: String,
    pub platforms: String,
}

/// Platform-specific instruction sub-page.
#[derive(Debug, Clone)]
pub struct Instructions {
    /// Output file name, relative to the output directory.
    pub file: String,
    /// The full record, exposed to the instructions template.
    pub record: Map<String, Value>,
}

/// One language's i18n record.
#[derive(Debug, Clone)]
pub struct Translation {
    pub record: Map<String, Value>,
    pub platforms: HashMap<String, PlatformText>,
    pub instructions: Option<Instructions>,
    pub og: Option<OgText>,
}

impl Translation {
    fn from_record(code: &str, value: Value) -> Result<Self> {
        let Value::Object(record) = value else {
            bail!("i18n.{code} must be an object");
        };

        let platforms = match record.get("platforms") {
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("Invalid i18n.{code}.platforms"))?,
            None => HashMap::new(),
        };

        let instructions = match record.get("safariInstructions") {
            Some(Value::Object(map)) => {
                let file = map
                    .get("file")
                    .and_then(Value::as_str)
                    .with_context(|| format!("i18n.{code}.safariInstructions.file is required"))?
                    .to_string();
                Some(Instructions {
                    file,
                    record: map.clone(),
                })
            }
            Some(Value::Null) | None => None,
            Some(_) => bail!("i18n.{code}.safariInstructions must be an object"),
        };

        let og = match record.get("og") {
            Some(value) => Some(
                serde_json::from_value(value.clone())
                    .with_context(|| format!("Invalid i18n.{code}.og"))?,
            ),
            None => None,
        };

        Ok(Self {
            record,
            platforms,
            instructions,
            og,
        })
    }

    /// String field of the record, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.record.get(key).and_then(Value::as_str)
    }

    pub fn is_rtl(&self) -> bool {
        self.field("dir") == Some("rtl")
    }
}

/// A file or directory copied verbatim into the output directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CopyEntry {
    pub from: String,
    /// Destination relative to the output directory (default: same as `from`).
    #[serde(default)]
    pub to: Option<String>,
}

impl CopyEntry {
    fn same(path: &str) -> Self {
        Self {
            from: path.to_string(),
            to: None,
        }
    }

    pub fn destination(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.from)
    }
}

/// A source directory packed into a ZIP archive.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: String,
    /// Archive path relative to the output directory (default: `<source>.zip`).
    #[serde(default)]
    pub output: Option<String>,
}

impl ArchiveEntry {
    fn of(source: &str) -> Self {
        Self {
            source: source.to_string(),
            output: None,
        }
    }

    pub fn output_name(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.zip", self.source.trim_end_matches('/')))
    }

    /// Artifact name used for the rebuild hash.
    pub fn artifact_name(&self) -> String {
        self.output_name().trim_end_matches(".zip").replace('/', "-")
    }
}

/// Static files and archives produced next to the rendered pages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildPlan {
    pub copy: Vec<CopyEntry>,
    pub archives: Vec<ArchiveEntry>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            copy: [
                "chrome-extension/flag.svg",
                "chrome-extension/icon128.png",
                "userscript",
                "og-image.svg",
                "googlef1e2c57d719af19b.html",
                "privacy-policy.html",
            ]
            .into_iter()
            .map(CopyEntry::same)
            .collect(),
            archives: vec![
                ArchiveEntry::of("chrome-extension"),
                ArchiveEntry::of("firefox-addon"),
            ],
        }
    }
}

fn ordered<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|v| (key.clone(), v))
                .map_err(|e| serde::de::Error::custom(format!("{key}: {e}")))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawSiteData {
    languages: Vec<Language>,
    #[serde(deserialize_with = "ordered")]
    platforms: Vec<(String, Platform)>,
    #[serde(default)]
    assets: Assets,
    i18n: Map<String, Value>,
    #[serde(default)]
    build: BuildPlan,
}

/// Parsed `data.json`.
#[derive(Debug, Clone)]
pub struct SiteData {
    pub languages: Vec<Language>,
    /// Platforms in data file order.
    pub platforms: Vec<(String, Platform)>,
    pub assets: Assets,
    pub i18n: HashMap<String, Translation>,
    pub build: BuildPlan,
}

impl SiteData {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid data file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawSiteData = serde_json::from_str(content)?;
        let i18n = raw
            .i18n
            .into_iter()
            .map(|(code, value)| Translation::from_record(&code, value).map(|t| (code, t)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            languages: raw.languages,
            platforms: raw.platforms,
            assets: raw.assets,
            i18n,
            build: raw.build,
        })
    }

    pub fn translation(&self, code: &str) -> Result<&Translation> {
        self.i18n
            .get(code)
            .with_context(|| format!("No i18n record for language '{code}'"))
    }

    pub fn platform(&self, key: &str) -> Option<&Platform> {
        self.platforms.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"{
        "languages": [
            {"code": "en", "file": "index.html", "label": "English"},
            {"code": "fa", "file": "fa.html", "label": "فارسی"}
        ],
        "platforms": {
            "chrome": {"icon": "chrome.svg", "storeUrl": "https://chrome.example/store"},
            "safari": {"icon": "safari.svg", "storeUrl": "https://apps.apple.example"},
            "android": {"icon": "android.svg", "storeUrl": "https://play.example"}
        },
        "assets": {"siteUrl": "https://restoir.yusef.ren"},
        "i18n": {
            "en": {"lang": "en", "dir": "ltr", "platforms": {"chrome": {"name": "Chrome"}}},
            "fa": {
                "lang": "fa", "dir": "rtl",
                "safariInstructions": {"file": "safari-fa.html", "title": "راهنما"}
            }
        }
    }"#;

    #[test]
    fn test_platform_order_follows_file() {
        let data = SiteData::from_json(DATA).unwrap();
        let keys: Vec<_> = data.platforms.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["chrome", "safari", "android"]);
        assert_eq!(data.platform("safari").unwrap().store_url, "https://apps.apple.example");
    }

    #[test]
    fn test_translation_fields() {
        let data = SiteData::from_json(DATA).unwrap();
        let en = data.translation("en").unwrap();
        assert!(!en.is_rtl());
        assert!(en.instructions.is_none());
        assert_eq!(en.platforms["chrome"].name, "Chrome");

        let fa = data.translation("fa").unwrap();
        assert!(fa.is_rtl());
        assert_eq!(fa.instructions.as_ref().unwrap().file, "safari-fa.html");
        assert!(data.translation("de").is_err());
    }

    #[test]
    fn test_default_build_plan() {
        let data = SiteData::from_json(DATA).unwrap();
        assert_eq!(data.build.copy.len(), 6);
        assert_eq!(data.build.copy[2].destination(), "userscript");
        let outputs: Vec<_> = data.build.archives.iter().map(ArchiveEntry::output_name).collect();
        assert_eq!(outputs, ["chrome-extension.zip", "firefox-addon.zip"]);
    }

    #[test]
    fn test_instructions_without_file_rejected() {
        let bad = DATA.replace(r#""file": "safari-fa.html", "#, "");
        let err = SiteData::from_json(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("safariInstructions.file"));
    }
}
