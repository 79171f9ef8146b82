//! Shared test utilities for restoir tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use restoir::config::Config;

pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}" dir="{{dir}}">
<head><title>{{heading}}</title><meta property="og:image" content="{{ogImage}}"></head>
<body>
    <nav class="lang-switcher">
      {{{langSwitcher}}}
    </nav>
    <h1>{{heading}}</h1>
    <img src="{{paganFlag}}"> <img src="{{realFlag}}">
    <script>const PLATFORMS = {{{platformsJson}}};</script>
</body>
</html>
"#;

pub const INSTRUCTIONS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}" dir="{{dir}}">
<body style="font-family: {{fontFamily}}">
  <h1>{{heading}}</h1>
  <h2>{{title}}</h2>
</body>
</html>
"#;

pub const DATA: &str = r#"{
  "languages": [
    {"code": "en", "file": "index.html", "label": "English"},
    {"code": "fa", "file": "fa.html", "label": "فارسی"},
    {"code": "ar", "file": "ar.html", "label": "العربية"}
  ],
  "platforms": {
    "chrome": {"icon": "chrome.svg", "storeUrl": "https://chromewebstore.google.com/detail/restoir"},
    "firefox": {"icon": "firefox.svg", "storeUrl": "https://addons.mozilla.org/addon/restoir"},
    "safari": {"icon": "safari.svg", "storeUrl": "https://apps.apple.com/app/restoir"}
  },
  "assets": {
    "realFlag": "chrome-extension/flag.svg",
    "paganFlag": "wrong-flag-small.jpg",
    "tweetUrl": "https://x.com/intent/tweet",
    "githubUrl": "https://github.com/restoir/restoir",
    "siteUrl": "https://restoir.yusef.ren",
    "ogImage": "https://restoir.yusef.ren/og-image.svg"
  },
  "i18n": {
    "en": {
      "lang": "en", "dir": "ltr", "fontFamily": "Inter, sans-serif",
      "heading": "Restore Iran Flag",
      "platforms": {
        "chrome": {"name": "Chrome", "description": "Extension", "storeName": "Chrome Web Store"},
        "firefox": {"name": "Firefox", "description": "Add-on", "storeName": "Firefox Add-ons"},
        "safari": {"name": "Safari", "description": "Userscript", "storeName": "App Store"}
      },
      "og": {
        "title": "Restore Iran Flag", "subtitle": "Browser extension for Twitter/X",
        "wrongFlag": "Wrong Flag", "officialFlag": "Official Flag",
        "tagline": "Flags Belong to Nations, Not Platforms",
        "platforms": "Available for Chrome • Firefox • Edge • Safari • Android"
      }
    },
    "fa": {
      "lang": "fa", "dir": "rtl", "fontFamily": "Vazirmatn, sans-serif",
      "heading": "بازگردانی پرچم ایران",
      "platforms": {
        "chrome": {"name": "کروم", "description": "افزونه", "storeName": "فروشگاه کروم"},
        "firefox": {"name": "فایرفاکس", "description": "افزونه", "storeName": "افزونه‌های فایرفاکس"},
        "safari": {"name": "سافاری", "description": "یوزراسکریپت", "storeName": "راهنما"}
      },
      "safariInstructions": {"file": "safari-fa.html", "title": "راهنمای نصب در سافاری"}
    },
    "ar": {
      "lang": "ar", "dir": "rtl", "fontFamily": "Noto Sans Arabic, sans-serif",
      "heading": "استعادة علم إيران",
      "platforms": {
        "chrome": {"name": "كروم", "description": "إضافة", "storeName": "متجر كروم"},
        "firefox": {"name": "فايرفوكس", "description": "إضافة", "storeName": "إضافات فايرفوكس"},
        "safari": {"name": "سفاري", "description": "سكربت", "storeName": "متجر التطبيقات"}
      }
    }
  }
}"#;

pub const CHROME_MANIFEST: &str = r#"{
  "manifest_version": 3,
  "name": "Restore Iran Flag",
  "content_scripts": [{
    "matches": ["https://twitter.com/*", "https://x.com/*", "https://mobile.twitter.com/*"],
    "js": ["content.js"],
    "run_at": "document_start"
  }],
  "web_accessible_resources": [{
    "resources": ["flag.svg", "flag.png"],
    "matches": ["https://twitter.com/*", "https://x.com/*", "https://mobile.twitter.com/*"]
  }]
}"#;

pub const FIREFOX_MANIFEST: &str = r#"{
  "manifest_version": 2,
  "name": "Restore Iran Flag",
  "content_scripts": [{
    "matches": ["https://twitter.com/*", "https://x.com/*", "https://mobile.twitter.com/*"],
    "js": ["content.js"],
    "run_at": "document_start"
  }],
  "web_accessible_resources": ["flag.svg", "flag.png"]
}"#;

pub const USERSCRIPT: &str = "// ==UserScript==
// @name         Restore Iran Flag on Twitter
// @match        https://twitter.com/*
// @match        https://x.com/*
// @match        https://mobile.twitter.com/*
// @grant        none
// @run-at       document-start
// ==/UserScript==
";

/// A complete site source tree in a temporary directory.
pub struct TestSite {
    /// Temporary directory (kept alive for lifetime of TestSite)
    pub _temp_dir: TempDir,
    /// Site source directory
    pub site_dir: PathBuf,
    /// Output directory
    pub dist_dir: PathBuf,
}

impl TestSite {
    /// Create a site with data, templates, assets and both extension sources.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let site_dir = temp_dir.path().join("site");
        let dist_dir = site_dir.join("dist");

        write(&site_dir.join("data.json"), DATA);
        write(&site_dir.join("template.html"), PAGE_TEMPLATE);
        write(&site_dir.join("safari-instructions-template.html"), INSTRUCTIONS_TEMPLATE);

        write(&site_dir.join("chrome-extension/manifest.json"), CHROME_MANIFEST);
        write(&site_dir.join("chrome-extension/content.js"), "// content script\n");
        fs::write(site_dir.join("chrome-extension/flag.svg"), restoir::patcher::assets::FLAG_SVG)
            .expect("Failed to write flag.svg");
        fs::write(site_dir.join("chrome-extension/flag.png"), restoir::patcher::assets::FLAG_PNG)
            .expect("Failed to write flag.png");
        fs::write(site_dir.join("chrome-extension/icon128.png"), restoir::patcher::assets::FLAG_PNG)
            .expect("Failed to write icon128.png");

        write(&site_dir.join("firefox-addon/manifest.json"), FIREFOX_MANIFEST);
        write(&site_dir.join("firefox-addon/content.js"), "// content script\n");

        write(&site_dir.join("userscript/restore-iran-flag.user.js"), USERSCRIPT);
        write(&site_dir.join("og-image.svg"), "<svg/>");
        write(&site_dir.join("googlef1e2c57d719af19b.html"), "google-site-verification: googlef1e2c57d719af19b.html");
        write(&site_dir.join("privacy-policy.html"), "<h1>Privacy</h1>");
        fs::write(site_dir.join("wrong-flag-small.jpg"), [0xff, 0xd8, 0xff, 0xe0]).expect("Failed to write jpg");

        Self {
            _temp_dir: temp_dir,
            site_dir,
            dist_dir,
        }
    }

    /// Configuration rooted at the site directory, independent of the process env.
    pub fn config(&self) -> Config {
        Config {
            site_dir: self.site_dir.clone(),
            data_file: self.site_dir.join("data.json"),
            template: self.site_dir.join("template.html"),
            safari_template: self.site_dir.join("safari-instructions-template.html"),
            dist_dir: self.dist_dir.clone(),
            extension_base: "chrome-extension://restoir/".to_string(),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.site_dir.join(rel)
    }

    pub fn dist(&self, rel: &str) -> PathBuf {
        self.dist_dir.join(rel)
    }
}

/// Write a file, creating parent directories.
pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file at {}", path.display());
}

/// Assert that a file contains the expected text.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "Expected {} to contain {:?}",
        path.display(),
        expected
    );
}
