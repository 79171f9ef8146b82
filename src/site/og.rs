//! Open Graph card generation.
//!
//! One 1280x640 SVG per language: the wrong flag crossed out, an arrow, and
//! the official flag with a checkmark. Right-to-left languages mirror the
//! layout and the arrow.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use super::data::{OgText, SiteData, Translation};
use crate::common::write_file_with_dirs;

/// Photo of the wrong flag, relative to the site directory.
pub const WRONG_FLAG_IMAGE: &str = "wrong-flag-small.jpg";
/// Official flag artwork, relative to the site directory.
pub const OFFICIAL_FLAG_IMAGE: &str = "chrome-extension/flag.svg";

const DEFAULT_FONT: &str = "Inter, sans-serif";
const RTL_MARK: &str = "\u{200F}";

static SVG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg[^>]*>").expect("valid svg tag regex"));

/// File name of the card for a language (`og-image.svg` for English).
pub fn og_file_name(code: &str) -> String {
    if code == "en" {
        "og-image.svg".to_string()
    } else {
        format!("og-image-{code}.svg")
    }
}

/// Flag artwork without its outer `<svg>` element.
pub fn official_flag_inner(svg: &str) -> String {
    SVG_OPEN.replace(svg, "").replacen("</svg>", "", 1).trim().to_string()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Shared inputs for every card.
pub struct CardArt {
    pub wrong_flag_jpeg: Vec<u8>,
    pub official_flag_svg: String,
    /// Host shown in the footer.
    pub site_host: String,
}

impl CardArt {
    pub fn load(site_dir: &Path, site_url: &str) -> Result<Self> {
        let wrong = site_dir.join(WRONG_FLAG_IMAGE);
        let official = site_dir.join(OFFICIAL_FLAG_IMAGE);
        Ok(Self {
            wrong_flag_jpeg: fs::read(&wrong)
                .with_context(|| format!("Failed to read {}", wrong.display()))?,
            official_flag_svg: fs::read_to_string(&official)
                .with_context(|| format!("Failed to read {}", official.display()))?,
            site_host: site_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Render the card for one language.
pub fn generate_svg(text: &OgText, rtl: bool, font_family: &str, art: &CardArt) -> String {
    let (left_x, right_x) = if rtl { (750, 100) } else { (100, 750) };
    let (left_label_x, right_label_x) = if rtl { (940, 290) } else { (290, 940) };
    let arrow = if rtl { "←" } else { "→" };
    let check_x = if rtl { 330 } else { 1080 };
    let dir = if rtl { r#" direction="rtl""# } else { "" };
    let mark = if rtl { RTL_MARK } else { "" };

    let font = escape(font_family);
    let wrong_b64 = STANDARD.encode(&art.wrong_flag_jpeg);
    let official = official_flag_inner(&art.official_flag_svg);
    let label = |s: &str| format!("{mark}{}", escape(s));

    format!(
        r##"<svg width="1280" height="640" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <style>
      @import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700;800&amp;family=Vazirmatn:wght@400;500;600;700;800&amp;family=Noto+Sans+Arabic:wght@400;500;600;700;800&amp;display=swap');
    </style>
    <linearGradient id="bgGradient" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#0f0f1a;stop-opacity:1" />
      <stop offset="50%" style="stop-color:#1a1a2e;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#16213e;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="1280" height="640" fill="url(#bgGradient)"/>

  <text x="640" y="80" font-family="{font}" font-size="56" font-weight="700" fill="#fff" text-anchor="middle"{dir}>{title}</text>
  <text x="640" y="120" font-family="{font}" font-size="24" fill="#888" text-anchor="middle"{dir}>{subtitle}</text>

  <g transform="translate({left_x}, 140)">
    <rect width="380" height="230" rx="20" fill="#1a1a24" stroke="#333" stroke-width="2"/>
    <image href="data:image/jpeg;base64,{wrong_b64}" x="20" y="18" width="340" height="194" preserveAspectRatio="xMidYMid slice"/>
    <text x="190" y="115" font-size="180" font-weight="900" fill="rgba(220,53,69,0.5)" text-anchor="middle" dominant-baseline="middle">×</text>
  </g>
  <text x="{left_label_x}" y="400" font-family="{font}" font-size="26" font-weight="600" fill="#dc3545" text-anchor="middle"{dir}>{wrong}</text>

  <text x="640" y="270" font-size="80" fill="#239F40" text-anchor="middle">{arrow}</text>

  <g transform="translate({right_x}, 140)">
    <rect width="380" height="230" rx="20" fill="#1a1a24" stroke="#239F40" stroke-width="3"/>
    <svg x="20" y="18" width="340" height="194" viewBox="0 5 36 26" preserveAspectRatio="none">
      {official}
    </svg>
  </g>
  <text x="{right_label_x}" y="400" font-family="{font}" font-size="26" font-weight="600" fill="#239F40" text-anchor="middle"{dir}>{official_label}</text>

  <circle cx="{check_x}" cy="345" r="24" fill="#239F40"/>
  <path d="M{check_l},345 L{check_m},353 L{check_r},333" stroke="#fff" stroke-width="4" fill="none" stroke-linecap="round" stroke-linejoin="round"/>

  <text x="640" y="480" font-family="{font}" font-size="36" fill="#fff" text-anchor="middle" font-weight="600"{dir}>{tagline}</text>

  <text x="640" y="530" font-family="{font}" font-size="20" fill="#666" text-anchor="middle"{dir}>{platforms}</text>

  <text x="640" y="590" font-family="monospace" font-size="22" fill="#444" text-anchor="middle">{host}</text>
</svg>"##,
        title = label(&text.title),
        subtitle = label(&text.subtitle),
        wrong = label(&text.wrong_flag),
        official_label = label(&text.official_flag),
        tagline = label(&text.tagline),
        platforms = label(&text.platforms),
        check_l = check_x - 12,
        check_m = check_x - 4,
        check_r = check_x + 12,
        host = escape(&art.site_host),
    )
}

fn font_for(t: &Translation) -> &str {
    t.field("fontFamily").unwrap_or(DEFAULT_FONT)
}

/// Write a card for every language that has `og` strings. Returns written paths.
pub fn generate_all(data: &SiteData, site_dir: &Path) -> Result<Vec<PathBuf>> {
    let languages: Vec<_> = data
        .languages
        .iter()
        .filter_map(|l| data.i18n.get(&l.code).map(|t| (l, t)))
        .filter(|(_, t)| t.og.is_some())
        .collect();
    if languages.is_empty() {
        println!("[SKIP] No language defines Open Graph strings");
        return Ok(Vec::new());
    }

    let art = CardArt::load(site_dir, &data.assets.site_url)?;
    let mut written = Vec::new();
    for (language, t) in languages {
        let Some(og) = &t.og else { continue };
        let svg = generate_svg(og, t.is_rtl(), font_for(t), &art);
        let out = site_dir.join(og_file_name(&language.code));
        write_file_with_dirs(&out, svg)?;
        println!("Generated {}", og_file_name(&language.code));
        written.push(out);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> OgText {
        OgText {
            title: "Restore Iran Flag".into(),
            subtitle: "Browser extension for Twitter/X".into(),
            wrong_flag: "Wrong Flag".into(),
            official_flag: "Official Flag".into(),
            tagline: "Flags Belong to Nations, Not Platforms".into(),
            platforms: "Chrome • Firefox & more".into(),
        }
    }

    fn art() -> CardArt {
        CardArt {
            wrong_flag_jpeg: vec![0xff, 0xd8, 0xff],
            official_flag_svg: r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 36 36"><path d="M0 0h36v36H0z"/></svg>"#.into(),
            site_host: "restoir.yusef.ren".into(),
        }
    }

    #[test]
    fn test_og_file_name() {
        assert_eq!(og_file_name("en"), "og-image.svg");
        assert_eq!(og_file_name("fa"), "og-image-fa.svg");
    }

    #[test]
    fn test_official_flag_inner() {
        assert_eq!(official_flag_inner(&art().official_flag_svg), r#"<path d="M0 0h36v36H0z"/>"#);
    }

    #[test]
    fn test_ltr_layout() {
        let svg = generate_svg(&text(), false, "Inter, sans-serif", &art());
        assert!(svg.contains(r#"<g transform="translate(100, 140)">"#));
        assert!(svg.contains("→"));
        assert!(svg.contains(r#"<circle cx="1080""#));
        assert!(svg.contains("data:image/jpeg;base64,/9j/"));
        assert!(svg.contains("Chrome • Firefox &amp; more"));
        assert!(!svg.contains("direction=\"rtl\""));
        assert!(svg.contains(">restoir.yusef.ren</text>"));
    }

    #[test]
    fn test_rtl_layout_is_mirrored() {
        let svg = generate_svg(&text(), true, "Vazirmatn, sans-serif", &art());
        assert!(svg.contains(r#"<g transform="translate(750, 140)">"#));
        assert!(svg.contains("←"));
        assert!(svg.contains(r#"<circle cx="330""#));
        assert!(svg.contains(&format!(r#" direction="rtl">{RTL_MARK}Restore Iran Flag"#)));
    }
}
