//! Replacement asset resolution.
//!
//! The same patcher runs as a packaged extension content script (assets are
//! resolved against the extension's base URL) and as a userscript (assets
//! are inlined as `data:` URIs). Both are an [`AssetResolver`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Bundled vector image of the flag.
pub const FLAG_SVG: &[u8] = include_bytes!("../../assets/flag.svg");
/// Bundled raster image of the flag (72x72).
pub const FLAG_PNG: &[u8] = include_bytes!("../../assets/flag.png");

pub const FLAG_SVG_NAME: &str = "flag.svg";
pub const FLAG_PNG_NAME: &str = "flag.png";

/// URL schemes under which browsers serve packaged extension resources.
pub const EXTENSION_SCHEMES: &[&str] = &[
    "chrome-extension://",
    "moz-extension://",
    "safari-web-extension://",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Svg,
    Png,
}

impl AssetFormat {
    /// Format implied by an original image reference.
    ///
    /// Anything without an `.svg` indicator falls back to PNG.
    pub fn of_reference(reference: &str) -> Self {
        if reference.to_ascii_lowercase().contains(".svg") {
            AssetFormat::Svg
        } else {
            AssetFormat::Png
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AssetFormat::Svg => "image/svg+xml",
            AssetFormat::Png => "image/png",
        }
    }
}

/// Replacement locators, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    pub svg: String,
    pub png: String,
}

impl AssetPair {
    pub fn get(&self, format: AssetFormat) -> &str {
        match format {
            AssetFormat::Svg => &self.svg,
            AssetFormat::Png => &self.png,
        }
    }
}

/// Strategy for turning the two bundled images into loadable URIs.
pub trait AssetResolver {
    /// Resolve both replacement locators. Called once.
    fn resolve(&self) -> AssetPair;

    /// True if the reference already points at a bundled asset.
    fn is_bundled(&self, reference: &str) -> bool;
}

/// Assets packaged with a browser extension.
#[derive(Debug, Clone)]
pub struct ExtensionAssets {
    base_url: String,
}

impl ExtensionAssets {
    /// `base_url` is the extension root, e.g. `chrome-extension://<id>/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }
}

impl AssetResolver for ExtensionAssets {
    fn resolve(&self) -> AssetPair {
        AssetPair {
            svg: format!("{}{}", self.base_url, FLAG_SVG_NAME),
            png: format!("{}{}", self.base_url, FLAG_PNG_NAME),
        }
    }

    fn is_bundled(&self, reference: &str) -> bool {
        reference.starts_with(&self.base_url)
            || EXTENSION_SCHEMES
                .iter()
                .any(|scheme| reference.starts_with(scheme))
    }
}

/// Assets embedded as `data:` URIs, for script managers that cannot ship files.
#[derive(Debug, Clone)]
pub struct InlineAssets {
    svg: Vec<u8>,
    png: Vec<u8>,
}

impl InlineAssets {
    pub fn new(svg: impl Into<Vec<u8>>, png: impl Into<Vec<u8>>) -> Self {
        Self {
            svg: svg.into(),
            png: png.into(),
        }
    }

    /// The flag images compiled into this crate.
    pub fn bundled() -> Self {
        Self::new(FLAG_SVG, FLAG_PNG)
    }
}

impl AssetResolver for InlineAssets {
    fn resolve(&self) -> AssetPair {
        AssetPair {
            svg: data_uri(AssetFormat::Svg, &self.svg),
            png: data_uri(AssetFormat::Png, &self.png),
        }
    }

    fn is_bundled(&self, reference: &str) -> bool {
        reference.starts_with("data:")
    }
}

/// Encode bytes as a base64 `data:` URI.
pub fn data_uri(format: AssetFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}
