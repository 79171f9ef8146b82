//! Target pattern set for the flag image.
//!
//! Emoji images are served by filename codepoint (twemoji style), e.g.
//! `https://abs-0.twimg.com/emoji/v2/svg/1f1ee-1f1f7.svg`. The pattern set
//! recognizes the `.svg` form, the `.png` form and the bare codepoint.

use std::sync::LazyLock;

use regex::Regex;

/// Codepoint signature of the Iranian flag emoji (regional indicators I + R).
pub const IRAN_FLAG_CODEPOINT: &str = "1f1ee-1f1f7";

static IRAN_FLAG_PATTERNS: LazyLock<TargetPatterns> = LazyLock::new(|| {
    TargetPatterns::for_codepoint(IRAN_FLAG_CODEPOINT)
        .expect("flag codepoint patterns are valid regexes")
});

/// Ordered set of case-insensitive patterns identifying a target image.
#[derive(Debug, Clone)]
pub struct TargetPatterns {
    codepoint: String,
    patterns: Vec<Regex>,
}

impl TargetPatterns {
    /// Build the three surface forms for a codepoint signature.
    pub fn for_codepoint(codepoint: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(codepoint);
        let patterns = [
            format!(r"(?i){escaped}\.svg"),
            format!(r"(?i){escaped}\.png"),
            format!(r"(?i){escaped}"),
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            codepoint: codepoint.to_string(),
            patterns,
        })
    }

    /// Shared pattern set for the Iranian flag.
    pub fn iran_flag() -> &'static TargetPatterns {
        &IRAN_FLAG_PATTERNS
    }

    pub fn codepoint(&self) -> &str {
        &self.codepoint
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches. Order is irrelevant.
    pub fn matches(&self, reference: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(reference))
    }
}

impl Default for TargetPatterns {
    fn default() -> Self {
        Self::iran_flag().clone()
    }
}
