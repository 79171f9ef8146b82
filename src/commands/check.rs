//! Check command - runs image references through the flag patcher.

use anyhow::Result;

use crate::config::Config;
use crate::patcher::{AssetResolver, ExtensionAssets, FlagPatcher, InlineAssets};

/// Longest locator printed in full; data URIs are abbreviated.
const MAX_LOCATOR_LEN: usize = 72;

/// What the patcher would do with one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Target image, rewritten to `replacement`.
    Patch { replacement: String },
    /// Left untouched.
    Keep,
}

fn abbreviate(locator: &str) -> String {
    if locator.chars().count() <= MAX_LOCATOR_LEN {
        locator.to_string()
    } else {
        let head: String = locator.chars().take(MAX_LOCATOR_LEN).collect();
        format!("{head}...")
    }
}

/// Classify each reference the way the patcher would.
pub fn classify<R: AssetResolver>(patcher: &FlagPatcher<R>, references: &[String]) -> Vec<Verdict> {
    references
        .iter()
        .map(|reference| {
            if patcher.is_target_image(Some(reference.as_str())) {
                Verdict::Patch {
                    replacement: patcher.choose_replacement(reference).to_string(),
                }
            } else {
                Verdict::Keep
            }
        })
        .collect()
}

fn report<R: AssetResolver>(patcher: &FlagPatcher<R>, references: &[String]) -> usize {
    println!("Target codepoint: {}\n", patcher.patterns().codepoint());
    let verdicts = classify(patcher, references);
    for (reference, verdict) in references.iter().zip(&verdicts) {
        match verdict {
            Verdict::Patch { replacement } => {
                println!("  [PATCH] {}", reference);
                println!("          -> {}", abbreviate(replacement));
            }
            Verdict::Keep => println!("  [KEEP]  {}", reference),
        }
    }
    verdicts
        .iter()
        .filter(|v| matches!(v, Verdict::Patch { .. }))
        .count()
}

/// Execute the check command. Returns how many references would be patched.
pub fn cmd_check(config: &Config, references: &[String], inline: bool) -> Result<usize> {
    let targets = if inline {
        report(&FlagPatcher::new(InlineAssets::bundled()), references)
    } else {
        report(&FlagPatcher::new(ExtensionAssets::new(config.extension_base.clone())), references)
    };
    println!("\n{}/{} reference(s) would be patched", targets, references.len());
    Ok(targets)
}
