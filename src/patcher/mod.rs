//! Flag patcher.
//!
//! Finds `<img>` elements showing the target flag emoji and points them at a
//! bundled replacement image. Patching is idempotent and order-independent,
//! so it is simply reapplied on every sweep and every relevant mutation.

pub mod assets;
pub mod document;
pub mod dom;
pub mod injection;
pub mod patterns;
pub mod session;
#[cfg(target_arch = "wasm32")]
pub mod web;

use tracing::debug;

pub use assets::{AssetFormat, AssetPair, AssetResolver, ExtensionAssets, InlineAssets};
pub use document::{Document, NodeId};
pub use dom::{Dom, MutationRecord, ObserveOptions, ReadyState};
pub use patterns::{TargetPatterns, IRAN_FLAG_CODEPOINT};
pub use session::{ObservationMode, PageEvent, PatchSession};

/// What `patch_image` did to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Not a target (no reference, unrelated image, or already bundled).
    Untouched,
    /// Reference rewritten to the replacement.
    Patched { from: String, to: String },
}

impl PatchOutcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, PatchOutcome::Patched { .. })
    }
}

/// Replaces target images with bundled assets.
pub struct FlagPatcher<R> {
    patterns: TargetPatterns,
    assets: AssetPair,
    resolver: R,
}

impl<R: AssetResolver> FlagPatcher<R> {
    /// Patcher for the Iranian flag using the given asset strategy.
    pub fn new(resolver: R) -> Self {
        Self::with_patterns(TargetPatterns::iran_flag().clone(), resolver)
    }

    pub fn with_patterns(patterns: TargetPatterns, resolver: R) -> Self {
        let assets = resolver.resolve();
        Self {
            patterns,
            assets,
            resolver,
        }
    }

    pub fn patterns(&self) -> &TargetPatterns {
        &self.patterns
    }

    pub fn is_target_image(&self, reference: Option<&str>) -> bool {
        match reference {
            None | Some("") => false,
            Some(r) if self.resolver.is_bundled(r) => false,
            Some(r) => self.patterns.matches(r),
        }
    }

    pub fn choose_replacement(&self, reference: &str) -> &str {
        self.assets.get(AssetFormat::of_reference(reference))
    }

    /// Current reference of an image: the attribute wins, the live property
    /// is the fallback for framework-managed elements.
    pub fn current_reference<D: Dom>(dom: &D, node: &D::Node) -> Option<String> {
        dom.attribute(node, dom::SRC)
            .filter(|s| !s.is_empty())
            .or_else(|| dom.src_property(node).filter(|s| !s.is_empty()))
    }

    pub fn patch_image<D: Dom>(&self, dom: &mut D, node: &D::Node) -> PatchOutcome {
        let Some(current) = Self::current_reference(dom, node) else {
            return PatchOutcome::Untouched;
        };
        if !self.is_target_image(Some(&current)) {
            return PatchOutcome::Untouched;
        }

        let replacement = self.choose_replacement(&current);
        if current == replacement {
            return PatchOutcome::Untouched;
        }
        let replacement = replacement.to_string();

        dom.set_src_property(node, &replacement);
        dom.set_attribute(node, dom::SRC, &replacement);
        // A stale srcset would let the browser pick an unpatched variant.
        if dom.srcset_property(node).is_some_and(|s| !s.is_empty()) {
            dom.set_srcset_property(node, "");
        }

        debug!(from = %current, to = %replacement, "patched flag image");
        PatchOutcome::Patched {
            from: current,
            to: replacement,
        }
    }

    /// Patch every image in the document. Returns how many were rewritten.
    pub fn sweep<D: Dom>(&self, dom: &mut D) -> usize {
        let images = dom.images();
        let patched = images
            .iter()
            .filter(|img| self.patch_image(dom, img).is_patched())
            .count();
        debug!(images = images.len(), patched, "swept document");
        patched
    }

    /// React to a batch of mutation records. Returns how many images were rewritten.
    pub fn handle_mutations<D: Dom>(&self, dom: &mut D, records: &[MutationRecord<D::Node>]) -> usize {
        let mut patched = 0;
        for record in records {
            match record {
                MutationRecord::ChildList { added, .. } => {
                    for node in added {
                        if !dom.is_element(node) {
                            continue;
                        }
                        if dom.is_image(node) && self.patch_image(dom, node).is_patched() {
                            patched += 1;
                        }
                        for img in dom.images_within(node) {
                            if self.patch_image(dom, &img).is_patched() {
                                patched += 1;
                            }
                        }
                    }
                }
                MutationRecord::Attributes { target, .. } => {
                    if dom.is_image(target) && self.patch_image(dom, target).is_patched() {
                        patched += 1;
                    }
                }
            }
        }
        patched
    }
}
