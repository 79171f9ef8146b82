//! Integration tests for the flag patcher on the in-memory document.

use proptest::prelude::*;
use restoir::patcher::assets::{FLAG_PNG, FLAG_SVG};
use restoir::patcher::dom::{self, Dom};
use restoir::patcher::{
    AssetResolver, Document, ExtensionAssets, FlagPatcher, InlineAssets, ObservationMode,
    PageEvent, PatchSession, ReadyState, IRAN_FLAG_CODEPOINT,
};
use std::time::Duration;

const BASE: &str = "chrome-extension://restoir/";
const TWEMOJI_SVG: &str = "https://abs-0.twimg.com/emoji/v2/svg/1f1ee-1f1f7.svg";
const TWEMOJI_PNG: &str = "https://abs-0.twimg.com/emoji/v2/72x72/1f1ee-1f1f7.png";
const AVATAR: &str = "https://pbs.twimg.com/profile_images/1/avatar_normal.jpg";

fn extension_session() -> PatchSession<ExtensionAssets> {
    PatchSession::new(FlagPatcher::new(ExtensionAssets::new(BASE)))
}

fn src(doc: &Document, img: restoir::patcher::NodeId) -> String {
    doc.attribute(&img, dom::SRC).unwrap_or_default()
}

// =============================================================================
// Target detection and replacement choice
// =============================================================================

#[test]
fn test_replacement_follows_reference_format() {
    let patcher = FlagPatcher::new(ExtensionAssets::new(BASE));
    assert_eq!(patcher.choose_replacement(TWEMOJI_SVG), "chrome-extension://restoir/flag.svg");
    assert_eq!(patcher.choose_replacement(TWEMOJI_PNG), "chrome-extension://restoir/flag.png");
    assert_eq!(
        patcher.choose_replacement("https://abs.twimg.com/emoji/1F1EE-1F1F7.SVG"),
        "chrome-extension://restoir/flag.svg"
    );
    // No format indicator falls back to PNG.
    assert_eq!(
        patcher.choose_replacement("https://abs.twimg.com/hashflags/1f1ee-1f1f7"),
        "chrome-extension://restoir/flag.png"
    );
}

#[test]
fn test_bundled_references_are_never_targets() {
    let ext = FlagPatcher::new(ExtensionAssets::new(BASE));
    assert!(!ext.is_target_image(Some("chrome-extension://restoir/flag.svg")));
    assert!(!ext.is_target_image(Some("moz-extension://abc/1f1ee-1f1f7.png")));

    let inline = FlagPatcher::new(InlineAssets::bundled());
    let replacement = inline.choose_replacement(TWEMOJI_SVG).to_string();
    assert!(replacement.starts_with("data:image/svg+xml;base64,"));
    assert!(!inline.is_target_image(Some(&replacement)));
    assert!(!inline.is_target_image(Some("data:text/plain,1f1ee-1f1f7.png")));
}

#[test]
fn test_inline_assets_embed_bundled_images() {
    let pair = InlineAssets::bundled().resolve();
    let expected_svg = restoir::patcher::assets::data_uri(restoir::patcher::AssetFormat::Svg, FLAG_SVG);
    let expected_png = restoir::patcher::assets::data_uri(restoir::patcher::AssetFormat::Png, FLAG_PNG);
    assert_eq!(pair.svg, expected_svg);
    assert_eq!(pair.png, expected_png);
    assert!(pair.png.starts_with("data:image/png;base64,iVBORw0KGgo"));
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test]
fn test_initial_sweep_patches_existing_images() {
    let mut doc = Document::new();
    let body = doc.body();
    let svg = doc.append_image(body, TWEMOJI_SVG);
    let png = doc.append_image(body, TWEMOJI_PNG);
    let avatar = doc.append_image(body, AVATAR);

    let mut session = extension_session();
    session.start(&mut doc, ReadyState::Interactive);

    assert!(session.is_running());
    assert!(doc.is_observed());
    assert_eq!(src(&doc, svg), "chrome-extension://restoir/flag.svg");
    assert_eq!(src(&doc, png), "chrome-extension://restoir/flag.png");
    assert_eq!(src(&doc, avatar), AVATAR);
    assert_eq!(session.stats().patched, 2);
}

#[test]
fn test_deferred_start_runs_on_dom_ready_and_resweeps_on_load() {
    let mut doc = Document::new();
    let mut session = extension_session();
    let ready = doc.ready_state();
    session.start(&mut doc, ready);
    assert!(session.is_deferred());

    let early = doc.append_image(doc.body(), TWEMOJI_SVG);
    doc.set_ready_state(ReadyState::Interactive);
    session.on_event(&mut doc, PageEvent::DomContentLoaded);
    assert_eq!(src(&doc, early), "chrome-extension://restoir/flag.svg");
    assert_eq!(session.stats().sweeps, 1);

    // Late images that arrive with the load event are caught by the second sweep.
    let late = doc.create_element("img");
    doc.set_src_property_only(&late, TWEMOJI_PNG);
    doc.append_child(doc.body(), late);
    doc.take_records();
    session.on_event(&mut doc, PageEvent::Load);
    assert_eq!(session.stats().sweeps, 2);
    assert_eq!(src(&doc, late), "chrome-extension://restoir/flag.png");
}

#[test]
fn test_inserted_subtree_is_patched() {
    let mut doc = Document::new();
    let mut session = extension_session();
    session.start(&mut doc, ReadyState::Complete);

    // Build a detached tweet and attach it in one insertion.
    let article = doc.create_element("article");
    let span = doc.create_element("span");
    let text = doc.create_text("Iran ");
    doc.append_child(article, span);
    doc.append_child(span, text);
    let flag = doc.create_element("img");
    doc.set_attribute(&flag, dom::SRC, TWEMOJI_SVG);
    doc.set_attribute(&flag, dom::SRCSET, "https://abs-0.twimg.com/emoji/v2/svg/1f1ee-1f1f7.svg 2x");
    doc.append_child(span, flag);
    assert_eq!(doc.pending_records(), 0);

    doc.append_child(doc.body(), article);
    assert_eq!(doc.children(doc.body()), [article]);
    let rounds = session.drain(&mut doc);

    assert!(rounds >= 1);
    assert_eq!(src(&doc, flag), "chrome-extension://restoir/flag.svg");
    assert_eq!(doc.srcset_property(&flag).as_deref(), Some(""));
    assert_eq!(doc.pending_records(), 0);
}

#[test]
fn test_src_change_on_existing_image_is_patched() {
    let mut doc = Document::new();
    let img = doc.append_image(doc.body(), AVATAR);
    let mut session = extension_session();
    session.start(&mut doc, ReadyState::Complete);

    doc.set_attribute(&img, dom::SRC, TWEMOJI_PNG);
    session.drain(&mut doc);

    assert_eq!(src(&doc, img), "chrome-extension://restoir/flag.png");
    assert_eq!(session.stats().patched, 1);
}

#[test]
fn test_patched_image_is_not_rewritten() {
    let mut doc = Document::new();
    let img = doc.append_image(doc.body(), TWEMOJI_SVG);
    let mut session = extension_session();
    session.start(&mut doc, ReadyState::Complete);
    session.drain(&mut doc);

    let writes = doc.attribute_writes();
    session.on_event(&mut doc, PageEvent::Load);
    session.drain(&mut doc);

    assert_eq!(doc.attribute_writes(), writes);
    assert_eq!(src(&doc, img), "chrome-extension://restoir/flag.svg");
}

#[test]
fn test_drain_settles_after_own_writes() {
    let mut doc = Document::new();
    let mut session = extension_session();
    session.start(&mut doc, ReadyState::Complete);

    for _ in 0..5 {
        doc.append_image(doc.body(), TWEMOJI_SVG);
    }
    // Insertions, then the patcher's own src writes, then quiet.
    assert_eq!(session.drain(&mut doc), 2);
    assert_eq!(session.stats().patched, 5);
}

#[test]
fn test_polling_mode_picks_up_changes_on_tick() {
    let mut doc = Document::new();
    let mut session = PatchSession::with_mode(
        FlagPatcher::new(InlineAssets::bundled()),
        ObservationMode::Polling {
            interval: Duration::from_millis(250),
        },
    );
    session.start(&mut doc, ReadyState::Complete);
    assert!(!doc.is_observed());

    let img = doc.append_image(doc.body(), TWEMOJI_PNG);
    assert_eq!(session.on_tick(&mut doc), 1);
    assert!(src(&doc, img).starts_with("data:image/png;base64,"));
    assert_eq!(session.on_tick(&mut doc), 0);
}

// =============================================================================
// Properties
// =============================================================================

fn unrelated_reference() -> impl Strategy<Value = String> {
    "https://[a-z]{1,12}\\.example/[a-z0-9/_.-]{0,40}"
        .prop_filter("must not mention the flag", |s| !s.to_ascii_lowercase().contains(IRAN_FLAG_CODEPOINT))
}

fn flag_reference() -> impl Strategy<Value = String> {
    (
        "https://[a-z]{1,12}\\.example/[a-z0-9/]{0,20}",
        prop_oneof![Just(".svg"), Just(".png"), Just(".SVG"), Just("")],
    )
        .prop_map(|(prefix, ext)| format!("{prefix}/{IRAN_FLAG_CODEPOINT}{ext}"))
}

proptest! {
    #[test]
    fn prop_patching_is_idempotent(reference in flag_reference()) {
        let mut doc = Document::new();
        let img = doc.append_image(doc.body(), &reference);
        let patcher = FlagPatcher::new(ExtensionAssets::new(BASE));

        prop_assert_eq!(patcher.sweep(&mut doc), 1);
        let once = src(&doc, img);
        let writes = doc.attribute_writes();

        prop_assert_eq!(patcher.sweep(&mut doc), 0);
        prop_assert_eq!(src(&doc, img), once);
        prop_assert_eq!(doc.attribute_writes(), writes);
    }

    #[test]
    fn prop_unrelated_images_are_untouched(
        reference in unrelated_reference(),
        srcset in "[a-z0-9/:. ]{0,30}",
    ) {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attribute(&img, dom::SRC, &reference);
        doc.set_attribute(&img, dom::SRCSET, &srcset);
        doc.append_child(doc.body(), img);
        let writes = doc.attribute_writes();

        let mut session = extension_session();
        session.start(&mut doc, ReadyState::Complete);
        session.on_event(&mut doc, PageEvent::Load);

        prop_assert_eq!(src(&doc, img), reference);
        prop_assert_eq!(doc.attribute(&img, dom::SRCSET), Some(srcset));
        prop_assert_eq!(doc.attribute_writes(), writes);
    }
}
