//! Tests for the restoir binary.

mod helpers;

use helpers::{assert_file_exists, TestSite};
use std::process::{Command, Output};

fn restoir(site: &TestSite, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_restoir"));
    cmd.args(args).current_dir(&site.site_dir);
    for key in [
        "RESTOIR_DATA_FILE",
        "RESTOIR_TEMPLATE",
        "RESTOIR_SAFARI_TEMPLATE",
        "RESTOIR_DIST_DIR",
        "RESTOIR_EXTENSION_BASE",
    ] {
        cmd.env_remove(key);
    }
    cmd.output().expect("Failed to run restoir")
}

#[test]
fn test_no_arguments_runs_full_build() {
    let site = TestSite::new();
    let output = restoir(&site, &[]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    for file in ["index.html", "fa.html", "ar.html", "safari-fa.html", "chrome-extension.zip", "firefox-addon.zip"] {
        assert_file_exists(&site.dist(file));
    }
    assert_file_exists(&site.dist("userscript/restore-iran-flag.user.js"));
}

#[test]
fn test_missing_data_file_exits_nonzero() {
    let site = TestSite::new();
    std::fs::remove_file(site.path("data.json")).unwrap();
    let output = restoir(&site, &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("data.json"));
}

#[test]
fn test_check_classifies_references() {
    let site = TestSite::new();
    let output = restoir(
        &site,
        &[
            "check",
            "https://abs-0.twimg.com/emoji/v2/svg/1f1ee-1f1f7.svg",
            "https://pbs.twimg.com/media/photo.jpg",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[PATCH] https://abs-0.twimg.com/emoji/v2/svg/1f1ee-1f1f7.svg"));
    assert!(stdout.contains("-> chrome-extension://restoir/flag.svg"));
    assert!(stdout.contains("[KEEP]  https://pbs.twimg.com/media/photo.jpg"));
    assert!(stdout.contains("1/2 reference(s) would be patched"));
}
