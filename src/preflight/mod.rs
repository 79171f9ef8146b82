//! Preflight checks for the site build.
//!
//! Validates the data file, templates, every source the build reads and
//! the extension and userscript injection declarations before anything is
//! written. Run with `restoir preflight`.

mod environment;
mod inputs;
mod types;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{Category, CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking data file...");
    let (result, data) = inputs::check_data_file(config);
    checks.push(result);

    if let Some(data) = &data {
        println!("Checking translations...");
        checks.extend(inputs::check_translations(data));

        println!("Checking templates and sources...");
        checks.extend(inputs::check_templates(config, data));
        checks.extend(inputs::check_sources(config, data));

        println!("Checking injection declarations...");
        checks.extend(inputs::check_injection(config, data));
        checks.extend(inputs::check_og_art(config, data));
    }

    println!("Checking build environment...");
    checks.push(environment::check_dist_writable(&config.dist_dir));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
