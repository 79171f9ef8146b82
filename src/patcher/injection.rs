//! Injection contract.
//!
//! The patcher must run on every page of the target site before page scripts
//! execute, with no privileges beyond the DOM and its two bundled images.
//! Extensions declare this in `manifest.json` (`content_scripts`), script
//! managers in the `==UserScript==` metadata block. Both are validated here.

use serde_json::Value;

use super::assets::{FLAG_PNG_NAME, FLAG_SVG_NAME};

/// Pages the patcher is injected into.
pub const MATCH_PATTERNS: [&str; 3] = [
    "https://twitter.com/*",
    "https://x.com/*",
    "https://mobile.twitter.com/*",
];

/// `content_scripts[].run_at` for injection before page scripts.
pub const CONTENT_SCRIPT_RUN_AT: &str = "document_start";

/// `@run-at` for injection before page scripts.
pub const USERSCRIPT_RUN_AT: &str = "document-start";

/// `@grant` value for a script with no special privileges.
pub const USERSCRIPT_GRANT: &str = "none";

const USERSCRIPT_OPEN: &str = "// ==UserScript==";
const USERSCRIPT_CLOSE: &str = "// ==/UserScript==";

/// `@key value` pairs of the userscript metadata block, in order.
/// Returns `None` if the source has no complete block.
pub fn userscript_directives(source: &str) -> Option<Vec<(String, String)>> {
    let mut lines = source.lines().map(str::trim);
    lines.by_ref().find(|l| *l == USERSCRIPT_OPEN)?;

    let mut directives = Vec::new();
    for line in lines {
        if line == USERSCRIPT_CLOSE {
            return Some(directives);
        }
        let Some(rest) = line.strip_prefix("//").map(str::trim_start) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('@') else {
            continue;
        };
        let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        directives.push((key.to_string(), value.trim().to_string()));
    }
    None
}

fn values<'a>(directives: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    directives
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// Ways a userscript breaks the injection contract.
pub fn userscript_violations(source: &str) -> Vec<String> {
    let Some(directives) = userscript_directives(source) else {
        return vec!["no ==UserScript== metadata block".to_string()];
    };
    let mut violations = Vec::new();
    let matches = values(&directives, "match");
    for pattern in MATCH_PATTERNS {
        if !matches.contains(&pattern) {
            violations.push(format!("missing @match {pattern}"));
        }
    }
    match values(&directives, "run-at").as_slice() {
        [USERSCRIPT_RUN_AT] => {}
        [] => violations.push(format!("missing @run-at {USERSCRIPT_RUN_AT}")),
        other => violations.push(format!("@run-at {} (expected {USERSCRIPT_RUN_AT})", other.join(", "))),
    }
    let grants = values(&directives, "grant");
    if grants.iter().any(|g| *g != USERSCRIPT_GRANT) {
        violations.push(format!("@grant {} (expected {USERSCRIPT_GRANT})", grants.join(", ")));
    }
    violations
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Resources the page may load: MV2 lists names, MV3 lists `{resources}` objects.
fn web_accessible(manifest: &Value) -> Vec<&str> {
    let Some(entries) = manifest.get("web_accessible_resources").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .flat_map(|entry| match entry {
            Value::String(name) => vec![name.as_str()],
            other => strings(other.get("resources")),
        })
        .collect()
}

/// Ways an extension manifest breaks the injection contract.
pub fn manifest_violations(manifest: &Value) -> Vec<String> {
    let scripts = manifest
        .get("content_scripts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let Some(script) = scripts.iter().find(|s| !strings(s.get("js")).is_empty()) else {
        return vec!["no content_scripts entry with js".to_string()];
    };

    let mut violations = Vec::new();
    let matches = strings(script.get("matches"));
    for pattern in MATCH_PATTERNS {
        if !matches.contains(&pattern) {
            violations.push(format!("missing match pattern {pattern}"));
        }
    }
    // Browsers default to document_idle.
    let run_at = script.get("run_at").and_then(Value::as_str).unwrap_or("document_idle");
    if run_at != CONTENT_SCRIPT_RUN_AT {
        violations.push(format!("run_at {run_at} (expected {CONTENT_SCRIPT_RUN_AT})"));
    }

    let permissions = strings(manifest.get("permissions"));
    if !permissions.is_empty() {
        violations.push(format!("requests permissions: {}", permissions.join(", ")));
    }
    let resources = web_accessible(manifest);
    for name in [FLAG_SVG_NAME, FLAG_PNG_NAME] {
        if !resources.contains(&name) {
            violations.push(format!("{name} is not web accessible"));
        }
    }
    violations
}
