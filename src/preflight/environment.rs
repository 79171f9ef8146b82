//! Build environment checks.

use std::fs;
use std::path::Path;

use super::types::{Category, CheckResult};

/// Check the output directory can be created and written.
pub fn check_dist_writable(dist_dir: &Path) -> CheckResult {
    let name = format!("{} writable", dist_dir.display());
    if let Err(e) = fs::create_dir_all(dist_dir) {
        return Category::Output.fail(name, format!("Cannot create: {}", e));
    }
    let marker = dist_dir.join(".preflight-test");
    match fs::write(&marker, "test") {
        Ok(_) => {
            let _ = fs::remove_file(&marker);
            Category::Output.pass(name)
        }
        Err(e) => Category::Output.fail(name, format!("Cannot write: {}", e)),
    }
}
