//! Configuration management for restoir.
//!
//! Reads configuration from a .env file in the site directory and from
//! environment variables. Environment variables take precedence over .env.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Default extension base used when resolving bundled assets outside a browser.
pub const DEFAULT_EXTENSION_BASE: &str = "chrome-extension://restoir/";

/// Restoir configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site source directory (holds data.json, templates and extension sources)
    pub site_dir: PathBuf,
    /// Localization data file (default: data.json)
    pub data_file: PathBuf,
    /// Main page template (default: template.html)
    pub template: PathBuf,
    /// Instruction page template (default: safari-instructions-template.html)
    pub safari_template: PathBuf,
    /// Output directory (default: dist)
    pub dist_dir: PathBuf,
    /// Base URL of the packaged extension, for `check`
    pub extension_base: String,
}

impl Config {
    /// Load configuration from `<site_dir>/.env` and the environment.
    pub fn load(site_dir: &Path) -> Self {
        let mut env_vars = HashMap::new();

        let env_path = site_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path_iter(&env_path) {
                Ok(iter) => {
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                env_vars.insert(key, value);
                            }
                            Err(e) => warn!(path = %env_path.display(), "skipping .env line: {e}"),
                        }
                    }
                }
                Err(e) => warn!(path = %env_path.display(), "failed to read .env: {e}"),
            }
        }

        // Environment variables override .env file
        for (key, value) in std::env::vars() {
            env_vars.insert(key, value);
        }

        let path = |key: &str, default: &str| -> PathBuf {
            let path = env_vars
                .get(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                site_dir.join(path)
            }
        };

        Self {
            site_dir: site_dir.to_path_buf(),
            data_file: path("RESTOIR_DATA_FILE", "data.json"),
            template: path("RESTOIR_TEMPLATE", "template.html"),
            safari_template: path("RESTOIR_SAFARI_TEMPLATE", "safari-instructions-template.html"),
            dist_dir: path("RESTOIR_DIST_DIR", "dist"),
            extension_base: env_vars
                .get("RESTOIR_EXTENSION_BASE")
                .cloned()
                .unwrap_or_else(|| DEFAULT_EXTENSION_BASE.to_string()),
        }
    }

    /// Check if the data file is present.
    pub fn has_data_file(&self) -> bool {
        self.data_file.is_file()
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  SITE_DIR: {}", self.site_dir.display());
        println!("  RESTOIR_DATA_FILE: {}", self.data_file.display());
        println!("  RESTOIR_TEMPLATE: {}", self.template.display());
        println!("  RESTOIR_SAFARI_TEMPLATE: {}", self.safari_template.display());
        println!("  RESTOIR_DIST_DIR: {}", self.dist_dir.display());
        println!("  RESTOIR_EXTENSION_BASE: {}", self.extension_base);
        if self.has_data_file() {
            println!("  Data file: FOUND");
        } else {
            println!("  Data file: NOT FOUND (run 'restoir preflight' for details)");
        }
    }
}
