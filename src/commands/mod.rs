//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Build the site, archives and Open Graph cards
//! - `check` - Test image references against the flag patcher
//! - `clean` - Clean build artifacts
//! - `show` - Display information
//! - `preflight` - Run preflight checks

pub mod build;
pub mod check;
pub mod clean;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use check::cmd_check;
pub use clean::cmd_clean;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
