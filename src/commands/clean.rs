//! Clean command - removes build artifacts.

use anyhow::Result;

use crate::clean;
use crate::config::Config;

/// Clean target for the clean command.
pub enum CleanTarget {
    /// Clean the output directory (default)
    Outputs,
    /// Clean generated Open Graph cards
    Og,
    /// Clean everything
    All,
}

/// Execute the clean command.
pub fn cmd_clean(config: &Config, target: CleanTarget) -> Result<()> {
    match target {
        CleanTarget::Outputs => clean::clean_outputs(config)?,
        CleanTarget::Og => clean::clean_og(config)?,
        CleanTarget::All => {
            clean::clean_outputs(config)?;
            clean::clean_og(config)?;
        }
    }
    Ok(())
}
