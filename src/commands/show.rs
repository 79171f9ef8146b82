//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;
use crate::site::SiteBuilder;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show which artifacts need rebuilding
    Status,
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Status => {
            let builder = SiteBuilder::load(config, false)?;
            println!("Build status:");
            for (artifact, needs_rebuild) in builder.status() {
                let state = if needs_rebuild { "needs rebuild" } else { "up to date" };
                println!("  {:<20} {}", artifact, state);
            }
        }
    }
    Ok(())
}
