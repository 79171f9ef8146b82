//! Build command - builds the site.

use anyhow::Result;
use std::time::Instant;

use crate::config::Config;
use crate::site::{BuildStep, SiteBuilder};

/// Build target for the build command.
pub enum BuildTarget {
    /// Pages, assets and archives
    Full,
    /// Language pages and instruction pages only
    Pages,
    /// Static asset copies only
    Assets,
    /// Extension archives only
    Archives,
    /// Open Graph cards (written to the site directory)
    Og,
}

/// Execute the build command.
pub fn cmd_build(config: &Config, target: BuildTarget, force: bool) -> Result<()> {
    let builder = SiteBuilder::load(config, force)?;
    match target {
        BuildTarget::Full => {
            println!("=== Full Site Build ===\n");
            let start = Instant::now();
            builder.build(&BuildStep::ALL)?;
            println!(
                "\nBuild complete! ({:.1}s)",
                start.elapsed().as_secs_f64()
            );
        }
        BuildTarget::Pages => {
            builder.build(&[BuildStep::Pages])?;
        }
        BuildTarget::Assets => {
            builder.build(&[BuildStep::Assets])?;
        }
        BuildTarget::Archives => {
            builder.build(&[BuildStep::Archives])?;
        }
        BuildTarget::Og => {
            builder.generate_og()?;
        }
    }
    Ok(())
}
