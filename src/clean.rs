//! Build artifact cleaning.

use anyhow::Result;
use std::fs;

use crate::config::Config;
use crate::site::og::og_file_name;
use crate::site::SiteData;

/// Remove the output directory.
pub fn clean_outputs(config: &Config) -> Result<()> {
    if config.dist_dir.exists() {
        println!("Removing {}...", config.dist_dir.display());
        fs::remove_dir_all(&config.dist_dir)?;
    }
    println!("Clean complete.");
    Ok(())
}

/// Remove generated Open Graph cards from the site directory.
pub fn clean_og(config: &Config) -> Result<()> {
    let data = SiteData::load(&config.data_file)?;
    let mut cleaned = false;
    for language in &data.languages {
        if data.i18n.get(&language.code).is_some_and(|t| t.og.is_some()) {
            let card = config.site_dir.join(og_file_name(&language.code));
            if card.exists() {
                println!("Removing {}...", card.display());
                fs::remove_file(&card)?;
                cleaned = true;
            }
        }
    }
    if cleaned {
        println!("Open Graph cards cleaned.");
    } else {
        println!("No Open Graph cards to clean.");
    }
    Ok(())
}
