//! Restoir - Restore Iran Flag site builder.
//!
//! Renders the localized site, copies static assets and packs the browser
//! extension sources into store-ready archives.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use restoir::commands;
use restoir::config::Config;

#[derive(Parser)]
#[command(name = "restoir")]
#[command(about = "Restore Iran Flag site builder")]
#[command(
    after_help = "QUICK START:\n  restoir            Build pages, assets and archives\n  restoir preflight  Check all inputs\n  restoir build      Same as no arguments; accepts a target and --force\n  restoir clean      Remove build artifacts"
)]
struct Cli {
    /// Site source directory (default: current directory)
    #[arg(long, global = true)]
    site_dir: Option<PathBuf>,

    // No subcommand runs a full build
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site (pages, static assets, extension archives)
    Build {
        #[command(subcommand)]
        target: Option<BuildTarget>,

        /// Rebuild even if inputs are unchanged
        #[arg(long, global = true)]
        force: bool,
    },

    /// Check which image references the flag patcher would rewrite
    Check {
        /// Resolve replacements as inline data URIs (userscript form)
        #[arg(long)]
        inline: bool,

        /// Image references (src values) to test
        #[arg(required = true)]
        references: Vec<String>,
    },

    /// Clean build artifacts (default: output directory)
    Clean {
        #[command(subcommand)]
        what: Option<CleanTarget>,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (verify all inputs before build)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum BuildTarget {
    /// Render language pages and instruction pages
    Pages,
    /// Copy static assets
    Assets,
    /// Pack extension source directories
    Archives,
    /// Generate Open Graph cards into the site directory
    Og,
}

#[derive(Subcommand)]
enum CleanTarget {
    /// Remove generated Open Graph cards
    Og,
    /// Remove outputs and Open Graph cards
    All,
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show build status (what needs rebuilding)
    Status,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let site_dir = match cli.site_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = Config::load(&site_dir);

    let command = cli.command.unwrap_or(Commands::Build {
        target: None,
        force: false,
    });

    match command {
        Commands::Build { target, force } => {
            let build_target = match target {
                None => commands::build::BuildTarget::Full,
                Some(BuildTarget::Pages) => commands::build::BuildTarget::Pages,
                Some(BuildTarget::Assets) => commands::build::BuildTarget::Assets,
                Some(BuildTarget::Archives) => commands::build::BuildTarget::Archives,
                Some(BuildTarget::Og) => commands::build::BuildTarget::Og,
            };
            commands::cmd_build(&config, build_target, force)?;
        }

        Commands::Check { inline, references } => {
            commands::cmd_check(&config, &references, inline)?;
        }

        Commands::Clean { what } => {
            let clean_target = match what {
                None => commands::clean::CleanTarget::Outputs,
                Some(CleanTarget::Og) => commands::clean::CleanTarget::Og,
                Some(CleanTarget::All) => commands::clean::CleanTarget::All,
            };
            commands::cmd_clean(&config, clean_target)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Status => commands::show::ShowTarget::Status,
            };
            commands::cmd_show(&config, show_target)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }
    }

    Ok(())
}
