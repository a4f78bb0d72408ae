//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// stpm - Splice npm packages into a theme, reversibly
#[derive(Parser, Debug)]
#[command(name = "stpm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in DIR
    #[arg(
        short = 'C',
        long = "directory",
        global = true,
        value_name = "DIR",
        env = "STPM_PROJECT_DIR"
    )]
    pub directory: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install packages and import them into the theme
    ///
    /// Examples:
    ///   stpm add @acme/slider
    ///   stpm add swiper --force     # Re-import an already imported package
    Add {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,

        /// Replace an existing import
        #[arg(short, long)]
        force: bool,
    },

    /// Import packages that are already installed
    Import {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,

        /// Replace an existing import
        #[arg(short, long)]
        force: bool,
    },

    /// Reinstall packages and replace their contribution
    Update {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Remove everything packages contributed
    Remove {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,

        /// Do not uninstall the packages
        #[arg(long)]
        keep_installed: bool,
    },

    /// Collapse duplicate regions in generated assets
    Clean,

    /// Remove imported packages no longer listed in package.json
    #[command(alias = "clean-all")]
    Prune,

    /// Rebuild every imported package without reinstalling
    Build,

    /// List imported packages
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
