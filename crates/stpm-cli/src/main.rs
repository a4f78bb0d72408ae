//! stpm CLI
//!
//! The command-line interface for importing npm packages into a theme.

mod cli;
mod commands;
mod error;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let root = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(cmd) => execute_command(root, cmd),
        None => {
            println!("{} theme package manager", "stpm".green().bold());
            println!();
            println!("Run {} for available commands.", "stpm --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(root: PathBuf, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Add { packages, force } => commands::run_add(&root, &packages, force, false),
        Commands::Import { packages, force } => commands::run_add(&root, &packages, force, true),
        Commands::Update { packages } => commands::run_update(&root, &packages),
        Commands::Remove {
            packages,
            keep_installed,
        } => commands::run_remove(&root, &packages, keep_installed),
        Commands::Clean => commands::run_clean(&root),
        Commands::Prune => commands::run_prune(&root),
        Commands::Build => commands::run_build(&root),
        Commands::List { json } => commands::run_list(&root, json),
    }
}
