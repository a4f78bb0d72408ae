//! Clean, prune and build command implementations

use std::path::Path;

use colored::Colorize;
use stpm_core::Engine;

use super::finish_batch;
use crate::error::Result;

/// Run the clean command
///
/// Collapses duplicate regions in every asset referenced by the manifest.
pub fn run_clean(root: &Path) -> Result<()> {
    println!("{} Checking generated assets...", "=>".blue().bold());
    let engine = Engine::open(root)?;
    let report = engine.repair()?;

    for asset in &report.assets {
        let removed = asset.total_removed();
        if removed > 0 {
            println!(
                "{} {}: removed {} duplicate region(s)",
                "FIXED".yellow().bold(),
                asset.path.cyan(),
                removed
            );
        }
        for orphan in &asset.orphans {
            println!(
                "{} {}: unterminated region for {} at line {}",
                "WARN".yellow().bold(),
                asset.path.cyan(),
                orphan.marker,
                orphan.line
            );
        }
    }

    if report.total_removed() == 0 {
        println!("{} No duplicate regions found.", "OK".green().bold());
    }
    Ok(())
}

/// Run the prune command
pub fn run_prune(root: &Path) -> Result<()> {
    println!("{} Pruning packages missing from package.json...", "=>".blue().bold());
    let engine = Engine::open(root)?;
    let report = engine.prune()?;

    for (_, record) in &report.succeeded {
        let contributed = record.files.len() + record.bundled_assets.len();
        println!(
            "{} Removed {} ({}, {} contribution(s))",
            "OK".green().bold(),
            record.package_id.cyan(),
            record.kind,
            contributed
        );
    }
    if report.succeeded.is_empty() && report.failed.is_empty() {
        println!("{} Nothing to prune.", "OK".green().bold());
    }
    finish_batch(&report)
}

/// Run the build command
pub fn run_build(root: &Path) -> Result<()> {
    println!("{} Rebuilding imported packages...", "=>".blue().bold());
    let engine = Engine::open(root)?;
    let report = engine.rebuild()?;

    for (id, kind) in &report.succeeded {
        println!("{} Rebuilt {} ({})", "OK".green().bold(), id.cyan(), kind);
    }
    if report.succeeded.is_empty() && report.failed.is_empty() {
        println!("No packages imported.");
    }
    finish_batch(&report)
}
