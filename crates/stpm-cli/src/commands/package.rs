//! Add, import, update and remove commands
//!
//! Each command runs over every given package and keeps going when one of
//! them fails; the failures are reported together at the end.

use std::path::Path;

use colored::Colorize;
use stpm_core::{Engine, ImportOptions, ImportReport, PackageKind, RemoveOptions};

use super::finish_batch;
use crate::error::Result;

/// Run `add` (install, then import) or `import` (already installed).
pub fn run_add(root: &Path, packages: &[String], force: bool, skip_install: bool) -> Result<()> {
    let engine = Engine::open(root)?;
    let options = ImportOptions {
        force,
        skip_install,
    };

    let report = engine.batch(packages, |engine, id| {
        println!("{} Importing {}...", "=>".blue().bold(), id.cyan());
        engine.import(id, options)
    });

    for (_, imported) in &report.succeeded {
        print_import(imported);
    }
    finish_batch(&report)
}

/// Run the update command.
pub fn run_update(root: &Path, packages: &[String]) -> Result<()> {
    let engine = Engine::open(root)?;

    let report = engine.batch(packages, |engine, id| {
        println!("{} Updating {}...", "=>".blue().bold(), id.cyan());
        engine.update(id)
    });

    for (_, updated) in &report.succeeded {
        print_import(updated);
    }
    finish_batch(&report)
}

/// Run the remove command.
pub fn run_remove(root: &Path, packages: &[String], keep_installed: bool) -> Result<()> {
    let engine = Engine::open(root)?;
    let options = RemoveOptions { keep_installed };

    let report = engine.batch(packages, |engine, id| engine.remove(id, options));

    for (id, removed) in &report.succeeded {
        match removed {
            Some(record) => println!(
                "{} Removed {} ({})",
                "OK".green().bold(),
                record.package_id.cyan(),
                record.kind
            ),
            None => println!("{} {} is not imported", "SKIP".yellow().bold(), id.cyan()),
        }
    }
    finish_batch(&report)
}

fn print_import(report: &ImportReport) {
    let record = &report.record;
    let verb = if report.previous.is_some() {
        "Re-imported"
    } else {
        "Imported"
    };
    println!(
        "{} {} {} ({})",
        "OK".green().bold(),
        verb,
        record.package_id.cyan(),
        record.kind
    );

    match record.kind {
        PackageKind::Native => {
            let copied = record.files.len() - report.unchanged_files;
            println!(
                "   {} {} file(s) copied, {} unchanged",
                "-".dimmed(),
                copied,
                report.unchanged_files
            );
            let keys = record.locale_keys.frontend.len() + record.locale_keys.schema.len();
            if keys > 0 {
                println!("   {} {} locale key(s) merged", "-".dimmed(), keys);
            }
            if !record.schema_blocks.is_empty() {
                println!(
                    "   {} {} settings block(s) merged",
                    "-".dimmed(),
                    record.schema_blocks.len()
                );
            }
        }
        PackageKind::Bundled => {
            for injection in &report.injections {
                println!("   {} {}", "-".dimmed(), injection.path);
                for orphan in &injection.orphans {
                    println!(
                        "     {} unterminated region for {} at line {}",
                        "!".yellow(),
                        orphan.marker,
                        orphan.line
                    );
                }
            }
        }
    }
}
