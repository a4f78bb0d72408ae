//! List command implementation

use std::path::Path;

use colored::Colorize;
use stpm_core::Engine;

use crate::error::Result;

/// Run the list command
pub fn run_list(root: &Path, json: bool) -> Result<()> {
    let engine = Engine::open(root)?;
    let manifest = engine.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    if manifest.is_empty() {
        println!("No packages imported.");
        return Ok(());
    }

    for record in manifest.records() {
        let detail = match record.bundled_assets.len() {
            0 => format!("{} file(s)", record.files.len()),
            n => format!("{n} region(s)"),
        };
        println!(
            "{} {} {} {}",
            record.package_id.cyan().bold(),
            format!("({})", record.kind).dimmed(),
            detail,
            record.imported_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    Ok(())
}
