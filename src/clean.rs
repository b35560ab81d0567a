use colored::*;
use std::fs;

use jdocs::config::Config;

/// Remove the installed bundle. The next run downloads it again.
pub fn clean(config: &Config) -> Result<(), String> {
    let root = &config.store_root;

    if !root.exists() {
        println!("{} Nothing to clean", "✨".cyan());
        return Ok(());
    }

    fs::remove_dir_all(root)
        .map_err(|e| format!("Failed to remove documentation store: {}", e))?;

    println!("{} Removed documentation store:", "🧹".green());
    println!("  {} {}", "✓".green(), root.display());
    Ok(())
}
