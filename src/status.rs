use colored::*;
use std::path::PathBuf;

use jdocs::config::Config;
use jdocs::docs::LookupIndex;
use jdocs::error::IndexError;
use jdocs::fetch::redact;
use jdocs::store::{BundleIdentifier, BundleStore};

#[derive(Debug)]
struct StoreStatus {
    root: PathBuf,
    installed: Option<String>,
    configured: Option<String>,
    index: Result<usize, IndexError>,
}

impl StoreStatus {
    fn collect(config: &Config) -> Result<Self, String> {
        let store = BundleStore::new(&config.store_root);
        let installed = store
            .read_identifier()
            .map_err(|e| format!("Failed to read {}: {}", store.marker_path().display(), e))?;

        Ok(Self {
            root: store.root().to_path_buf(),
            installed,
            configured: config.bundle_identifier().map(str::to_string),
            index: LookupIndex::load(&store).map(|index| index.len()),
        })
    }

    /// Whether the next provisioning run would skip the download.
    fn up_to_date(&self) -> bool {
        match (&self.configured, &self.installed) {
            (Some(configured), Some(installed)) => {
                BundleIdentifier::new(configured.as_str()).matches(installed) && self.index.is_ok()
            }
            (None, _) => self.index.is_ok(),
            _ => false,
        }
    }
}

pub fn show_status(config: &Config) -> Result<(), String> {
    let status = StoreStatus::collect(config)?;

    println!("{} {}", "Store:".bold(), status.root.display());
    println!(
        "{} {}",
        "Installed:".bold(),
        status
            .installed
            .as_deref()
            .map(redact)
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "{} {}",
        "Configured:".bold(),
        status
            .configured
            .as_deref()
            .map(redact)
            .unwrap_or_else(|| "none (local bundle only)".to_string())
    );

    match &status.index {
        Ok(entries) => println!("{} {} entries", "Index:".bold(), entries),
        Err(e) => println!("{} {}", "Index:".bold(), e.to_string().red()),
    }

    if status.up_to_date() {
        println!("{} Up to date", "✅".green());
    } else {
        println!("{} Provisioning needed", "🔄".yellow());
    }
    Ok(())
}
