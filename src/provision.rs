//! Bringing the on-disk bundle up to date with the configured source.
//!
//! A run goes through: check the stored identifier, fetch when it changed,
//! unpack into staging, validate, then swap the staged bundle in together
//! with its identifier. Any failure after a usable bundle is already
//! installed degrades to a warning and that bundle keeps being served.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::docs::LookupIndex;
use crate::error::ProvisionError;
use crate::extract::StagedBundle;
use crate::fetch::{Fetcher, redact};
use crate::store::{BundleIdentifier, BundleStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// No source configured; serving the bundle already on disk.
    LocalOnly,
    /// Stored identifier matches the configured one; nothing was fetched.
    Unchanged,
    /// A new bundle was downloaded and installed.
    Refreshed { sha256: String },
    /// Refreshing failed; serving the previously installed bundle.
    Stale { reason: String },
}

pub struct Provisioner<F: Fetcher> {
    store: BundleStore,
    source: Option<BundleIdentifier>,
    timeout: Duration,
    fetcher: F,
    running: AtomicBool,
}

/// Marks a provisioning run in progress; cleared on drop.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<F: Fetcher> Provisioner<F> {
    pub fn new(config: &Config, fetcher: F) -> Self {
        Self {
            store: BundleStore::new(
                std::path::absolute(&config.store_root)
                    .unwrap_or_else(|_| config.store_root.clone()),
            ),
            source: config.bundle_identifier().map(BundleIdentifier::new),
            timeout: config.fetch_timeout(),
            fetcher,
            running: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub async fn provision(&self) -> Result<ProvisionOutcome, ProvisionError> {
        let _guard = RunGuard::acquire(&self.running).ok_or(ProvisionError::AlreadyRunning)?;

        let Some(source) = &self.source else {
            return if self.has_usable_bundle() {
                info!(root = %self.store.root().display(), "no bundle URL configured, using local bundle");
                Ok(ProvisionOutcome::LocalOnly)
            } else {
                error!(root = %self.store.root().display(), "no documentation available");
                Err(ProvisionError::NoDocumentationAvailable(
                    self.store.root().to_path_buf(),
                ))
            };
        };

        if self.is_current(source) {
            info!(source = %redact(source.as_str()), "bundle unchanged, skipping download");
            return Ok(ProvisionOutcome::Unchanged);
        }

        match self.refresh(source).await {
            Ok(sha256) => {
                info!(source = %redact(source.as_str()), %sha256, "bundle installed");
                Ok(ProvisionOutcome::Refreshed { sha256 })
            }
            Err(e) if self.has_usable_bundle() => {
                warn!(error = %e, "bundle refresh failed, serving previously installed bundle");
                Ok(ProvisionOutcome::Stale {
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                error!(error = %e, "bundle refresh failed and no bundle is installed");
                Err(e)
            }
        }
    }

    /// Stored identifier equals `source` and the bundle it names is present.
    fn is_current(&self, source: &BundleIdentifier) -> bool {
        match self.store.read_identifier() {
            Ok(Some(stored)) if source.matches(&stored) => {
                if self.store.has_index() {
                    true
                } else {
                    warn!("identifier recorded but index file is gone, fetching again");
                    false
                }
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "failed to read stored bundle identifier");
                false
            }
        }
    }

    fn has_usable_bundle(&self) -> bool {
        LookupIndex::load(&self.store).is_ok()
    }

    async fn refresh(&self, source: &BundleIdentifier) -> Result<String, ProvisionError> {
        info!(source = %redact(source.as_str()), "bundle changed, downloading");
        let fetched = self.fetcher.fetch(source, self.timeout).await?;

        let store = self.store.clone();
        let source = source.clone();
        let bytes = fetched.bytes;
        tokio::task::spawn_blocking(move || install_archive(&store, &source, &bytes))
            .await
            .map_err(|e| ProvisionError::ExtractionFailed(e.to_string()))??;

        Ok(fetched.sha256)
    }
}

/// Unpack, validate and install `archive` as the content of `store`.
fn install_archive(
    store: &BundleStore,
    source: &BundleIdentifier,
    archive: &[u8],
) -> Result<(), ProvisionError> {
    let staged = StagedBundle::unpack(archive, store.root())
        .map_err(|e| ProvisionError::ExtractionFailed(e.to_string()))?;

    let staged_store = staged.store();
    validate_bundle(&staged_store)?;

    staged_store
        .write_identifier(source)
        .map_err(|e| ProvisionError::ExtractionFailed(e.to_string()))?;
    staged
        .install(store.root())
        .map_err(|e| ProvisionError::ExtractionFailed(e.to_string()))?;
    Ok(())
}

/// The index must load and every entry must point at an existing file.
pub fn validate_bundle(store: &BundleStore) -> Result<usize, ProvisionError> {
    let index =
        LookupIndex::load(store).map_err(|e| ProvisionError::InvalidBundle(e.to_string()))?;

    let missing: Vec<&str> = index
        .entries()
        .filter(|entry| {
            !store
                .resolve(&entry.relative_path)
                .is_some_and(|path| path.is_file())
        })
        .map(|entry| entry.fully_qualified_name.as_str())
        .collect();

    if let Some(first) = missing.first() {
        return Err(ProvisionError::InvalidBundle(format!(
            "{} entries reference missing files (first: {})",
            missing.len(),
            first
        )));
    }

    if index.is_empty() {
        warn!("bundle index contains no entries");
    }
    Ok(index.len())
}
