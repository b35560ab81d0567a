use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{error, info};

use super::types::LookupIndex;
use crate::error::IndexError;
use crate::store::BundleStore;

/// Lazily loaded, load-once holder of a bundle's [`LookupIndex`].
///
/// The first call to [`IndexCell::get`] reads the index file; concurrent first
/// callers block until that single load finishes and then share its outcome.
/// Failures are memoized too, so a missing or corrupt index stays that way for
/// the lifetime of the cell. A re-provisioned store is only observed through a
/// new cell.
#[derive(Debug)]
pub struct IndexCell {
    store: BundleStore,
    cell: OnceCell<Result<Arc<LookupIndex>, IndexError>>,
}

impl IndexCell {
    pub fn new(store: BundleStore) -> Self {
        Self {
            store,
            cell: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub fn get(&self) -> Result<Arc<LookupIndex>, IndexError> {
        self.cell.get_or_init(|| load_index(&self.store)).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

fn load_index(store: &BundleStore) -> Result<Arc<LookupIndex>, IndexError> {
    let start = std::time::Instant::now();

    match LookupIndex::load(store) {
        Ok(index) => {
            info!(
                entries = index.len(),
                elapsed = ?start.elapsed(),
                path = %store.index_path().display(),
                "documentation index loaded"
            );
            Ok(Arc::new(index))
        }
        Err(e) => {
            error!(error = %e, "failed to load documentation index");
            Err(e)
        }
    }
}
