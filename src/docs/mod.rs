//! Documentation index module
//!
//! This module loads the name index (`class_lookup.json`) of an installed
//! documentation bundle. The index is read once, on first access, and shared
//! through an [`IndexCell`] that the query engine owns.
//!
//! # Usage
//!
//! ```no_run
//! use jdocs::docs::IndexCell;
//! use jdocs::store::BundleStore;
//!
//! let cell = IndexCell::new(BundleStore::new("./javadocs"));
//! let index = cell.get().expect("index available");
//!
//! if let Some(entry) = index.resolve("java.lang.string") {
//!     println!("{} -> {}", entry.fully_qualified_name, entry.relative_path);
//! }
//! ```

mod cell;
mod types;

pub use cell::IndexCell;
pub use types::{DocKind, DocumentationEntry, LookupIndex, package_of};
