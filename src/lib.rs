//! jdocs - Java API documentation server core
//!
//! Keeps a documentation bundle on disk in sync with a remote source and
//! answers name searches and documentation lookups against it.
//!
//! - [`provision`] downloads, validates and atomically installs bundles
//! - [`docs`] loads the bundle's name index once and shares it
//! - [`query`] implements search and retrieval over the index
//! - [`tools`] exposes both as named operations for a transport

pub mod config;
pub mod docs;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod provision;
pub mod query;
pub mod store;
pub mod tools;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use docs::{DocKind, DocumentationEntry, IndexCell, LookupIndex};
pub use provision::{ProvisionOutcome, Provisioner};
pub use query::QueryEngine;
