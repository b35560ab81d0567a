//! On-disk layout of a documentation bundle.
//!
//! ```text
//! <root>/
//!   class_lookup.json     name index
//!   .last-download-url    identifier of the installed bundle
//!   java/lang/String.md   documentation bodies, as referenced by the index
//! ```

use std::{
    fmt, fs, io,
    path::{Component, Path, PathBuf},
};

pub const INDEX_FILE: &str = "class_lookup.json";
pub const MARKER_FILE: &str = ".last-download-url";

/// Opaque string naming a remote bundle (usually a signed URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleIdentifier(String);

impl BundleIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a persisted value, ignoring surrounding whitespace.
    pub fn matches(&self, stored: &str) -> bool {
        self.0 == stored.trim()
    }
}

impl fmt::Display for BundleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    pub fn has_index(&self) -> bool {
        self.index_path().is_file()
    }

    /// Resolve an index-relative path inside the store. Absolute paths and
    /// paths climbing out of the root yield `None`.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        if !is_contained(relative) {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// The identifier of the installed bundle, if one was ever recorded.
    pub fn read_identifier(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(self.marker_path()) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn write_identifier(&self, identifier: &BundleIdentifier) -> io::Result<()> {
        fs::write(self.marker_path(), format!("{}\n", identifier.as_str()))
    }
}

/// True when `relative` stays inside whatever directory it is joined to.
pub fn is_contained(relative: &str) -> bool {
    if relative.is_empty() {
        return false;
    }
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}
