use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use std::{collections::HashMap, fmt, fs, io};
use tracing::warn;

use crate::error::IndexError;
use crate::store::{BundleStore, is_contained};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Class,
    Interface,
    Enum,
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocKind::Class => "class",
            DocKind::Interface => "interface",
            DocKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// One documented type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationEntry {
    pub fully_qualified_name: String,
    pub relative_path: String,
    pub kind: DocKind,
    pub package_name: String,
}

/// Entry as it appears in `class_lookup.json`.
#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    #[serde(rename = "type")]
    kind: DocKind,
    #[serde(default)]
    package: Option<String>,
}

/// The index object with its keys in file byte order, duplicates included.
struct OrderedEntries(Vec<(String, RawEntry)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping class names to entries")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, RawEntry>()? {
                    entries.push((name, entry));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Package of a fully qualified name: everything before the last dot.
pub fn package_of(fully_qualified_name: &str) -> &str {
    fully_qualified_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}

/// In-memory name index over a bundle.
///
/// Entries keep the order of the index file. When a name appears more than
/// once, the first occurrence wins; the same rule applies to names that only
/// collide after lowercasing.
#[derive(Debug, Default)]
pub struct LookupIndex {
    entries: Vec<DocumentationEntry>,
    by_name: HashMap<String, usize>,
    by_folded_name: HashMap<String, usize>,
}

impl LookupIndex {
    /// Load the index file of `store`.
    pub fn load(store: &BundleStore) -> Result<Self, IndexError> {
        let path = store.index_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IndexError::IndexMissing(path));
            }
            Err(e) => {
                return Err(IndexError::IndexCorrupt(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let OrderedEntries(raw) =
            serde_json::from_str(json).map_err(|e| IndexError::IndexCorrupt(e.to_string()))?;

        let mut index = LookupIndex::default();
        for (name, entry) in raw {
            if index.by_name.contains_key(&name) {
                warn!(name = %name, "duplicate index entry ignored");
                continue;
            }
            if !is_contained(&entry.path) {
                return Err(IndexError::IndexCorrupt(format!(
                    "entry '{}' points outside the bundle: {}",
                    name, entry.path
                )));
            }

            let package_name = entry
                .package
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| package_of(&name).to_string());

            let idx = index.entries.len();
            index.by_name.insert(name.clone(), idx);
            index.by_folded_name.entry(name.to_lowercase()).or_insert(idx);
            index.entries.push(DocumentationEntry {
                fully_qualified_name: name,
                relative_path: entry.path,
                kind: entry.kind,
                package_name,
            });
        }

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order.
    pub fn entries(&self) -> impl Iterator<Item = &DocumentationEntry> {
        self.entries.iter()
    }

    /// Exact lookup by fully qualified name.
    pub fn get(&self, name: &str) -> Option<&DocumentationEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Lookup by name ignoring case; the first matching entry in index order wins.
    pub fn get_ignore_case(&self, name: &str) -> Option<&DocumentationEntry> {
        self.by_folded_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    /// Exact match first, then the case-insensitive fallback.
    pub fn resolve(&self, name: &str) -> Option<&DocumentationEntry> {
        self.get(name).or_else(|| self.get_ignore_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "a.Foo": {"full_name": "a.Foo", "path": "f1", "type": "class", "package": "a"},
        "a.Bar": {"full_name": "a.Bar", "path": "f2", "type": "interface", "package": "a"},
        "a.Baz": {"full_name": "a.Baz", "path": "f1", "type": "enum", "package": "a"}
    }"#;

    #[test]
    fn test_preserves_file_order() {
        let index = LookupIndex::from_json(SAMPLE).unwrap();
        let names: Vec<_> = index
            .entries()
            .map(|e| e.fully_qualified_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.Foo", "a.Bar", "a.Baz"]);
        assert_eq!(index.get("a.Bar").unwrap().kind, DocKind::Interface);
        assert_eq!(index.get("a.Bar").unwrap().package_name, "a");
    }

    #[test]
    fn test_duplicate_keys_first_wins() {
        let json = r#"{
            "a.Foo": {"path": "first.md", "type": "class"},
            "a.Foo": {"path": "second.md", "type": "class"}
        }"#;
        let index = LookupIndex::from_json(json).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a.Foo").unwrap().relative_path, "first.md");
    }

    #[test]
    fn test_case_folded_collision_first_wins() {
        let json = r#"{
            "a.Url": {"path": "url.md", "type": "class"},
            "a.URL": {"path": "URL.md", "type": "class"}
        }"#;
        let index = LookupIndex::from_json(json).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("a.URL").unwrap().relative_path, "URL.md");
        assert_eq!(index.resolve("A.URL").unwrap().relative_path, "url.md");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"a.Note": {"path": "n.md", "type": "annotation"}}"#;
        assert!(matches!(
            LookupIndex::from_json(json),
            Err(IndexError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn test_escaping_path_rejected() {
        let json = r#"{"a.Foo": {"path": "../../etc/passwd", "type": "class"}}"#;
        assert!(matches!(
            LookupIndex::from_json(json),
            Err(IndexError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn test_ignored_duplicate_not_checked() {
        let json = r#"{
            "a.Foo": {"path": "foo.md", "type": "class"},
            "a.Foo": {"path": "../outside.md", "type": "class"}
        }"#;
        let index = LookupIndex::from_json(json).unwrap();
        assert_eq!(index.get("a.Foo").unwrap().relative_path, "foo.md");
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            LookupIndex::from_json("[1, 2, 3]"),
            Err(IndexError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn test_package_derived_when_absent() {
        let json = r#"{
            "java.util.List": {"path": "List.md", "type": "interface"},
            "Toplevel": {"path": "Toplevel.md", "type": "class"}
        }"#;
        let index = LookupIndex::from_json(json).unwrap();
        assert_eq!(index.get("java.util.List").unwrap().package_name, "java.util");
        assert_eq!(index.get("Toplevel").unwrap().package_name, "");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = BundleStore::new(dir.path());
        assert!(matches!(
            LookupIndex::load(&store),
            Err(IndexError::IndexMissing(_))
        ));
    }
}
